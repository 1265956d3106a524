//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository from the shared [`Context`]
//! 2. Calls the [`Repository`](crate::Repository) façade
//! 3. Formats and displays output through [`crate::ui::output`]

mod add;
mod checkout;
mod completion;
mod config_cmd;
mod diff;
mod refs;
mod revision;
mod status;

pub use add::add;
pub use checkout::{checkout, restore};
pub use completion::completion;
pub use diff::{diff, stats};
pub use refs::{head, refs};
pub use revision::{ahead_behind, count, merge_base};
pub use status::status;

use anyhow::{anyhow, Result};

use super::args::{Command, ConfigAction};
use super::Context;
use crate::core::types::{ObjectId, HEADS_PREFIX, REMOTES_PREFIX, TAGS_PREFIX};
use crate::git::ObjectStore;
use crate::Repository;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Status {
            paths,
            ignored,
            no_untracked,
        } => status::status(ctx, &paths, ignored, no_untracked),
        Command::Diff(args) => diff::diff(ctx, &args),
        Command::Stats { path } => diff::stats(ctx, &path),
        Command::Count { from, exclude } => revision::count(ctx, &from, &exclude),
        Command::MergeBase { a, b } => revision::merge_base(ctx, &a, &b),
        Command::AheadBehind { branch } => revision::ahead_behind(ctx, branch.as_deref()),
        Command::Refs => refs::refs(ctx),
        Command::Head { short } => refs::head(ctx, short),
        Command::Checkout { reference, create } => checkout::checkout(ctx, &reference, create),
        Command::Restore { paths } => checkout::restore(ctx, &paths),
        Command::Add { paths } => add::add(ctx, &paths),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value, global } => config_cmd::set(ctx, &key, &value, global),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Resolve a commit id or ref name to a hex commit id.
///
/// Short names are tried as given, then as a head, a tag and a remote ref.
pub(crate) fn resolve_rev(repo: &Repository, rev: &str) -> Result<String> {
    if let Ok(id) = ObjectId::parse(rev) {
        return Ok(id.to_hex());
    }
    let candidates = [
        rev.to_string(),
        format!("{HEADS_PREFIX}{rev}"),
        format!("{TAGS_PREFIX}{rev}"),
        format!("{REMOTES_PREFIX}{rev}"),
    ];
    candidates
        .iter()
        .find_map(|name| repo.store().resolve_ref(name).ok().flatten())
        .map(|id| id.to_hex())
        .ok_or_else(|| anyhow!("unknown revision '{rev}'"))
}
