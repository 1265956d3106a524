//! cli
//!
//! Command-line interface layer for rlens.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, opens a
//! [`Repository`](crate::Repository) and dispatches to the handlers in
//! [`commands`]. Errors are carried as `anyhow` with context.

pub mod args;
pub mod commands;

pub use args::{Cli, ConfigAction, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::ui::output::Verbosity;
use crate::Repository;

/// Flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory to run in, instead of the process working directory
    pub cwd: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
    pub json: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Open the repository containing the working directory.
    pub fn open_repo(&self) -> Result<Repository> {
        let cwd = match &self.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        Repository::open(&cwd)
            .with_context(|| format!("Failed to open repository at {}", cwd.display()))
    }

    /// Load configuration for an open repository.
    pub fn config(&self, repo: &Repository) -> Result<Config> {
        use crate::git::ObjectStore;

        Config::load(Some(repo.store().git_dir())).context("Failed to load configuration")
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    crate::logging::setup_logger(cli.debug);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
    };

    commands::dispatch(cli.command, &ctx)
}
