//! status command - Show working-tree status

use anyhow::Result;

use crate::cli::Context;
use crate::core::status::StatusSummary;
use crate::ui::output;

/// Show working-tree status, optionally restricted to pathspecs.
pub fn status(ctx: &Context, paths: &[String], ignored: bool, no_untracked: bool) -> Result<()> {
    let repo = ctx.open_repo()?;
    let map = if paths.is_empty() {
        let mut options = ctx.config(&repo)?.status_options();
        options.include_ignored |= ignored;
        if no_untracked {
            options.include_untracked = false;
        }
        repo.status_with(&options)
    } else {
        repo.status_for_paths(paths)
    };

    if ctx.json {
        return output::json(&output::status_entries(&map));
    }

    let verbosity = ctx.verbosity();
    if map.is_empty() {
        output::print("nothing to report, working tree clean", verbosity);
        return Ok(());
    }
    println!("{}", output::format_status(&map));

    let summary = StatusSummary::from_map(&map);
    output::print(
        format!(
            "\n{} staged, {} unstaged, {} untracked, {} conflicted",
            summary.staged, summary.unstaged, summary.untracked, summary.conflicted
        ),
        verbosity,
    );
    Ok(())
}
