//! add command - Stage files

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::ui::output;

/// Stage each path, stopping at the first failure.
pub fn add(ctx: &Context, paths: &[String]) -> Result<()> {
    let repo = ctx.open_repo()?;
    for path in paths {
        repo.add(path)
            .with_context(|| format!("Failed to stage '{path}'"))?;
    }
    output::success(format!("Staged {} path(s)", paths.len()), ctx.verbosity());
    Ok(())
}
