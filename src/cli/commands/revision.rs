//! count, merge-base and ahead-behind commands

use anyhow::{bail, Result};

use super::resolve_rev;
use crate::cli::Context;
use crate::ui::output;

/// Count commits reachable from `from` but not from `exclude`.
pub fn count(ctx: &Context, from: &str, exclude: &str) -> Result<()> {
    let repo = ctx.open_repo()?;
    let from = resolve_rev(&repo, from)?;
    let exclude = resolve_rev(&repo, exclude)?;
    let count = repo.commit_count(&from, &exclude);
    if ctx.json {
        return output::json(&serde_json::json!({ "count": count }));
    }
    println!("{count}");
    Ok(())
}

/// Print the best common ancestor of two commits.
pub fn merge_base(ctx: &Context, a: &str, b: &str) -> Result<()> {
    let repo = ctx.open_repo()?;
    let a = resolve_rev(&repo, a)?;
    let b = resolve_rev(&repo, b)?;
    let base = repo.merge_base(&a, &b);
    if ctx.json {
        return output::json(&serde_json::json!({ "merge_base": base }));
    }
    match base {
        Some(id) => {
            println!("{id}");
            Ok(())
        }
        None => bail!("no common ancestor"),
    }
}

/// Compare a branch with its upstream.
pub fn ahead_behind(ctx: &Context, branch: Option<&str>) -> Result<()> {
    let repo = ctx.open_repo()?;
    let counts = repo.ahead_behind_count(branch);
    if ctx.json {
        return output::json(&counts);
    }
    println!("ahead {}, behind {}", counts.ahead, counts.behind);
    Ok(())
}
