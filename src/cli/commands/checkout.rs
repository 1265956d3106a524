//! checkout and restore commands

use anyhow::{bail, Result};

use crate::cli::Context;
use crate::engine::CheckoutOutcome;
use crate::ui::output;

/// Check out a reference, optionally creating the branch.
pub fn checkout(ctx: &Context, reference: &str, create: bool) -> Result<()> {
    let repo = ctx.open_repo()?;
    let outcome = repo.checkout_reference(reference, create)?;
    let head = repo.head().unwrap_or_else(|| reference.to_string());

    if ctx.json {
        let created = matches!(outcome, CheckoutOutcome::CreatedAndCheckedOut { .. });
        return output::json(&serde_json::json!({ "head": head, "created": created }));
    }

    let message = match outcome {
        CheckoutOutcome::CheckedOut => format!("Switched to {head}"),
        CheckoutOutcome::CreatedAndCheckedOut { branch } => {
            format!("Created and switched to {branch}")
        }
    };
    output::success(message, ctx.verbosity());
    Ok(())
}

/// Restore paths from HEAD.
pub fn restore(ctx: &Context, paths: &[String]) -> Result<()> {
    let repo = ctx.open_repo()?;
    let failed: Vec<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|path| !repo.checkout_head(Some(*path)))
        .collect();
    if !failed.is_empty() {
        bail!("could not restore: {}", failed.join(", "));
    }
    output::success(format!("Restored {} path(s)", paths.len()), ctx.verbosity());
    Ok(())
}
