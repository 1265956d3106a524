//! refs and head commands

use anyhow::{bail, Result};

use crate::cli::Context;
use crate::ui::output;

/// List heads, remotes and tags.
pub fn refs(ctx: &Context) -> Result<()> {
    let repo = ctx.open_repo()?;
    let refs = repo.references();
    if ctx.json {
        return output::json(&refs);
    }

    let verbosity = ctx.verbosity();
    for (title, names) in [
        ("heads", &refs.heads),
        ("remotes", &refs.remotes),
        ("tags", &refs.tags),
    ] {
        if names.is_empty() {
            continue;
        }
        output::print(format!("{title}:"), verbosity);
        println!("{}", output::format_list(names, "  "));
    }
    Ok(())
}

/// Show what HEAD points at.
pub fn head(ctx: &Context, short: bool) -> Result<()> {
    let repo = ctx.open_repo()?;
    let head = if short { repo.short_head() } else { repo.head() };
    if ctx.json {
        return output::json(&serde_json::json!({
            "head": head,
            "upstream": repo.upstream_branch(),
        }));
    }
    match head {
        Some(head) => {
            println!("{head}");
            Ok(())
        }
        None => bail!("HEAD does not point at a commit yet"),
    }
}
