//! config command - Get, set, or list configuration values

use std::collections::BTreeMap;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::config::{Config, KEYS};
use crate::git::ObjectStore;
use crate::ui::output;

/// Print the effective value of a key.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let repo = ctx.open_repo()?;
    let value = ctx.config(&repo)?.get(key)?;
    if ctx.json {
        return output::json(&value);
    }
    println!("{value}");
    Ok(())
}

/// Set a key in the repo file, or the global file with `global`.
pub fn set(ctx: &Context, key: &str, value: &str, global: bool) -> Result<()> {
    let repo = ctx.open_repo()?;
    let config = ctx.config(&repo)?;

    let path = if global {
        let mut file = config.global;
        file.set(key, value)?;
        Config::write_global(&file).context("Failed to write global config")?
    } else {
        let mut file = config.repo.unwrap_or_default();
        file.set(key, value)?;
        Config::write_repo(repo.store().git_dir(), &file).context("Failed to write config")?
    };

    tracing::debug!(path = %path.display(), key, value, "config written");
    output::success(format!("Set {key} = {value}"), ctx.verbosity());
    Ok(())
}

/// List every key with its effective value.
pub fn list(ctx: &Context) -> Result<()> {
    let repo = ctx.open_repo()?;
    let config = ctx.config(&repo)?;

    let values = KEYS
        .iter()
        .map(|key| Ok((*key, config.get(key)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    if ctx.json {
        return output::json(&values);
    }

    for key in KEYS {
        if let Some(value) = values.get(key) {
            println!("{key} = {value}");
        }
    }
    Ok(())
}
