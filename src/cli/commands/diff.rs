//! diff and stats commands - Line diffs against stored blobs

use std::io::Read;

use anyhow::{anyhow, Context as _, Result};

use crate::cli::args::DiffArgs;
use crate::cli::Context;
use crate::core::diff::{BlobSource, WhitespaceMode};
use crate::ui::output;

fn read_text(args: &DiffArgs) -> Result<String> {
    match &args.text_file {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Diff a buffer against the stored blob of a path.
pub fn diff(ctx: &Context, args: &DiffArgs) -> Result<()> {
    let repo = ctx.open_repo()?;
    let mut options = ctx.config(&repo)?.diff_options();
    if args.index {
        options = options.source(BlobSource::Index);
    }
    if args.ignore_eol {
        options = options.whitespace(WhitespaceMode::IgnoreEol);
    } else if args.ignore_change {
        options = options.whitespace(WhitespaceMode::IgnoreChange);
    } else if args.ignore_all {
        options = options.whitespace(WhitespaceMode::IgnoreAll);
    }
    if let Some(context) = args.context {
        options = options.context_lines(context);
    }

    let text = read_text(args)?;
    let no_stored_version = || anyhow!("'{}' has no stored version to compare against", args.path);

    if args.details {
        let (hunks, lines) = repo
            .line_diff_hunks_and_lines(&args.path, &text, &options)
            .ok_or_else(no_stored_version)?;
        if ctx.json {
            return output::json(&lines);
        }
        if !lines.is_empty() {
            println!("{}", output::format_lines(&hunks, &lines));
        }
    } else {
        let hunks = repo
            .line_diffs(&args.path, &text, &options)
            .ok_or_else(no_stored_version)?;
        if ctx.json {
            return output::json(&hunks);
        }
        if !hunks.is_empty() {
            println!("{}", output::format_hunks(&hunks));
        }
    }
    Ok(())
}

/// Added/deleted line counts between HEAD and the working tree.
pub fn stats(ctx: &Context, path: &str) -> Result<()> {
    let repo = ctx.open_repo()?;
    let stats = repo.diff_stats(path);
    if ctx.json {
        return output::json(&stats);
    }
    println!("{}", output::format_stats(&stats));
    Ok(())
}
