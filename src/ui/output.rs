//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON and the quiet
//! flag no longer applies to results.

use std::fmt::Display;

use anyhow::Result;
use serde::Serialize;

use crate::core::diff::{DiffHunk, DiffLine, DiffStats};
use crate::core::status::{StatusFlags, StatusMap};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One status line in JSON output.
#[derive(Debug, Serialize)]
pub struct StatusEntry<'a> {
    pub path: &'a str,
    pub code: String,
    pub flags: StatusFlags,
}

/// Status entries in path order.
pub fn status_entries(map: &StatusMap) -> Vec<StatusEntry<'_>> {
    map.iter()
        .map(|(path, flags)| StatusEntry {
            path,
            code: flags.short_code(),
            flags: *flags,
        })
        .collect()
}

/// `XY path` lines, like `git status --short`.
pub fn format_status(map: &StatusMap) -> String {
    map.iter()
        .map(|(path, flags)| format!("{} {}", flags.short_code(), path))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One `@@ -a,b +c,d @@` header per hunk.
pub fn format_hunks(hunks: &[DiffHunk]) -> String {
    hunks
        .iter()
        .map(DiffHunk::header)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hunk headers followed by their prefixed lines.
pub fn format_lines(hunks: &[DiffHunk], lines: &[DiffLine]) -> String {
    let mut out = String::new();
    let mut current = None;
    for line in lines {
        if current != Some(line.hunk) {
            if let Some(hunk) = hunks.get(line.hunk) {
                out.push_str(&hunk.header());
                out.push('\n');
            }
            current = Some(line.hunk);
        }
        out.push(line.origin.prefix());
        out.push_str(&line.content);
        if !line.content.ends_with('\n') {
            out.push('\n');
        }
    }
    out.truncate(out.trim_end_matches('\n').len());
    out
}

/// `+added -deleted`.
pub fn format_stats(stats: &DiffStats) -> String {
    format!("+{} -{}", stats.added, stats.deleted)
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
