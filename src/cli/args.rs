//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// rlens - status, diff and revision queries over a git repository
#[derive(Parser, Debug)]
#[command(name = "rlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if rlens was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show working-tree status
    #[command(
        long_about = "Classify paths in the working tree.\n\n\
            Each line shows a two-column code (index, working tree) and the path. \
            With PATH arguments, only paths matching those git pathspecs are shown; \
            an empty string matches everything.",
        after_help = "\
EXAMPLES:
    rlens status
    rlens status 'src/**'
    rlens status --ignored --json"
    )]
    Status {
        /// Restrict to these pathspecs
        paths: Vec<String>,

        /// Include ignored files
        #[arg(long)]
        ignored: bool,

        /// Leave out untracked files
        #[arg(long)]
        no_untracked: bool,
    },

    /// Diff a buffer against a path's stored blob
    #[command(
        long_about = "Compute line hunks between the committed (or staged) version of PATH \
            and a text buffer.\n\n\
            The buffer is read from --text-file, or from stdin when no file is given.",
        after_help = "\
EXAMPLES:
    rlens diff src/main.rs --text-file /tmp/edited.rs
    cat edited.rs | rlens diff src/main.rs --details
    rlens diff README.md --index --ignore-eol < README.md"
    )]
    Diff(DiffArgs),

    /// Added/deleted line counts between HEAD and the working tree
    Stats {
        /// Path, or directory prefix, to count
        path: String,
    },

    /// Count commits reachable from FROM but not from EXCLUDE
    Count {
        /// Commit id or ref to count from
        from: String,
        /// Commit id or ref whose history is excluded
        exclude: String,
    },

    /// Find the best common ancestor of two commits
    #[command(name = "merge-base")]
    MergeBase {
        /// First commit id or ref
        a: String,
        /// Second commit id or ref
        b: String,
    },

    /// Compare a branch with its configured upstream
    #[command(name = "ahead-behind")]
    AheadBehind {
        /// Branch name (defaults to the current branch)
        branch: Option<String>,
    },

    /// List heads, remotes and tags
    Refs,

    /// Show what HEAD points at
    Head {
        /// Print the branch short name or abbreviated sha
        #[arg(short, long)]
        short: bool,
    },

    /// Check out a reference
    #[command(after_help = "\
EXAMPLES:
    rlens checkout main
    rlens checkout refs/heads/topic
    rlens checkout -b new-topic")]
    Checkout {
        /// Branch name or full ref name
        reference: String,

        /// Create the branch at HEAD if it does not exist
        #[arg(short = 'b', long)]
        create: bool,
    },

    /// Restore paths from HEAD, discarding local changes
    Restore {
        /// Paths to restore
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Stage files
    Add {
        /// Paths to stage
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Get, set, or list configuration values
    #[command(
        long_about = "Inspect or change rlens settings.\n\n\
            Values are read with precedence repo over global over defaults. \
            `set` writes the repository file unless --global is given.",
        after_help = "\
EXAMPLES:
    rlens config list
    rlens config get diff.whitespace
    rlens config set diff.context_lines 5
    rlens config set --global status.include_untracked false"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(after_help = "\
EXAMPLES:
    rlens completion bash > ~/.local/share/bash-completion/completions/rlens
    rlens completion zsh > ~/.zfunc/_rlens")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `rlens diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Path whose stored blob is the old side
    pub path: String,

    /// Read the new side from this file instead of stdin
    #[arg(long, value_name = "FILE")]
    pub text_file: Option<PathBuf>,

    /// Print every hunk line, not just hunk headers
    #[arg(long)]
    pub details: bool,

    /// Compare against the index instead of HEAD
    #[arg(long)]
    pub index: bool,

    /// Ignore whitespace at end of line
    #[arg(long, group = "whitespace")]
    pub ignore_eol: bool,

    /// Treat runs of whitespace as equal
    #[arg(long, group = "whitespace")]
    pub ignore_change: bool,

    /// Ignore all whitespace
    #[arg(long, group = "whitespace")]
    pub ignore_all: bool,

    /// Lines of context around each change
    #[arg(short = 'U', long = "unified", value_name = "N")]
    pub context: Option<u32>,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
        /// Write the user's global file instead of the repository's
        #[arg(long)]
        global: bool,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
