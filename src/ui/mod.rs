//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Plain and JSON formatting of results
//!
//! # Design
//!
//! All command output goes through this module so plain text, quiet mode and
//! `--json` are handled the same way everywhere.

pub mod output;
