//! core
//!
//! Core domain types and the pure algorithms of the engine.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ObjectId, RefName, BranchName
//! - [`status`] - Status flags, options and summaries
//! - [`diff`] - Line diffing: Myers edit script, hunks, whitespace modes
//! - [`revwalk`] - Commit-graph walk, reachability counts, merge base
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Nothing in here touches the object store directly
//! - Algorithms take traits or plain data, so they are testable in memory
//! - All results are deterministic for the same inputs

pub mod config;
pub mod diff;
pub mod revwalk;
pub mod status;
pub mod types;
