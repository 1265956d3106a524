//! core::config::schema
//!
//! Configuration schema types.
//!
//! Global and repo files share one schema; the repo file simply wins where
//! both set a value.
//!
//! # Validation
//!
//! Unknown keys are rejected at parse time. Values are range-checked after
//! parsing by [`ConfigFile::validate`].

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::diff::WhitespaceMode;

/// Upper bound for `diff.context_lines`.
pub const MAX_CONTEXT_LINES: u32 = 1000;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// [diff]
/// context_lines = 3
/// whitespace = "ignore-eol"
/// use_index = false
///
/// [status]
/// include_untracked = true
/// include_ignored = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Line diff defaults
    pub diff: Option<DiffSection>,

    /// Status defaults
    pub status: Option<StatusSection>,
}

/// User-scope configuration.
pub type GlobalConfig = ConfigFile;

/// Repository-scope configuration.
pub type RepoConfig = ConfigFile;

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(diff) = &self.diff {
            diff.validate()?;
        }
        Ok(())
    }

    /// Set one dotted key from its command-line spelling.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unknown key, a value that
    /// does not parse, or one that fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue(format!("{key}: {reason}"));
        let flag = || {
            value
                .parse::<bool>()
                .map_err(|_| invalid(format!("expected true or false, got '{value}'")))
        };

        match key {
            "diff.context_lines" => {
                let lines = value
                    .parse()
                    .map_err(|_| invalid(format!("expected a line count, got '{value}'")))?;
                self.diff.get_or_insert_with(Default::default).context_lines = Some(lines);
            }
            "diff.whitespace" => {
                let mode = value.parse::<WhitespaceMode>().map_err(invalid)?;
                self.diff.get_or_insert_with(Default::default).whitespace = Some(mode);
            }
            "diff.use_index" => {
                self.diff.get_or_insert_with(Default::default).use_index = Some(flag()?);
            }
            "status.include_untracked" => {
                self.status.get_or_insert_with(Default::default).include_untracked = Some(flag()?);
            }
            "status.include_ignored" => {
                self.status.get_or_insert_with(Default::default).include_ignored = Some(flag()?);
            }
            _ => return Err(ConfigError::InvalidValue(format!("unknown key '{key}'"))),
        }
        self.validate()
    }
}

/// Every settable key, in `[section]` order.
pub const KEYS: &[&str] = &[
    "diff.context_lines",
    "diff.whitespace",
    "diff.use_index",
    "status.include_untracked",
    "status.include_ignored",
];

/// `[diff]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiffSection {
    /// Context lines around each change
    pub context_lines: Option<u32>,

    /// Whitespace comparison mode
    pub whitespace: Option<WhitespaceMode>,

    /// Diff buffers against the index instead of HEAD
    pub use_index: Option<bool>,
}

impl DiffSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(lines) = self.context_lines {
            if lines > MAX_CONTEXT_LINES {
                return Err(ConfigError::InvalidValue(format!(
                    "diff.context_lines must be at most {MAX_CONTEXT_LINES}, got {lines}"
                )));
            }
        }
        Ok(())
    }
}

/// `[status]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StatusSection {
    /// Report untracked files
    pub include_untracked: Option<bool>,

    /// Report ignored files
    pub include_ignored: Option<bool>,
}
