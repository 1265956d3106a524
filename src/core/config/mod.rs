//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! repolens has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$REPOLENS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/repolens/config.toml`
//! 3. `~/.repolens/config.toml` (canonical write location)
//!
//! # Repo Config Location
//!
//! `<git_dir>/repolens/config.toml`. Keying on the git directory rather than
//! the working tree keeps linked worktrees pointed at their own file.
//!
//! # Example
//!
//! ```no_run
//! use repolens::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! println!("context: {}", config.context_lines());
//! println!("whitespace: {}", config.whitespace());
//! ```

pub mod schema;

pub use schema::{ConfigFile, DiffSection, GlobalConfig, RepoConfig, StatusSection, KEYS};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::diff::{BlobSource, DiffOptions, WhitespaceMode, DEFAULT_CONTEXT_LINES};
use crate::core::status::StatusOptions;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "REPOLENS_CONFIG";

const CONFIG_DIR: &str = "repolens";
const CONFIG_FILE: &str = "config.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: repo over global over defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if a repo file was found)
    pub repo: Option<RepoConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// If `git_dir` is provided, the repo file under it is loaded too.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed or
    /// validated. Missing files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(&Self::global_candidates(), git_dir)
    }

    fn load_with(global_candidates: &[PathBuf], git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let (global, global_path) = match global_candidates.iter().find(|p| p.exists()) {
            Some(path) => (Self::read_config(path)?, Some(path.clone())),
            None => (GlobalConfig::default(), None),
        };

        let (repo, repo_path) = match git_dir.map(Self::repo_config_path) {
            Some(path) if path.exists() => (Some(Self::read_config(&path)?), Some(path)),
            _ => (None, None),
        };

        global.validate()?;
        if let Some(r) = &repo {
            r.validate()?;
        }

        tracing::debug!(
            global = ?global_path,
            repo = ?repo_path,
            "configuration loaded"
        );

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// Global config files, in search order.
    pub fn global_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(xdg_home) = std::env::var_os("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join(CONFIG_DIR).join(CONFIG_FILE));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(format!(".{CONFIG_DIR}")).join(CONFIG_FILE));
        }
        candidates
    }

    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical path for global config: `~/.repolens/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(format!(".{CONFIG_DIR}")).join(CONFIG_FILE))
    }

    /// Path for repo config under a git directory.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Write global config atomically.
    ///
    /// Goes to the file [`Config::load`] would read, or to the canonical
    /// path when none exists yet.
    pub fn write_global(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        Self::write_global_with(&Self::global_candidates(), config)
    }

    fn write_global_with(
        global_candidates: &[PathBuf],
        config: &GlobalConfig,
    ) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = match global_candidates.iter().find(|p| p.exists()) {
            Some(path) => path.clone(),
            None => Self::global_config_path()?,
        };
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write repo config atomically.
    pub fn write_repo(git_dir: &Path, config: &RepoConfig) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = Self::repo_config_path(git_dir);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write to a sibling temp file, sync, then rename over the target.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        let write_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ConfigError::WriteError { path, source }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err(path))?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
        file.write_all(contents.as_bytes())
            .map_err(write_err(&temp_path))?;
        file.sync_all().map_err(write_err(&temp_path))?;

        fs::rename(&temp_path, path).map_err(write_err(path))?;
        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn diff_value<T>(&self, get: impl Fn(&DiffSection) -> Option<T>) -> Option<T> {
        let pick = |file: &ConfigFile| file.diff.as_ref().and_then(&get);
        self.repo.as_ref().and_then(pick).or_else(|| pick(&self.global))
    }

    fn status_value<T>(&self, get: impl Fn(&StatusSection) -> Option<T>) -> Option<T> {
        let pick = |file: &ConfigFile| file.status.as_ref().and_then(&get);
        self.repo.as_ref().and_then(pick).or_else(|| pick(&self.global))
    }

    /// Context lines for diffs. Defaults to 3.
    pub fn context_lines(&self) -> u32 {
        self.diff_value(|d| d.context_lines)
            .unwrap_or(DEFAULT_CONTEXT_LINES)
    }

    /// Whitespace mode for diffs. Defaults to exact.
    pub fn whitespace(&self) -> WhitespaceMode {
        self.diff_value(|d| d.whitespace).unwrap_or_default()
    }

    /// Whether buffer diffs compare against the index. Defaults to `false`.
    pub fn use_index(&self) -> bool {
        self.diff_value(|d| d.use_index).unwrap_or(false)
    }

    /// Whether status reports untracked files. Defaults to `true`.
    pub fn include_untracked(&self) -> bool {
        self.status_value(|s| s.include_untracked).unwrap_or(true)
    }

    /// Whether status reports ignored files. Defaults to `false`.
    pub fn include_ignored(&self) -> bool {
        self.status_value(|s| s.include_ignored).unwrap_or(false)
    }

    /// Diff options built from the configured defaults.
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            context_lines: self.context_lines(),
            whitespace: self.whitespace(),
            source: if self.use_index() {
                BlobSource::Index
            } else {
                BlobSource::Head
            },
        }
    }

    /// Status options built from the configured defaults.
    pub fn status_options(&self) -> StatusOptions {
        StatusOptions {
            include_untracked: self.include_untracked(),
            include_ignored: self.include_ignored(),
            ..StatusOptions::default()
        }
    }

    /// Effective value of a dotted key, defaults included.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unknown key.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "diff.context_lines" => self.context_lines().to_string(),
            "diff.whitespace" => self.whitespace().to_string(),
            "diff.use_index" => self.use_index().to_string(),
            "status.include_untracked" => self.include_untracked().to_string(),
            "status.include_ignored" => self.include_ignored().to_string(),
            _ => return Err(ConfigError::InvalidValue(format!("unknown key '{key}'"))),
        };
        Ok(value)
    }

    /// Path the global config was loaded from.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path the repo config was loaded from.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
