//! core::types
//!
//! Strong types for the identifiers the engine passes around.
//!
//! # Types
//!
//! - [`ObjectId`] - Binary object identifier with a canonical hex form
//! - [`RefName`] - Validated full reference name (`refs/heads/main`, `HEAD`)
//! - [`BranchName`] - Validated short branch name (`main`, `feature/x`)
//!
//! # Validation
//!
//! Names are checked against git's `check-ref-format` rules at construction
//! time, so a value of these types can always be handed to the object store.
//!
//! # Examples
//!
//! ```
//! use repolens::core::types::{BranchName, ObjectId, RefName};
//!
//! let id = ObjectId::parse("B2C96BDFFE1A8F239C2D450863E4A6CAA6DCB655").unwrap();
//! assert_eq!(id.to_string(), "b2c96bdffe1a8f239c2d450863e4a6caa6dcb655");
//!
//! let branch = BranchName::new("feature/login").unwrap();
//! assert_eq!(RefName::for_branch(&branch).as_str(), "refs/heads/feature/login");
//!
//! assert!(BranchName::new("inv@{id").is_err());
//! assert!(ObjectId::parse("not-a-sha").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// Prefix under which local branches live.
pub const HEADS_PREFIX: &str = "refs/heads/";
/// Prefix under which remote-tracking branches live.
pub const REMOTES_PREFIX: &str = "refs/remotes/";
/// Prefix under which tags live.
pub const TAGS_PREFIX: &str = "refs/tags/";

/// A git object identifier (SHA-1).
///
/// Stored as raw bytes; ordering is bytewise, which matches the ordering of
/// the lowercase hex form.
///
/// # Example
///
/// ```
/// use repolens::core::types::ObjectId;
///
/// let id: ObjectId = "50719ab369dcbbc2fb3b7a0167c52accbd0eb40e".parse().unwrap();
/// assert_eq!(id.short(7), "50719ab");
/// assert!(!id.is_zero());
/// assert!(ObjectId::zero().is_zero());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; ObjectId::LEN]);

impl ObjectId {
    /// Length of the binary hash in bytes.
    pub const LEN: usize = 20;
    /// Length of the hex encoding.
    pub const HEX_LEN: usize = Self::LEN * 2;

    /// Parse a 40-character hex string (either case).
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not exactly 40 hex
    /// characters.
    pub fn parse(hex_str: &str) -> Result<Self, TypeError> {
        if hex_str.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidOid(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(hex_str, &mut bytes)
            .map_err(|_| TypeError::InvalidOid("object id must be hexadecimal".into()))?;
        Ok(Self(bytes))
    }

    /// Build an id from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if `bytes` is not 20 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let raw: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            TypeError::InvalidOid(format!("expected {} bytes, got {}", Self::LEN, bytes.len()))
        })?;
        Ok(Self(raw))
    }

    /// The all-zero id libgit2 uses for "no object".
    pub fn zero() -> Self {
        Self([0; Self::LEN])
    }

    /// Check if this is the zero id.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// The raw hash bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First `len` characters of the hex form.
    pub fn short(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.min(Self::HEX_LEN));
        hex
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short(10))
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_hex()
    }
}

/// Shared check-ref-format rules. `what` names the thing in error messages.
fn check_refname_rules(name: &str, what: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{what} cannot be empty"));
    }
    if name == "@" {
        return Err(format!("{what} cannot be '@' (reserved)"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(format!("{what} cannot start or end with '/'"));
    }
    if name.ends_with('.') {
        return Err(format!("{what} cannot end with '.'"));
    }
    for forbidden in ["..", "@{", "//"] {
        if name.contains(forbidden) {
            return Err(format!("{what} cannot contain '{forbidden}'"));
        }
    }
    const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
    if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(format!("{what} cannot contain '{c}'"));
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Err(format!("{what} cannot contain control characters"));
    }
    for component in name.split('/') {
        if component.starts_with('.') {
            return Err(format!("{what} component cannot start with '.'"));
        }
        if component.ends_with(".lock") {
            return Err(format!("{what} component cannot end with '.lock'"));
        }
    }
    Ok(())
}

/// A validated git branch name, without the `refs/heads/` prefix.
///
/// # Example
///
/// ```
/// use repolens::core::types::BranchName;
///
/// assert!(BranchName::new("feature/my-branch").is_ok());
/// assert!(BranchName::new("user@feature").is_ok());
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("-flag").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates git's
    /// refname rules, or names the detached-head pseudo ref.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '-'".into(),
            ));
        }
        if name == "HEAD" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be 'HEAD'".into(),
            ));
        }
        check_refname_rules(&name, "branch name").map_err(TypeError::InvalidBranchName)?;
        Ok(Self(name))
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated full reference name.
///
/// # Example
///
/// ```
/// use repolens::core::types::RefName;
///
/// let head = RefName::new("HEAD").unwrap();
/// assert!(!head.is_branch_ref());
///
/// let main = RefName::normalize_branch("main").unwrap();
/// assert_eq!(main.as_str(), "refs/heads/main");
/// assert_eq!(main.branch_name().unwrap().as_str(), "main");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates git's refname
    /// rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        check_refname_rules(&name, "ref name").map_err(TypeError::InvalidRefName)?;
        Ok(Self(name))
    }

    /// The `refs/heads/<branch>` ref for a branch.
    pub fn for_branch(branch: &BranchName) -> Self {
        Self(format!("{HEADS_PREFIX}{}", branch.as_str()))
    }

    /// Turn a user-supplied branch reference into a full ref name.
    ///
    /// Names that already start with `refs/` are kept as they are; anything
    /// else is treated as a short branch name.
    ///
    /// # Errors
    ///
    /// Returns a `TypeError` if the resulting name is invalid.
    pub fn normalize_branch(name: &str) -> Result<Self, TypeError> {
        if name.starts_with("refs/") {
            Self::new(name)
        } else {
            Ok(Self::for_branch(&BranchName::new(name)?))
        }
    }

    /// Strip a prefix from the ref name and return the remainder.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Check if this ref is a local branch ref.
    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with(HEADS_PREFIX)
    }

    /// The branch name for a `refs/heads/` ref.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` for refs outside
    /// `refs/heads/` or with an unusable remainder.
    pub fn branch_name(&self) -> Result<BranchName, TypeError> {
        let short = self.strip_prefix(HEADS_PREFIX).ok_or_else(|| {
            TypeError::InvalidBranchName(format!("'{}' is not under {HEADS_PREFIX}", self.0))
        })?;
        BranchName::new(short)
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
