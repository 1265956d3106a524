//! core::diff::whitespace
//!
//! Line splitting and the comparison keys used by the whitespace modes.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How whitespace differences are treated when comparing lines.
///
/// The raw line is always kept for output; only the comparison key changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhitespaceMode {
    /// Byte-exact comparison. The line terminator is part of the line.
    #[default]
    Exact,
    /// Ignore whitespace at the end of a line, including `\r` and `\n`.
    IgnoreEol,
    /// Treat runs of whitespace as a single space and ignore trailing whitespace.
    IgnoreChange,
    /// Ignore all whitespace.
    IgnoreAll,
}

impl WhitespaceMode {
    /// The comparison key for `line` under this mode.
    ///
    /// # Example
    ///
    /// ```
    /// use repolens::core::diff::WhitespaceMode;
    ///
    /// assert_eq!(&*WhitespaceMode::IgnoreEol.key(b"a b  \r\n"), b"a b");
    /// assert_eq!(&*WhitespaceMode::IgnoreChange.key(b"a \t b\n"), b"a b");
    /// assert_eq!(&*WhitespaceMode::IgnoreAll.key(b" a b\n"), b"ab");
    /// assert_eq!(&*WhitespaceMode::Exact.key(b"a\n"), b"a\n");
    /// ```
    pub fn key<'a>(self, line: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            WhitespaceMode::Exact => Cow::Borrowed(line),
            WhitespaceMode::IgnoreEol => Cow::Borrowed(trim_end(line)),
            WhitespaceMode::IgnoreChange => {
                let mut key = Vec::with_capacity(line.len());
                let mut in_space = false;
                for &b in trim_end(line) {
                    if b.is_ascii_whitespace() {
                        in_space = true;
                    } else {
                        if in_space && !key.is_empty() {
                            key.push(b' ');
                        }
                        in_space = false;
                        key.push(b);
                    }
                }
                // Leading whitespace is still significant in this mode.
                if line.first().is_some_and(u8::is_ascii_whitespace) && !key.is_empty() {
                    key.insert(0, b' ');
                }
                Cow::Owned(key)
            }
            WhitespaceMode::IgnoreAll => Cow::Owned(
                line.iter()
                    .copied()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect(),
            ),
        }
    }

    /// Name used in configuration files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            WhitespaceMode::Exact => "exact",
            WhitespaceMode::IgnoreEol => "ignore-eol",
            WhitespaceMode::IgnoreChange => "ignore-change",
            WhitespaceMode::IgnoreAll => "ignore-all",
        }
    }
}

impl fmt::Display for WhitespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhitespaceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(WhitespaceMode::Exact),
            "ignore-eol" => Ok(WhitespaceMode::IgnoreEol),
            "ignore-change" => Ok(WhitespaceMode::IgnoreChange),
            "ignore-all" => Ok(WhitespaceMode::IgnoreAll),
            other => Err(format!(
                "unknown whitespace mode '{other}' (expected exact, ignore-eol, ignore-change or ignore-all)"
            )),
        }
    }
}

fn trim_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &line[..end]
}

/// Split text into lines, keeping each line's `\n` terminator.
///
/// The last line has no terminator when the text does not end in `\n`.
/// Empty input has no lines.
pub fn split_lines(text: &[u8]) -> Vec<&[u8]> {
    text.split_inclusive(|b| *b == b'\n').collect()
}
