// crates/armada-model/src/path.rs
// ============================================================================
// Module: Armada Model Paths
// Description: Canonical absolute paths into the Armada deployment model tree.
// Purpose: Provide validated, normalized path values with structural helpers.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every item in an Armada deployment model is addressed by an absolute,
//! slash-separated path such as `/deployments/site/clusters/c1`. CLI commands
//! and model query requests both take these paths verbatim, so a single typo
//! surfaces only as a runtime `InvalidLocationError`. [`ModelPath`] validates
//! the shape once at construction: leading slash, non-empty segments, and a
//! conservative segment character set. Values are stored pre-normalized
//! (trailing slashes stripped) so equality and ordering match the wire form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when a model path fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The input was empty.
    #[error("model path is empty")]
    Empty,
    /// The input did not begin with a slash.
    #[error("model path must start with '/': {0}")]
    Relative(String),
    /// A path segment between slashes was empty.
    #[error("model path contains an empty segment: {0}")]
    EmptySegment(String),
    /// A path segment contained a character outside the model identifier set.
    #[error("model path segment {segment:?} contains invalid character {ch:?}")]
    InvalidCharacter {
        /// Offending segment.
        segment: String,
        /// First rejected character within the segment.
        ch: char,
    },
}

// ============================================================================
// SECTION: Model Path
// ============================================================================

/// Validated absolute path into the deployment model tree.
///
/// # Invariants
/// - Always begins with `/`.
/// - Never ends with `/` except for the root path itself.
/// - Segments are non-empty and drawn from `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelPath(String);

impl ModelPath {
    /// Returns the root path `/`.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parses and normalizes an absolute model path.
    ///
    /// Trailing slashes are stripped so `/deployments/` and `/deployments`
    /// compare equal after parsing.
    ///
    /// # Errors
    /// Returns [`PathError`] when the input is empty, relative, contains an
    /// empty segment, or uses characters outside the identifier set.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        if !input.starts_with('/') {
            return Err(PathError::Relative(input.to_string()));
        }
        let trimmed = input.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        for segment in trimmed[1 ..].split('/') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(input.to_string()));
            }
            if let Some(ch) = segment.chars().find(|ch| !is_segment_char(*ch)) {
                return Err(PathError::InvalidCharacter {
                    segment: segment.to_string(),
                    ch,
                });
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Appends one child segment, validating its character set.
    ///
    /// # Errors
    /// Returns [`PathError`] when the segment is empty or contains characters
    /// outside the identifier set.
    pub fn join(&self, segment: &str) -> Result<Self, PathError> {
        if segment.is_empty() {
            return Err(PathError::EmptySegment(segment.to_string()));
        }
        if let Some(ch) = segment.chars().find(|ch| !is_segment_char(*ch)) {
            return Err(PathError::InvalidCharacter {
                segment: segment.to_string(),
                ch,
            });
        }
        if self.is_root() {
            Ok(Self(format!("/{segment}")))
        } else {
            Ok(Self(format!("{}/{segment}", self.0)))
        }
    }

    /// Returns the parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        self.0.rfind('/').map(|idx| {
            if idx == 0 {
                Self::root()
            } else {
                Self(self.0[.. idx].to_string())
            }
        })
    }

    /// Returns the final path segment, or `None` for the root.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Iterates over the path segments from the root downward.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    /// Returns true when this path is the model root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns true when this path equals `ancestor` or sits beneath it.
    #[must_use]
    pub fn is_under(&self, ancestor: &Self) -> bool {
        if ancestor.is_root() || self == ancestor {
            return true;
        }
        self.0
            .strip_prefix(ancestor.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true for characters permitted inside a path segment.
const fn is_segment_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ModelPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModelPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for ModelPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ModelPath> for String {
    fn from(value: ModelPath) -> Self {
        value.0
    }
}
