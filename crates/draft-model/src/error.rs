//! Error types for the draft model.

use thiserror::Error;

use crate::value::FieldKind;

/// A path string that does not follow the `key.key[index]` grammar.
///
/// Raised by the nested-path setter and getter. Nothing is written for a
/// malformed path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path `{path}` at byte {position}: {reason}")]
pub struct InvalidPathError {
    /// The full path as given by the caller.
    pub path: String,
    /// Byte offset of the offending character or segment.
    pub position: usize,
    /// What was wrong.
    pub reason: PathErrorReason,
}

impl InvalidPathError {
    pub(crate) fn new(path: &str, position: usize, reason: PathErrorReason) -> Self {
        Self {
            path: path.to_string(),
            position,
            reason,
        }
    }
}

/// Reason a path failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathErrorReason {
    #[error("path is empty")]
    Empty,
    #[error("empty segment")]
    EmptySegment,
    #[error("array index without a key")]
    MissingKey,
    #[error("unclosed `[`")]
    UnclosedBracket,
    #[error("index `{0}` is not a non-negative integer")]
    InvalidIndex(String),
    #[error("index `{0}` is above the maximum of {max}", max = crate::path::MAX_INDEX)]
    IndexOutOfRange(String),
    #[error("unexpected `]`")]
    UnexpectedBracket,
    #[error("unexpected character `{0}` after `]`")]
    TrailingCharacter(char),
}

/// Conversion errors between draft values and JSON or typed structs.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected a record, found {found}")]
    NotARecord { found: FieldKind },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
