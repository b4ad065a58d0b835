//! Dotted/indexed paths into a draft record.
//!
//! Paths look like `styles.primaryColor` or `packages[0].topics[2]`: dot
//! separated keys, each optionally followed by one or more `[index]`
//! suffixes.

use std::fmt;
use std::str::FromStr;

use crate::error::{InvalidPathError, PathErrorReason};
use crate::value::{DraftValue, Record};

/// Largest array index a path may contain. Writes pad arrays up to the
/// index, so this also caps how many `Null`s a single write can add.
pub const MAX_INDEX: usize = 9_999;

/// One step of a [`DraftPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A parsed path. Always starts with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPath {
    segments: Vec<PathSegment>,
}

impl DraftPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Return a copy of `root` with `value` placed at this path.
    ///
    /// Missing intermediates, or intermediates of the wrong container type,
    /// are replaced by an empty record (before a key) or an empty array
    /// (before an index). Writing past the end of an array pads with `Null`.
    pub fn set(&self, root: &Record, value: DraftValue) -> Record {
        let mut output = root.clone();
        if let Some((PathSegment::Key(key), rest)) = self.segments.split_first() {
            let slot = output.entry(key.clone()).or_default();
            assign(slot, rest, value);
        }
        output
    }

    /// Look up the value at this path, if every step exists.
    pub fn get<'a>(&self, root: &'a Record) -> Option<&'a DraftValue> {
        let (first, rest) = self.segments.split_first()?;
        let PathSegment::Key(key) = first else {
            return None;
        };
        rest.iter()
            .try_fold(root.get(key)?, |current, segment| match (segment, current) {
                (PathSegment::Key(key), DraftValue::Record(record)) => record.get(key),
                (PathSegment::Index(index), DraftValue::Array(items)) => items.get(*index),
                _ => None,
            })
    }
}

fn assign(slot: &mut DraftValue, segments: &[PathSegment], value: DraftValue) {
    let Some((head, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };
    match head {
        PathSegment::Key(key) => {
            if !slot.is_record() {
                *slot = DraftValue::Record(Record::new());
            }
            if let DraftValue::Record(record) = slot {
                assign(record.entry(key.clone()).or_default(), rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !matches!(slot, DraftValue::Array(_)) {
                *slot = DraftValue::Array(Vec::new());
            }
            if let DraftValue::Array(items) = slot {
                if items.len() <= *index {
                    items.resize(index + 1, DraftValue::Null);
                }
                assign(&mut items[*index], rest, value);
            }
        }
    }
}

impl FromStr for DraftPath {
    type Err = InvalidPathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path.is_empty() {
            return Err(InvalidPathError::new(path, 0, PathErrorReason::Empty));
        }

        let mut segments = Vec::new();
        let mut offset = 0;
        for part in path.split('.') {
            parse_segment(path, part, offset, &mut segments)?;
            offset += part.len() + 1;
        }
        Ok(Self { segments })
    }
}

fn parse_segment(
    path: &str,
    part: &str,
    offset: usize,
    segments: &mut Vec<PathSegment>,
) -> Result<(), InvalidPathError> {
    let error = |at: usize, reason| Err(InvalidPathError::new(path, offset + at, reason));

    if part.is_empty() {
        return error(0, PathErrorReason::EmptySegment);
    }

    let key_end = part.find('[').unwrap_or(part.len());
    let key = &part[..key_end];
    if key.is_empty() {
        return error(0, PathErrorReason::MissingKey);
    }
    if let Some(at) = key.find(']') {
        return error(at, PathErrorReason::UnexpectedBracket);
    }
    segments.push(PathSegment::Key(key.to_string()));

    let mut cursor = key_end;
    while cursor < part.len() {
        let rest = &part[cursor..];
        let Some(first) = rest.chars().next() else {
            break;
        };
        if first == ']' {
            return error(cursor, PathErrorReason::UnexpectedBracket);
        }
        if first != '[' {
            return error(cursor, PathErrorReason::TrailingCharacter(first));
        }
        let Some(close) = rest.find(']') else {
            return error(cursor, PathErrorReason::UnclosedBracket);
        };
        let digits = &rest[1..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return error(
                cursor + 1,
                PathErrorReason::InvalidIndex(digits.to_string()),
            );
        }
        let index = match digits.parse::<usize>() {
            Ok(index) if index <= MAX_INDEX => index,
            _ => {
                return error(
                    cursor + 1,
                    PathErrorReason::IndexOutOfRange(digits.to_string()),
                );
            }
        };
        segments.push(PathSegment::Index(index));
        cursor += close + 1;
    }
    Ok(())
}

impl fmt::Display for DraftPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Return a copy of `root` with `value` stored at `path`.
///
/// ```
/// use draft_model::{record_from_json, set_nested_value};
/// use serde_json::json;
///
/// let form = record_from_json(json!({"packages": [{"name": "x"}]})).unwrap();
/// let updated = set_nested_value(&form, "packages[0].name", "y".into()).unwrap();
///
/// assert_eq!(updated, record_from_json(json!({"packages": [{"name": "y"}]})).unwrap());
/// assert_eq!(form, record_from_json(json!({"packages": [{"name": "x"}]})).unwrap());
/// ```
pub fn set_nested_value(
    root: &Record,
    path: &str,
    value: DraftValue,
) -> Result<Record, InvalidPathError> {
    let path: DraftPath = path.parse()?;
    Ok(path.set(root, value))
}

/// Read the value stored at `path`. Absent paths yield `Ok(None)`.
pub fn get_nested_value<'a>(
    root: &'a Record,
    path: &str,
) -> Result<Option<&'a DraftValue>, InvalidPathError> {
    let path: DraftPath = path.parse()?;
    Ok(path.get(root))
}
