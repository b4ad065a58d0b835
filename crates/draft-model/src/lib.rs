//! Draft value model for auto-saved configuration forms.
//!
//! A draft is a nested [`Record`] of [`DraftValue`]s. This crate provides the
//! pure operations the draft store is built on:
//!
//! - **Deep merge** ([`deep_merge`]) - lay a partial record over a complete one
//! - **Nested-path updates** ([`set_nested_value`]) - write one field by path
//! - **JSON conversion** - file handles are dropped on the way out
//!
//! # Example
//!
//! ```
//! use draft_model::{deep_merge, record_from_json};
//! use serde_json::json;
//!
//! let defaults = record_from_json(json!({"a": 1, "b": {"c": 2, "d": 3}})).unwrap();
//! let saved = record_from_json(json!({"b": {"c": 99}})).unwrap();
//!
//! let merged = deep_merge(&defaults, &saved);
//! assert_eq!(merged, record_from_json(json!({"a": 1, "b": {"c": 99, "d": 3}})).unwrap());
//! ```

pub mod error;
pub mod merge;
pub mod path;
pub mod value;

pub use error::{InvalidPathError, ModelError, PathErrorReason, Result};
pub use merge::{deep_merge, deep_merge_into};
pub use path::{DraftPath, MAX_INDEX, PathSegment, get_nested_value, set_nested_value};
pub use value::{
    DraftValue, FieldKind, FileHandle, Record, from_record, parse_record, record_from_json,
    record_to_string, to_record,
};
