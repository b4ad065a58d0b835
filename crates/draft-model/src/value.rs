//! Draft value model.
//!
//! A draft is a record of fields, each of which is a scalar, an array, a
//! nested record or an in-memory file handle. File handles are kept so the
//! form can hold an upload in progress, but they are never persisted: JSON
//! serialization drops them from records and writes `null` in arrays.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use crate::error::{ModelError, Result};

/// Insertion-ordered map of field names to values.
pub type Record = IndexMap<String, DraftValue>;

/// A single field value inside a draft.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DraftValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<DraftValue>),
    Record(Record),
    /// Binary file handle. Lives in memory only.
    File(FileHandle),
}

/// Field kind, used for error messages and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Array,
    Record,
    File,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Scalar => "scalar",
            Self::Array => "array",
            Self::Record => "record",
            Self::File => "file handle",
        };
        f.write_str(label)
    }
}

/// An uploaded file held in a draft field.
#[derive(Clone, PartialEq)]
pub struct FileHandle {
    pub name: String,
    pub mime_type: String,
    bytes: Arc<[u8]>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl DraftValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Array(_) => FieldKind::Array,
            Self::Record(_) => FieldKind::Record,
            Self::File(_) => FieldKind::File,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => FieldKind::Scalar,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DraftValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Convert to plain JSON, dropping file handles.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null | Self::File(_) => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(DraftValue::to_json).collect())
            }
            Self::Record(record) => serde_json::Value::Object(record_to_json(record)),
        }
    }
}

fn record_to_json(record: &Record) -> serde_json::Map<String, serde_json::Value> {
    record
        .iter()
        .filter(|(_, value)| !value.is_file())
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

impl Serialize for DraftValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::File(_) => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Record(record) => serialize_record(record, serializer),
        }
    }
}

fn serialize_record<S: Serializer>(
    record: &Record,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let persistable = record.values().filter(|value| !value.is_file()).count();
    let mut map = serializer.serialize_map(Some(persistable))?;
    for (key, value) in record.iter().filter(|(_, value)| !value.is_file()) {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Serializes a borrowed record with file handles omitted at every level.
struct PersistableRecord<'a>(&'a Record);

impl Serialize for PersistableRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_record(self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for DraftValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<serde_json::Value> for DraftValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Record(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for DraftValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for DraftValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for DraftValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for DraftValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for DraftValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for DraftValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DraftValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<DraftValue>> for DraftValue {
    fn from(value: Vec<DraftValue>) -> Self {
        Self::Array(value)
    }
}

impl From<Record> for DraftValue {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<FileHandle> for DraftValue {
    fn from(value: FileHandle) -> Self {
        Self::File(value)
    }
}

/// Convert a JSON value into a record, rejecting anything but an object.
pub fn record_from_json(value: serde_json::Value) -> Result<Record> {
    match DraftValue::from(value) {
        DraftValue::Record(record) => Ok(record),
        other => Err(ModelError::NotARecord {
            found: other.kind(),
        }),
    }
}

/// Parse a persisted JSON string into a record.
pub fn parse_record(json: &str) -> Result<Record> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    record_from_json(value)
}

/// Serialize a record to a JSON string, omitting file handles.
pub fn record_to_string(record: &Record) -> Result<String> {
    Ok(serde_json::to_string(&PersistableRecord(record))?)
}

/// Build a record from any serializable value (typically a struct).
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    record_from_json(serde_json::to_value(value)?)
}

/// Read a record back as a typed value. File handles are dropped first.
pub fn from_record<T: DeserializeOwned>(record: &Record) -> Result<T> {
    let json = serde_json::Value::Object(record_to_json(record));
    Ok(serde_json::from_value(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_handles_are_not_serialized() {
        let mut deliverable = Record::new();
        deliverable.insert("type".into(), "upload".into());
        deliverable.insert(
            "file".into(),
            FileHandle::new("ebook.pdf", "application/pdf", vec![1, 2, 3]).into(),
        );
        let mut root = Record::new();
        root.insert("deliverable".into(), deliverable.into());
        root.insert(
            "attachments".into(),
            DraftValue::Array(vec![
                FileHandle::new("a.png", "image/png", vec![0]).into(),
                "kept".into(),
            ]),
        );

        let json = record_to_string(&root).unwrap();
        assert_eq!(
            json,
            r#"{"deliverable":{"type":"upload"},"attachments":[null,"kept"]}"#
        );
    }

    #[test]
    fn test_parse_record_rejects_non_objects() {
        let err = parse_record("[1,2,3]").unwrap_err();
        assert!(matches!(
            err,
            ModelError::NotARecord {
                found: FieldKind::Array
            }
        ));
        assert!(matches!(parse_record("{oops"), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_parse_record_keeps_key_order() {
        let record = parse_record(r#"{"z":1,"a":2,"m":{"y":1,"b":2}}"#).unwrap();
        let keys: Vec<_> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(record_to_string(&record).unwrap(), r#"{"z":1,"a":2,"m":{"y":1,"b":2}}"#);
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(DraftValue::from(f64::NAN), DraftValue::Null);
        assert_eq!(DraftValue::from(1.5), DraftValue::from(json!(1.5)));
    }

    #[test]
    fn test_typed_round_trip_skips_files() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Timer {
            enabled: bool,
            duration: u32,
        }

        let mut record = to_record(&Timer {
            enabled: true,
            duration: 15,
        })
        .unwrap();
        record.insert(
            "file".into(),
            FileHandle::new("x", "text/plain", Vec::new()).into(),
        );

        let timer: Timer = from_record(&record).unwrap();
        assert_eq!(
            timer,
            Timer {
                enabled: true,
                duration: 15
            }
        );
    }

    #[test]
    fn test_file_handle_debug_hides_bytes() {
        let file = FileHandle::new("big.bin", "application/octet-stream", vec![7; 4096]);
        let debug = format!("{file:?}");
        assert!(debug.contains("len: 4096"));
        assert!(!debug.contains("7, 7"));
    }
}
