//! Structural deep merge of draft records.

use crate::value::{DraftValue, Record};

/// Merge `source` over `target`, returning a new record.
///
/// Every key in `source` overrides the same key in `target`, except when both
/// sides hold a record: those are merged recursively. Arrays and file handles
/// are atomic and replaced wholesale, never merged element by element. Keys
/// that only exist in `target` are kept as they are.
///
/// Keys keep `target`'s order; keys new in `source` are appended in source
/// order.
pub fn deep_merge(target: &Record, source: &Record) -> Record {
    let mut output = target.clone();
    for (key, source_value) in source {
        let merged = match (target.get(key), source_value) {
            (Some(DraftValue::Record(target_record)), DraftValue::Record(source_record)) => {
                DraftValue::Record(deep_merge(target_record, source_record))
            }
            _ => source_value.clone(),
        };
        output.insert(key.clone(), merged);
    }
    output
}

/// Merge `source` over `target` in place.
///
/// Same semantics as [`deep_merge`] without cloning `target` first.
pub fn deep_merge_into(target: &mut Record, source: Record) {
    for (key, source_value) in source {
        match source_value {
            DraftValue::Record(source_record) => {
                if let Some(DraftValue::Record(target_record)) = target.get_mut(&key) {
                    deep_merge_into(target_record, source_record);
                } else {
                    target.insert(key, DraftValue::Record(source_record));
                }
            }
            other => {
                target.insert(key, other);
            }
        }
    }
}
