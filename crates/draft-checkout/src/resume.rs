//! Switching the builder between checkouts.

use std::sync::Arc;

use draft_model::{DraftValue, FileHandle, Record};
use draft_persistence::{DraftStore, KeyValueStore};
use tracing::{info, warn};

use crate::key::{DraftKey, DraftKeyError};
use crate::shape::checkout_shape;

/// Fewest fields a saved edit draft must have to be trusted.
const MIN_RESUMABLE_FIELDS: usize = 5;

/// What [`resume_or_discard`] did with the saved draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// A saved draft was found and loaded.
    Resumed,
    /// A saved draft was unusable and has been deleted; the original was loaded.
    DiscardedStale,
    /// Nothing was saved; the original was loaded.
    LoadedOriginal,
}

/// Open the checkout draft for `key` with the checkout defaults.
pub fn open_checkout(key: &DraftKey, storage: Arc<dyn KeyValueStore>) -> DraftStore {
    DraftStore::open(key.options(), checkout_shape, storage)
}

/// Whether a saved edit draft is complete enough to resume.
///
/// A draft needs a selected product and more than five fields.
pub fn is_resumable(saved: &Record) -> bool {
    let has_product = saved
        .get("selectedProduct")
        .and_then(DraftValue::as_str)
        .is_some_and(|product| !product.is_empty());
    has_product && saved.len() > MIN_RESUMABLE_FIELDS
}

/// Point `store` at the edit draft of checkout `id`.
///
/// Resumes a usable saved draft. Otherwise the stale entry (if any) is
/// deleted and `original`, the checkout as last saved on the server, is
/// loaded. An empty `id` is rejected before the store is touched.
pub fn resume_or_discard(
    store: &mut DraftStore,
    id: &str,
    original: Record,
) -> Result<ResumeOutcome, DraftKeyError> {
    store.switch_key(DraftKey::edit(id)?.to_string());

    let stale = match store.read_saved() {
        Ok(Some(saved)) if is_resumable(&saved) => {
            store.force_reload();
            info!(key = %store.key(), "Resuming saved checkout draft");
            return Ok(ResumeOutcome::Resumed);
        }
        Ok(Some(_)) => true,
        Ok(None) => false,
        Err(error) => {
            warn!(key = %store.key(), %error, "Saved checkout draft is unreadable");
            true
        }
    };

    if stale {
        if let Err(error) = store.discard_saved() {
            warn!(key = %store.key(), %error, "Failed to remove stale checkout draft");
        }
    }
    store.load(original);

    Ok(if stale {
        ResumeOutcome::DiscardedStale
    } else {
        ResumeOutcome::LoadedOriginal
    })
}

/// Point `store` at the new-checkout draft.
///
/// Coming from an edit draft, a saved new-checkout draft is picked up, or the
/// form is reset to its defaults if there is none (a malformed one stays in
/// storage). A store already on the new-checkout draft keeps its unsaved
/// edits and pending save.
///
/// Returns whether the form is backed by a saved new-checkout draft.
pub fn start_new_checkout(store: &mut DraftStore) -> bool {
    let new_key = DraftKey::New.to_string();
    if store.key() == new_key {
        return store.has_saved_data();
    }
    store.switch_key(new_key);
    if store.force_reload() {
        return true;
    }
    store.reset();
    false
}

/// Put an uploaded file in `deliverable.file`.
///
/// The file stays in memory only; saved drafts never contain it.
pub fn attach_deliverable(store: &mut DraftStore, file: FileHandle) {
    let deliverable = Record::from([("file".to_string(), DraftValue::from(file))]);
    store.update(Record::from([("deliverable".to_string(), deliverable.into())]));
}

/// Remove the uploaded file along with its previously uploaded URL.
pub fn remove_deliverable(store: &mut DraftStore) {
    let deliverable = Record::from([
        ("file".to_string(), DraftValue::Null),
        ("fileUrl".to_string(), DraftValue::from("")),
    ]);
    store.update(Record::from([("deliverable".to_string(), deliverable.into())]));
}
