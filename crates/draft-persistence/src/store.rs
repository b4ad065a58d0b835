//! Auto-saving draft store.
//!
//! [`DraftStore`] holds the merged state of one draft, keeps it a superset
//! of the default shape, and writes it to a [`KeyValueStore`] once updates
//! have been quiet for the debounce delay.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use draft_model::{
    DraftValue, InvalidPathError, ModelError, Record, deep_merge, deep_merge_into, from_record,
    parse_record, record_to_string, set_nested_value,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::autosave::{AutoSaveConfig, Clock, PersistTimer, SystemClock};
use crate::error::{PersistenceError, Result};
use crate::kv::KeyValueStore;
use crate::notify::{Notifier, SaveNotice};
use crate::shape::ShapeFactory;

/// Options for opening a [`DraftStore`].
#[derive(Debug, Clone)]
pub struct DraftOptions {
    /// Storage key the draft is saved under.
    pub key: String,
    /// Auto-save behavior.
    pub autosave: AutoSaveConfig,
}

impl DraftOptions {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            autosave: AutoSaveConfig::default(),
        }
    }

    #[must_use]
    pub fn with_autosave(mut self, autosave: AutoSaveConfig) -> Self {
        self.autosave = autosave;
        self
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.autosave.debounce_ms = debounce_ms;
        self
    }
}

/// Draft state with debounced persistence.
///
/// The store is single-owner: updates apply immediately and are visible to
/// the next read. Writes happen in [`DraftStore::tick`] (or
/// [`DraftStore::flush`]) once the debounce delay has passed.
pub struct DraftStore {
    key: String,
    shape: Box<dyn ShapeFactory>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<dyn Notifier>>,
    config: AutoSaveConfig,
    timer: PersistTimer,
    state: Record,
    has_saved_data: bool,
}

impl DraftStore {
    /// Open the draft under `options.key`.
    ///
    /// A stored draft is merged onto a fresh default shape, so fields added to
    /// the shape since the draft was saved are filled in. Missing, unreadable
    /// or malformed drafts fall back to the default shape.
    pub fn open(
        options: DraftOptions,
        shape: impl ShapeFactory + 'static,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let mut store = Self {
            key: options.key,
            shape: Box::new(shape),
            storage,
            clock: Arc::new(SystemClock),
            notifier: None,
            config: options.autosave,
            timer: PersistTimer::new(),
            state: Record::new(),
            has_saved_data: false,
        };

        match store.read_persisted() {
            Some(persisted) => {
                store.state = store.merged_with_shape(persisted);
                store.has_saved_data = true;
                debug!(key = %store.key, "Resumed saved draft");
            }
            None => {
                store.state = store.shape.build();
            }
        }
        store
    }

    /// Use a different time source for the debounce timer.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send a notice after each successful auto-save.
    ///
    /// Only used when the auto-save config has `notify` set.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Current merged state.
    #[inline]
    pub fn state(&self) -> &Record {
        &self.state
    }

    /// Read the state as a typed value. File handles are left out.
    pub fn state_as<T: DeserializeOwned>(&self) -> std::result::Result<T, ModelError> {
        from_record(&self.state)
    }

    /// Storage key of this draft.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a saved copy of this draft is known to exist.
    #[inline]
    pub fn has_saved_data(&self) -> bool {
        self.has_saved_data
    }

    /// Whether an auto-save is scheduled.
    #[inline]
    pub fn has_pending_save(&self) -> bool {
        self.timer.is_pending()
    }

    /// Time left until the scheduled auto-save.
    pub fn next_save_in(&self) -> Option<Duration> {
        self.timer.remaining(self.clock.now())
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.config
    }

    /// Merge `partial` into the state and schedule a save.
    ///
    /// The result is merged onto a fresh default shape, so no default field
    /// can be lost by an update.
    pub fn update(&mut self, partial: Record) {
        let candidate = deep_merge(&self.state, &partial);
        self.state = self.merged_with_shape(candidate);
        self.schedule_save();
    }

    /// Like [`DraftStore::update`], computing the partial from the current state.
    pub fn update_with<F>(&mut self, updater: F)
    where
        F: FnOnce(&Record) -> Record,
    {
        let partial = updater(&self.state);
        self.update(partial);
    }

    /// Set a single field by path, e.g. `packages[0].name`.
    ///
    /// An invalid path leaves the state and the pending save untouched.
    pub fn set(
        &mut self,
        path: &str,
        value: impl Into<DraftValue>,
    ) -> std::result::Result<(), InvalidPathError> {
        let next = set_nested_value(&self.state, path, value.into())?;
        self.update(next);
        Ok(())
    }

    /// Delete the saved copy and reset to the default shape.
    pub fn clear(&mut self) {
        self.timer.cancel();
        if let Err(error) = self.storage.delete(&self.key) {
            warn!(key = %self.key, %error, "Failed to delete saved draft");
        }
        self.state = self.shape.build();
        self.has_saved_data = false;
        debug!(key = %self.key, "Draft cleared");
    }

    /// Reset the state to the default shape and drop any pending save.
    ///
    /// Unlike [`DraftStore::clear`] the saved copy is left in place.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.state = self.shape.build();
        debug!(key = %self.key, "Draft reset to defaults");
    }

    /// Replace the state with `data` merged onto the default shape.
    ///
    /// Used to import a preset or a server-side record. Does not write to
    /// storage and does not schedule a save.
    pub fn load(&mut self, data: Record) {
        self.state = self.merged_with_shape(data);
        self.has_saved_data = true;
    }

    /// Re-read the saved copy.
    ///
    /// Returns `false` and keeps the current state if nothing usable is
    /// stored.
    pub fn force_reload(&mut self) -> bool {
        match self.read_persisted() {
            Some(persisted) => {
                self.state = self.merged_with_shape(persisted);
                self.has_saved_data = true;
                true
            }
            None => {
                self.has_saved_data = false;
                false
            }
        }
    }

    /// Run the scheduled save if it is due.
    ///
    /// Returns `true` if a write was attempted. Failures are logged and not
    /// retried; the in-memory state is kept either way.
    pub fn tick(&mut self) -> bool {
        if !self.timer.take_due(self.clock.now()) {
            return false;
        }
        match self.write_state() {
            Ok(()) => self.send_notice(),
            Err(error) => {
                error!(key = %self.key, %error, "Auto-save failed");
            }
        }
        true
    }

    /// Cancel any scheduled save and write the state now.
    pub fn flush(&mut self) -> Result<()> {
        self.timer.cancel();
        self.write_state()
    }

    /// Point the store at another key, keeping the in-memory state.
    ///
    /// A save still pending for the old key is written first so the old draft
    /// is not lost.
    pub fn switch_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.key {
            return;
        }
        if self.timer.is_pending() {
            if let Err(error) = self.flush() {
                error!(key = %self.key, %error, "Failed to save draft before switching key");
            }
        }
        debug!(from = %self.key, to = %key, "Switching draft key");
        self.key = key;
        self.has_saved_data = matches!(self.storage.get(&self.key), Ok(Some(_)));
    }

    /// Raw saved copy for the current key, bypassing the merged state.
    ///
    /// Unlike [`DraftStore::force_reload`] this surfaces errors.
    pub fn read_saved(&self) -> Result<Option<Record>> {
        let Some(json) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        parse_record(&json)
            .map(Some)
            .map_err(|source| PersistenceError::Deserialization {
                key: self.key.clone(),
                source,
            })
    }

    /// Remove the saved copy without touching the in-memory state.
    pub fn discard_saved(&mut self) -> Result<()> {
        self.timer.cancel();
        self.storage.delete(&self.key)?;
        self.has_saved_data = false;
        Ok(())
    }

    /// Cancel any scheduled save. Nothing is written afterwards unless the
    /// state is updated again.
    pub fn close(&mut self) {
        if self.timer.cancel() {
            debug!(key = %self.key, "Discarded pending save");
        }
    }

    fn merged_with_shape(&self, data: Record) -> Record {
        let mut state = self.shape.build();
        deep_merge_into(&mut state, data);
        state
    }

    fn read_persisted(&self) -> Option<Record> {
        match self.read_saved() {
            Ok(persisted) => persisted,
            Err(error) => {
                warn!(key = %self.key, %error, "Ignoring unusable saved draft");
                None
            }
        }
    }

    fn schedule_save(&mut self) {
        if !self.config.enabled {
            return;
        }
        let replaced = self
            .timer
            .schedule(self.clock.now(), self.config.debounce());
        debug!(
            key = %self.key,
            debounce_ms = self.config.debounce_ms,
            replaced,
            "Draft save scheduled"
        );
    }

    fn write_state(&mut self) -> Result<()> {
        let json =
            record_to_string(&self.state).map_err(|source| PersistenceError::Serialization {
                key: self.key.clone(),
                source,
            })?;
        self.storage.set(&self.key, &json)?;
        self.has_saved_data = true;
        debug!(key = %self.key, bytes = json.len(), "Draft saved");
        Ok(())
    }

    fn send_notice(&self) {
        if !self.config.notify {
            return;
        }
        if let Some(notifier) = &self.notifier {
            notifier.notify(&SaveNotice::saved(&self.key));
        }
    }
}

impl Drop for DraftStore {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftStore")
            .field("key", &self.key)
            .field("config", &self.config)
            .field("timer", &self.timer)
            .field("has_saved_data", &self.has_saved_data)
            .field("fields", &self.state.len())
            .finish_non_exhaustive()
    }
}
