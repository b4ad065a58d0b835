//! Command implementations for the `drafts` CLI.
//!
//! Commands that change a draft go through a [`DraftStore`] so the stored
//! copy always carries the default fields, then wait until the change has
//! been auto-saved before returning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Local;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use draft_checkout::{
    DraftKey, ResumeOutcome, checkout_shape, resume_or_discard, start_new_checkout,
};
use draft_model::{DraftValue, Record, get_nested_value, parse_record, record_to_string};
use draft_persistence::{
    AutoSaveConfig, AutoSaveDriver, DEFAULT_POLL_INTERVAL, DraftOptions, DraftStore, EmptyShape,
    FileStore, KeyValueStore, LogNotifier, SharedDraftStore, StoredEntry, TokioClock,
    flush_shared,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::logging::redact_value;
use crate::settings::Settings;

/// Draft directory plus the auto-save settings drafts are opened with.
#[derive(Debug, Clone)]
pub struct DraftWorkspace {
    storage: Arc<FileStore>,
    autosave: AutoSaveConfig,
}

impl DraftWorkspace {
    pub fn new(dir: impl Into<PathBuf>, autosave: AutoSaveConfig) -> Self {
        Self {
            storage: Arc::new(FileStore::new(dir)),
            autosave,
        }
    }

    pub fn from_settings(settings: &Settings, store_dir: Option<&Path>) -> Self {
        Self::new(settings.storage_dir(store_dir), settings.autosave.clone())
    }

    pub fn dir(&self) -> &Path {
        self.storage.base_dir()
    }

    /// Open the draft under `key`.
    ///
    /// Checkout keys get the checkout form as default shape; other keys
    /// start empty.
    pub fn open(&self, key: &str) -> DraftStore {
        let options = DraftOptions::new(key).with_autosave(self.autosave.clone());
        let storage: Arc<dyn KeyValueStore> = self.storage.clone();
        let store = if key.parse::<DraftKey>().is_ok() {
            DraftStore::open(options, checkout_shape, storage)
        } else {
            DraftStore::open(options, EmptyShape, storage)
        };
        store
            .with_clock(Arc::new(TokioClock))
            .with_notifier(Arc::new(LogNotifier))
    }

    fn open_shared(&self, key: &str) -> SharedDraftStore {
        Arc::new(Mutex::new(self.open(key)))
    }

    /// Wait for the pending auto-save, or save now if auto-save is off.
    async fn settle(&self, store: &SharedDraftStore) -> Result<()> {
        let enabled = store.lock().await.config().enabled;
        if enabled {
            let _driver = AutoSaveDriver::spawn(store, DEFAULT_POLL_INTERVAL);
            loop {
                let Some(wait) = store.lock().await.next_save_in() else {
                    break;
                };
                tokio::time::sleep(wait + DEFAULT_POLL_INTERVAL).await;
            }
        } else {
            let key = store.lock().await.key().to_string();
            flush_shared(store)
                .await
                .with_context(|| format!("Failed to save draft `{key}`"))?;
        }
        self.verify_saved(&*store.lock().await)
    }

    /// Auto-save failures are only logged, so compare what landed on disk.
    fn verify_saved(&self, store: &DraftStore) -> Result<()> {
        let expected = record_to_string(store.state()).context("Failed to serialize draft")?;
        let saved = self.storage.get(store.key())?;
        if saved.as_deref() != Some(expected.as_str()) {
            bail!(
                "Draft `{}` was not saved, see the log for details",
                store.key()
            );
        }
        Ok(())
    }
}

/// Parse a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> DraftValue {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(DraftValue::from)
        .unwrap_or_else(|_| DraftValue::from(raw))
}

/// Merged draft as pretty JSON.
pub fn run_show(workspace: &DraftWorkspace, key: &str) -> Result<String> {
    let store = workspace.open(key);
    let json = DraftValue::from(store.state().clone()).to_json();
    serde_json::to_string_pretty(&json).context("Failed to format draft")
}

/// Value at `path`, or `None` if the field does not exist.
pub fn run_get(
    workspace: &DraftWorkspace,
    key: &str,
    path: &str,
) -> Result<Option<serde_json::Value>> {
    let store = workspace.open(key);
    let value = get_nested_value(store.state(), path)
        .with_context(|| format!("Invalid field path `{path}`"))?;
    Ok(value.map(DraftValue::to_json))
}

pub async fn run_set(workspace: &DraftWorkspace, key: &str, path: &str, raw: &str) -> Result<()> {
    let store = workspace.open_shared(key);
    {
        let mut store = store.lock().await;
        debug!(key, path, value = redact_value(raw), "Setting draft field");
        store
            .set(path, parse_value(raw))
            .with_context(|| format!("Invalid field path `{path}`"))?;
    }
    workspace.settle(&store).await
}

/// Deep-merge a JSON object into the draft.
pub async fn run_merge(workspace: &DraftWorkspace, key: &str, json: &str) -> Result<()> {
    let partial = parse_record(json).context("Merge input must be a JSON object")?;
    debug!(key, fields = partial.len(), "Merging into draft");
    let store = workspace.open_shared(key);
    store.lock().await.update(partial);
    workspace.settle(&store).await
}

/// Replace the draft with the contents of `file`, keeping default fields.
pub async fn run_import(workspace: &DraftWorkspace, key: &str, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let record = parse_record(&content)
        .with_context(|| format!("{} does not contain a JSON object", file.display()))?;

    let store = workspace.open_shared(key);
    store.lock().await.load(record);
    flush_shared(&store)
        .await
        .with_context(|| format!("Failed to save draft `{key}`"))?;
    info!(key, file = %file.display(), "Imported draft");
    Ok(())
}

/// Delete the saved draft. Returns whether one existed.
pub fn run_clear(workspace: &DraftWorkspace, key: &str) -> Result<bool> {
    let existed = workspace.storage.get(key)?.is_some();
    let mut store = workspace.open(key);
    store.clear();
    if workspace.storage.get(key)?.is_some() {
        bail!("Failed to delete draft `{key}`, see the log for details");
    }
    if existed {
        info!(key, "Cleared draft");
    }
    Ok(existed)
}

pub fn run_keys(workspace: &DraftWorkspace) -> Result<Vec<StoredEntry>> {
    workspace
        .storage
        .entries()
        .with_context(|| format!("Failed to list drafts in {}", workspace.dir().display()))
}

/// Switch to the new-checkout draft. Returns whether a saved one was resumed.
pub fn run_new_checkout(workspace: &DraftWorkspace) -> bool {
    let mut store = workspace.open(&DraftKey::New.to_string());
    start_new_checkout(&mut store)
}

/// Open the edit draft of checkout `id`.
///
/// `original` is the checkout as stored on the server. When no usable draft
/// exists, the original becomes the draft and is saved.
pub async fn run_edit_checkout(
    workspace: &DraftWorkspace,
    id: &str,
    original: Option<&Path>,
) -> Result<ResumeOutcome> {
    let original = match original {
        Some(file) => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            parse_record(&content)
                .with_context(|| format!("{} does not contain a JSON object", file.display()))?
        }
        None => Record::new(),
    };

    let key = DraftKey::edit(id)?;
    let store = workspace.open_shared(&key.to_string());
    let outcome = resume_or_discard(&mut *store.lock().await, id, original)?;
    if outcome != ResumeOutcome::Resumed {
        flush_shared(&store)
            .await
            .with_context(|| format!("Failed to save draft for checkout `{id}`"))?;
    }
    Ok(outcome)
}

/// Write `settings` to `path`. An existing file is kept unless `force` is set.
///
/// Returns whether the file was written.
pub fn run_init_config(settings: &Settings, path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    settings.save_to(path)?;
    info!(path = %path.display(), "Wrote settings file");
    Ok(true)
}

/// Table of stored drafts.
pub fn keys_table(entries: &[StoredEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Draft", "Size", "Modified"]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for entry in entries {
        let draft = match entry.key.parse::<DraftKey>() {
            Ok(DraftKey::New) => "new checkout".to_string(),
            Ok(DraftKey::Edit(id)) => format!("checkout {id}"),
            Err(_) => "-".to_string(),
        };
        let modified = entry
            .modified
            .map(|time| {
                time.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            entry.key.clone(),
            draft,
            format!("{} B", entry.size),
            modified,
        ]);
    }
    if let Some(column) = table.column_mut(2) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}
