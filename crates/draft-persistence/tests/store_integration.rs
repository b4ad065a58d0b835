use std::sync::{Arc, Mutex};
use std::time::Duration;

use draft_model::{DraftValue, FileHandle, Record, record_from_json};
use draft_persistence::{
    AutoSaveConfig, DraftOptions, DraftStore, FileStore, KeyValueStore, ManualClock, MemoryStore,
    PersistenceError, SaveNotice,
};
use serde::Deserialize;
use serde_json::json;
use tempfile::tempdir;

/// Memory store that records every write.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<(String, String)>>,
}

impl RecordingStore {
    fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> draft_persistence::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> draft_persistence::Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> draft_persistence::Result<()> {
        self.inner.delete(key)
    }

    fn keys(&self) -> draft_persistence::Result<Vec<String>> {
        self.inner.keys()
    }
}

fn record(value: serde_json::Value) -> Record {
    record_from_json(value).unwrap()
}

fn shape() -> Record {
    record(json!({
        "name": "",
        "layout": "horizontal",
        "styles": {"primaryColor": "#3b82f6", "textColor": "#000000"},
        "packages": [{"id": 1, "name": ""}]
    }))
}

fn open_store(storage: Arc<dyn KeyValueStore>, clock: &Arc<ManualClock>) -> DraftStore {
    DraftStore::open(DraftOptions::new("checkout-new"), shape, storage).with_clock(clock.clone())
}

#[test]
fn update_is_visible_immediately_and_keeps_defaults() {
    let storage = Arc::new(RecordingStore::default());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store.update(record(json!({"styles": {"primaryColor": "#ff0000"}})));

    assert_eq!(
        store.state()["styles"],
        DraftValue::from(json!({"primaryColor": "#ff0000", "textColor": "#000000"}))
    );
    assert_eq!(store.state()["layout"], DraftValue::from("horizontal"));
    assert!(storage.writes().is_empty());
}

#[test]
fn write_waits_for_quiet_period() {
    let storage = Arc::new(RecordingStore::default());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store.update(record(json!({"name": "First"})));
    clock.advance(Duration::from_millis(999));
    assert!(!store.tick());
    assert!(storage.writes().is_empty());

    clock.advance(Duration::from_millis(1));
    assert!(store.tick());
    assert_eq!(storage.writes().len(), 1);
    assert!(store.has_saved_data());
}

#[test]
fn burst_of_updates_writes_once_with_latest_state() {
    let storage = Arc::new(RecordingStore::default());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store.update(record(json!({"name": "A"})));
    clock.advance(Duration::from_millis(600));
    store.tick();
    store.update(record(json!({"name": "AB"})));
    clock.advance(Duration::from_millis(600));
    store.tick();
    store.update(record(json!({"name": "ABC"})));

    // 1200ms after the first update, but only 0ms after the last one
    assert!(!store.tick());
    clock.advance(Duration::from_millis(1000));
    assert!(store.tick());
    clock.advance(Duration::from_secs(10));
    assert!(!store.tick());

    let writes = storage.writes();
    assert_eq!(writes.len(), 1);
    let saved: serde_json::Value = serde_json::from_str(&writes[0].1).unwrap();
    assert_eq!(saved["name"], json!("ABC"));
    assert_eq!(writes[0].0, "checkout-new");
}

#[test]
fn update_with_sees_previous_state() {
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage, &clock);

    store.update(record(json!({"name": "Course"})));
    store.update_with(|prev| {
        let name = prev["name"].as_str().unwrap_or_default();
        record(json!({"name": format!("{name} (copy)")}))
    });

    assert_eq!(store.state()["name"], DraftValue::from("Course (copy)"));
}

#[test]
fn packages_list_is_replaced_wholesale() {
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage, &clock);

    store.update(record(json!({"packages": [{"name": "Basic"}, {"name": "Pro"}]})));
    assert_eq!(
        store.state()["packages"],
        DraftValue::from(json!([{"name": "Basic"}, {"name": "Pro"}]))
    );

    store.set("packages[1].name", "Premium").unwrap();
    assert_eq!(
        store.state()["packages"],
        DraftValue::from(json!([{"name": "Basic"}, {"name": "Premium"}]))
    );
}

#[test]
fn clear_removes_saved_copy_and_reload_fails() {
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store.update(record(json!({"name": "Draft"})));
    store.flush().unwrap();
    assert!(storage.get("checkout-new").unwrap().is_some());

    store.update(record(json!({"name": "Unsaved"})));
    store.clear();

    assert_eq!(store.state(), &shape());
    assert!(!store.has_saved_data());
    assert!(!store.has_pending_save());
    assert_eq!(storage.get("checkout-new").unwrap(), None);
    assert!(!store.force_reload());
    assert_eq!(store.state(), &shape());
}

#[test]
fn reset_restores_defaults_and_keeps_saved_copy() {
    let storage = Arc::new(RecordingStore::default());
    storage
        .set("checkout-new", r#"{"name":"Saved"}"#)
        .unwrap();
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);
    store.set("layout", "vertical").unwrap();

    store.reset();

    assert_eq!(store.state(), &shape());
    assert!(!store.has_pending_save());
    assert!(store.has_saved_data());
    assert_eq!(
        storage.get("checkout-new").unwrap().as_deref(),
        Some(r#"{"name":"Saved"}"#)
    );
}

#[test]
fn force_reload_picks_up_external_changes() {
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    storage
        .set("checkout-new", r##"{"name":"From another tab","styles":{"textColor":"#111"}}"##)
        .unwrap();

    assert!(store.force_reload());
    assert!(store.has_saved_data());
    assert_eq!(store.state()["name"], DraftValue::from("From another tab"));
    assert_eq!(
        store.state()["styles"],
        DraftValue::from(json!({"primaryColor": "#3b82f6", "textColor": "#111"}))
    );
}

#[test]
fn malformed_saved_copy_falls_back_to_defaults() {
    let storage = Arc::new(MemoryStore::new());
    storage.set("checkout-new", "{not json").unwrap();
    let clock = Arc::new(ManualClock::new());

    let mut store = open_store(storage.clone(), &clock);
    assert_eq!(store.state(), &shape());
    assert!(!store.has_saved_data());

    store.update(record(json!({"name": "Kept"})));
    assert!(!store.force_reload());
    assert_eq!(store.state()["name"], DraftValue::from("Kept"));
    assert!(matches!(
        store.read_saved(),
        Err(PersistenceError::Deserialization { .. })
    ));
}

#[test]
fn non_object_saved_copy_is_treated_as_absent() {
    let storage = Arc::new(MemoryStore::new());
    storage.set("checkout-new", "[1, 2, 3]").unwrap();
    let clock = Arc::new(ManualClock::new());

    let store = open_store(storage, &clock);
    assert_eq!(store.state(), &shape());
    assert!(!store.has_saved_data());
}

#[test]
fn load_replaces_state_without_writing() {
    let storage = Arc::new(RecordingStore::default());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store.load(record(json!({"name": "Preset", "timer": {"enabled": true}})));

    assert_eq!(store.state()["name"], DraftValue::from("Preset"));
    assert_eq!(store.state()["timer"], DraftValue::from(json!({"enabled": true})));
    assert_eq!(store.state()["layout"], DraftValue::from("horizontal"));
    assert!(store.has_saved_data());
    assert!(!store.has_pending_save());
    clock.advance(Duration::from_secs(5));
    store.tick();
    assert!(storage.writes().is_empty());
}

#[test]
fn file_handles_are_never_persisted() {
    let storage = Arc::new(RecordingStore::default());
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store
        .set(
            "deliverable.file",
            FileHandle::new("guide.pdf", "application/pdf", vec![0x25, 0x50, 0x44, 0x46]),
        )
        .unwrap();
    store.set("deliverable.name", "Guide").unwrap();
    assert!(store.state()["deliverable"].as_record().unwrap()["file"].is_file());

    clock.advance(Duration::from_secs(1));
    store.tick();

    let writes = storage.writes();
    let saved: serde_json::Value = serde_json::from_str(&writes[0].1).unwrap();
    assert_eq!(saved["deliverable"], json!({"name": "Guide"}));
    // Still in memory
    assert!(store.state()["deliverable"].as_record().unwrap()["file"].is_file());
}

#[test]
fn failed_write_keeps_state_and_is_not_retried() {
    let storage = Arc::new(MemoryStore::with_quota(16));
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store.update(record(json!({"name": "far too long for the quota"})));
    clock.advance(Duration::from_secs(1));

    assert!(store.tick());
    assert_eq!(store.state()["name"], DraftValue::from("far too long for the quota"));
    assert!(!store.has_saved_data());
    assert!(!store.has_pending_save());
    assert!(storage.is_empty());

    assert!(matches!(
        store.flush(),
        Err(PersistenceError::QuotaExceeded { .. })
    ));
}

#[test]
fn notifier_called_after_successful_save_only() {
    let notices: Arc<Mutex<Vec<SaveNotice>>> = Arc::default();
    let sink = notices.clone();
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());

    let options = DraftOptions::new("checkout-new")
        .with_autosave(AutoSaveConfig::default().with_notify(true));
    let mut store = DraftStore::open(options, shape, storage)
        .with_clock(clock.clone())
        .with_notifier(Arc::new(move |notice: &SaveNotice| {
            sink.lock().unwrap().push(notice.clone());
        }));

    store.update(record(json!({"name": "x"})));
    clock.advance(Duration::from_secs(1));
    store.tick();

    let notices = notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key, "checkout-new");
    assert_eq!(notices[0].title, "Auto-saved");
}

#[test]
fn notifier_silent_when_notify_disabled() {
    let count = Arc::new(Mutex::new(0));
    let sink = count.clone();
    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());

    let mut store = open_store(storage, &clock).with_notifier(Arc::new(move |_: &SaveNotice| {
        *sink.lock().unwrap() += 1;
    }));
    store.update(record(json!({"name": "x"})));
    clock.advance(Duration::from_secs(1));
    assert!(store.tick());
    assert_eq!(*count.lock().unwrap(), 0);
}

#[test]
fn disabled_autosave_only_writes_on_flush() {
    let storage = Arc::new(RecordingStore::default());
    let clock = Arc::new(ManualClock::new());
    let options = DraftOptions::new("checkout-new").with_autosave(AutoSaveConfig::disabled());
    let mut store =
        DraftStore::open(options, shape, storage.clone()).with_clock(clock.clone());

    store.update(record(json!({"name": "x"})));
    assert!(!store.has_pending_save());
    clock.advance(Duration::from_secs(60));
    assert!(!store.tick());
    assert!(storage.writes().is_empty());

    store.flush().unwrap();
    assert_eq!(storage.writes().len(), 1);
}

#[test]
fn switch_key_saves_pending_changes_under_old_key() {
    let storage = Arc::new(MemoryStore::new());
    storage.set("checkout-edit-7", r#"{"name":"Seven"}"#).unwrap();
    let clock = Arc::new(ManualClock::new());
    let mut store = open_store(storage.clone(), &clock);

    store.update(record(json!({"name": "New one"})));
    store.switch_key("checkout-edit-7");

    assert_eq!(store.key(), "checkout-edit-7");
    assert!(store.has_saved_data());
    assert!(!store.has_pending_save());
    let old: serde_json::Value =
        serde_json::from_str(&storage.get("checkout-new").unwrap().unwrap()).unwrap();
    assert_eq!(old["name"], json!("New one"));
    // In-memory state is kept until the caller loads something else
    assert_eq!(store.state()["name"], DraftValue::from("New one"));
}

#[test]
fn typed_view_of_state() {
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Styles {
        primary_color: String,
    }

    #[derive(Debug, Deserialize)]
    struct Form {
        layout: String,
        styles: Styles,
    }

    let storage = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let store = open_store(storage, &clock);

    let form: Form = store.state_as().unwrap();
    assert_eq!(form.layout, "horizontal");
    assert_eq!(form.styles.primary_color, "#3b82f6");
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new());

    {
        let storage = Arc::new(FileStore::new(dir.path()));
        let mut store = open_store(storage, &clock);
        store.set("styles.textColor", "#222222").unwrap();
        clock.advance(Duration::from_secs(1));
        assert!(store.tick());
    }

    let storage = Arc::new(FileStore::new(dir.path()));
    let store = open_store(storage, &clock);
    assert!(store.has_saved_data());
    assert_eq!(
        store.state()["styles"],
        DraftValue::from(json!({"primaryColor": "#3b82f6", "textColor": "#222222"}))
    );
}
