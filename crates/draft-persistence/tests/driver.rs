use std::sync::Arc;
use std::time::Duration;

use draft_model::{Record, record_from_json};
use draft_persistence::{
    AutoSaveDriver, DEFAULT_POLL_INTERVAL, DraftOptions, DraftStore, KeyValueStore, MemoryStore,
    SharedDraftStore, TokioClock, flush_shared,
};
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::sleep;

const KEY: &str = "checkout-new";

fn shape() -> Record {
    record_from_json(json!({"name": "", "layout": "horizontal"})).unwrap()
}

fn shared_store(storage: &Arc<MemoryStore>) -> SharedDraftStore {
    let store = DraftStore::open(DraftOptions::new(KEY), shape, storage.clone())
        .with_clock(Arc::new(TokioClock));
    Arc::new(Mutex::new(store))
}

fn partial(value: serde_json::Value) -> Record {
    record_from_json(value).unwrap()
}

#[tokio::test(start_paused = true)]
async fn driver_writes_after_debounce() {
    let storage = Arc::new(MemoryStore::new());
    let store = shared_store(&storage);
    let _driver = AutoSaveDriver::spawn(&store, DEFAULT_POLL_INTERVAL);

    store.lock().await.update(partial(json!({"name": "Course"})));

    sleep(Duration::from_millis(500)).await;
    assert_eq!(storage.get(KEY).unwrap(), None);

    sleep(Duration::from_millis(700)).await;
    let saved: serde_json::Value =
        serde_json::from_str(&storage.get(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved["name"], json!("Course"));
    assert!(store.lock().await.has_saved_data());
}

#[tokio::test(start_paused = true)]
async fn driver_restarts_quiet_period_on_each_update() {
    let storage = Arc::new(MemoryStore::new());
    let store = shared_store(&storage);
    let _driver = AutoSaveDriver::spawn(&store, DEFAULT_POLL_INTERVAL);

    for name in ["a", "ab", "abc", "abcd"] {
        store.lock().await.update(partial(json!({"name": name})));
        sleep(Duration::from_millis(700)).await;
        assert_eq!(storage.get(KEY).unwrap(), None);
    }

    sleep(Duration::from_millis(500)).await;
    let saved: serde_json::Value =
        serde_json::from_str(&storage.get(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved["name"], json!("abcd"));
}

#[tokio::test(start_paused = true)]
async fn dropping_store_discards_pending_save_and_stops_driver() {
    let storage = Arc::new(MemoryStore::new());
    let store = shared_store(&storage);
    let driver = AutoSaveDriver::spawn(&store, DEFAULT_POLL_INTERVAL);

    store.lock().await.update(partial(json!({"name": "Unsaved"})));
    drop(store);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(storage.get(KEY).unwrap(), None);
    assert!(driver.is_finished());
}

#[tokio::test]
async fn flush_shared_writes_immediately() {
    let storage = Arc::new(MemoryStore::new());
    let store = shared_store(&storage);

    store.lock().await.update(partial(json!({"name": "Now"})));
    flush_shared(&store).await.unwrap();

    assert!(storage.get(KEY).unwrap().is_some());
    assert!(!store.lock().await.has_pending_save());
}
