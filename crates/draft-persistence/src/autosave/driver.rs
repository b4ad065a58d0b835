//! Background auto-save for stores shared with async code.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{PersistenceError, Result};
use crate::store::DraftStore;

/// A draft store shared between the owner and the auto-save driver.
pub type SharedDraftStore = Arc<Mutex<DraftStore>>;

/// How often the driver checks for a due save.
///
/// Saves land at most this long after the debounce delay has passed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tokio task that calls [`DraftStore::tick`] on a fixed interval.
///
/// The task only holds a weak reference: once the owner drops the last
/// [`SharedDraftStore`] (running its teardown), the task ends without
/// writing. Dropping the driver stops the task as well.
#[derive(Debug)]
pub struct AutoSaveDriver {
    handle: JoinHandle<()>,
}

impl AutoSaveDriver {
    /// Start ticking `store` every `poll_interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: &SharedDraftStore, poll_interval: Duration) -> Self {
        let weak = Arc::downgrade(store);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(store) = weak.upgrade() else {
                    tracing::debug!("Draft store dropped, stopping auto-save");
                    break;
                };
                store.lock().await.tick();
            }
        });
        Self { handle }
    }

    /// Whether the background task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutoSaveDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Flush a shared store on the blocking thread pool.
///
/// Storage writes are synchronous; running them here keeps file I/O off the
/// async runtime.
pub async fn flush_shared(store: &SharedDraftStore) -> Result<()> {
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || store.blocking_lock().flush())
        .await
        .map_err(|source| PersistenceError::TaskFailed { source })?
}
