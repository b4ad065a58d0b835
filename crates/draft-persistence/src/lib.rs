//! Auto-saving draft state for multi-step configuration forms.
//!
//! This crate keeps a form's draft in memory, makes sure it always carries
//! every field of the form's default shape, and writes it to durable storage
//! after a quiet period.
//!
//! # Features
//!
//! - **Default-shape merging** so old drafts pick up newly added fields
//! - **Debounced auto-save** with a single cancel-and-reschedule timer
//! - **Atomic writes** for the file-backed store
//! - **Local recovery** of unreadable drafts (fallback to defaults, logged)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use draft_persistence::{DraftOptions, DraftStore, FileStore};
//!
//! let storage = Arc::new(FileStore::new("/path/to/drafts"));
//! let mut store = DraftStore::open(DraftOptions::new("checkout-new"), checkout_shape, storage);
//!
//! store.set("styles.primaryColor", "#3b82f6")?;
//!
//! // Call from the event loop; writes once updates have settled.
//! store.tick();
//! ```
//!
//! # Architecture
//!
//! The crate is organized into:
//!
//! - `kv/` - Durable key-value stores (trait, memory, files)
//! - `autosave/` - Auto-save infrastructure (timer, clock, config, driver)
//! - `store.rs` - The draft store
//! - `shape.rs` / `notify.rs` - Injected collaborators
//! - `error.rs` - Error types with user-friendly messages

mod autosave;
mod error;
mod kv;
mod notify;
mod shape;
mod store;

// Re-export main types
pub use autosave::{
    AutoSaveConfig, AutoSaveDriver, Clock, DEFAULT_POLL_INTERVAL, ManualClock, PersistTimer,
    SharedDraftStore, SystemClock, TokioClock, flush_shared,
};
pub use error::{PersistenceError, Result};
pub use kv::{FileStore, KeyValueStore, MAX_KEY_BYTES, MemoryStore, StoredEntry};
pub use notify::{LogNotifier, Notifier, SaveNotice};
pub use shape::{EmptyShape, ShapeFactory};
pub use store::{DraftOptions, DraftStore};
