//! Auto-save functionality for drafts.
//!
//! Provides:
//! - `PersistTimer` - Single-slot debounce timer with cancel-and-reschedule
//! - `AutoSaveConfig` - User settings for auto-save behavior
//! - `Clock` - Time source, swappable in tests
//! - `AutoSaveDriver` - Tokio task that ticks a shared store

mod clock;
mod config;
mod driver;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::AutoSaveConfig;
pub use driver::{AutoSaveDriver, DEFAULT_POLL_INTERVAL, SharedDraftStore, flush_shared};
pub use timer::PersistTimer;
