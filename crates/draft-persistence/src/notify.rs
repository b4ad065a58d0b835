//! Save notifications.
//!
//! Purely cosmetic: the store calls a [`Notifier`] after a successful
//! auto-save so a UI can flash a confirmation.

use chrono::{DateTime, Utc};

/// Confirmation sent after a draft was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveNotice {
    pub key: String,
    pub title: String,
    pub message: String,
    pub saved_at: DateTime<Utc>,
}

impl SaveNotice {
    pub fn saved(key: &str) -> Self {
        Self {
            key: key.to_string(),
            title: "Auto-saved".to_string(),
            message: "Settings saved successfully".to_string(),
            saved_at: Utc::now(),
        }
    }
}

/// Side channel for save confirmations.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &SaveNotice);
}

impl<F> Notifier for F
where
    F: Fn(&SaveNotice) + Send + Sync,
{
    fn notify(&self, notice: &SaveNotice) {
        self(notice);
    }
}

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &SaveNotice) {
        tracing::info!(key = %notice.key, "{}: {}", notice.title, notice.message);
    }
}
