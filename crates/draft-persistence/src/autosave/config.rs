//! Auto-save configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether auto-save is enabled.
    ///
    /// When disabled, updates never schedule a write; explicit flushes
    /// still persist.
    pub enabled: bool,

    /// Debounce delay in milliseconds.
    ///
    /// After a change, the store waits this long before saving.
    /// Additional changes reset the timer.
    pub debounce_ms: u64,

    /// Whether to send a notice after each successful auto-save.
    pub notify: bool,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1000,
            notify: false,
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    #[must_use]
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Debounce delay as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutoSaveConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce(), Duration::from_secs(1));
        assert!(!config.notify);
    }

    #[test]
    fn test_disabled_keeps_debounce() {
        let config = AutoSaveConfig::disabled().with_debounce_ms(800);
        assert!(!config.enabled);
        assert_eq!(config.debounce_ms, 800);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AutoSaveConfig = serde_json::from_str(r#"{"notify": true}"#).unwrap();
        assert!(config.enabled);
        assert!(config.notify);
        assert_eq!(config.debounce_ms, 1000);
    }
}
