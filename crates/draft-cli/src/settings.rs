//! User settings for the `drafts` CLI.
//!
//! Stored as TOML in the platform config directory, or at `--config`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use draft_persistence::AutoSaveConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "DraftStudio";
const APPLICATION: &str = "drafts";

/// CLI settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where drafts are kept.
    pub storage: StorageSettings,

    /// Auto-save behavior of opened drafts.
    pub autosave: AutoSaveConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Draft directory. Uses the platform data directory when unset.
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`, or the default path.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::config_path()),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(error) => {
                warn!(path = %path.display(), %error, "Ignoring invalid settings file");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    /// Default settings file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Draft directory: `override_dir`, then the settings, then the platform default.
    pub fn storage_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.storage.dir {
            return dir.clone();
        }
        directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.data_dir().join("drafts"))
            .unwrap_or_else(|| PathBuf::from("drafts"))
    }
}
