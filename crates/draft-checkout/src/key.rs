//! Storage keys for checkout drafts.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use draft_persistence::{AutoSaveConfig, DraftOptions};
use thiserror::Error;

/// Quiet period before a checkout draft is saved.
pub const CHECKOUT_DEBOUNCE: Duration = Duration::from_millis(800);

const NEW_KEY: &str = "checkout-new";
const EDIT_PREFIX: &str = "checkout-edit-";

/// Which checkout a draft belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DraftKey {
    /// A checkout that has not been created yet.
    New,
    /// Edits to an existing checkout, by id.
    Edit(String),
}

impl DraftKey {
    /// Key for the edit draft of checkout `id`. The id must not be empty.
    pub fn edit(id: impl Into<String>) -> Result<Self, DraftKeyError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DraftKeyError::EmptyId);
        }
        Ok(Self::Edit(id))
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit(_))
    }

    /// Store options for this draft: checkout debounce, no save notices.
    pub fn options(&self) -> DraftOptions {
        DraftOptions::new(self.to_string()).with_autosave(checkout_autosave())
    }
}

/// Auto-save settings used by the checkout builder.
pub fn checkout_autosave() -> AutoSaveConfig {
    AutoSaveConfig::default()
        .with_debounce_ms(CHECKOUT_DEBOUNCE.as_millis() as u64)
        .with_notify(false)
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str(NEW_KEY),
            Self::Edit(id) => write!(f, "{EDIT_PREFIX}{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftKeyError {
    /// Storage key that does not name a checkout draft.
    #[error("`{0}` is not a checkout draft key")]
    Unknown(String),
    #[error("checkout id is empty")]
    EmptyId,
}

impl FromStr for DraftKey {
    type Err = DraftKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NEW_KEY {
            return Ok(Self::New);
        }
        match s.strip_prefix(EDIT_PREFIX) {
            Some(id) if !id.is_empty() => Ok(Self::Edit(id.to_string())),
            _ => Err(DraftKeyError::Unknown(s.to_string())),
        }
    }
}
