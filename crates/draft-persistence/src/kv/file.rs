//! Directory-backed key-value store.
//!
//! Each key is stored as `<hex(key)>.json` inside the base directory, so any
//! key string maps to a safe file name and can be recovered from it. Hex
//! doubles the length, so keys are limited to [`MAX_KEY_BYTES`] to stay under
//! the usual 255-byte file name limit.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{KeyValueStore, validate_key};
use crate::error::{PersistenceError, Result};

const EXTENSION: &str = "json";

/// Longest key, in bytes, a [`FileStore`] accepts.
pub const MAX_KEY_BYTES: usize = 120;

/// Key-value store that keeps one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

/// Metadata about a stored draft file.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub key: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl FileStore {
    /// Create a store rooted at `base_dir`.
    ///
    /// The directory is created on the first write, not here.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{EXTENSION}", hex::encode(key.as_bytes())))
    }

    /// List stored drafts with file metadata, sorted by key.
    pub fn entries(&self) -> Result<Vec<StoredEntry>> {
        let read_dir = match fs::read_dir(&self.base_dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PersistenceError::Io {
                    operation: "list",
                    path: self.base_dir.clone(),
                    source: e,
                });
            }
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| PersistenceError::Io {
                operation: "list",
                path: self.base_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            let Some(key) = key_from_path(&path) else {
                continue;
            };
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            entries.push(StoredEntry {
                key,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                path,
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

fn check_key(key: &str) -> Result<()> {
    validate_key(key)?;
    if key.len() > MAX_KEY_BYTES {
        return Err(PersistenceError::InvalidKey {
            key: key.to_string(),
            reason: "key is longer than 120 bytes",
        });
    }
    Ok(())
}

fn key_from_path(path: &Path) -> Option<String> {
    if path.extension()? != EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Io {
                operation: "read",
                path,
                source: e,
            }),
        }
    }

    /// Uses atomic write (temp file + rename) so a crash never leaves a
    /// half-written draft behind.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        fs::create_dir_all(&self.base_dir).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: self.base_dir.clone(),
            source: e,
        })?;

        let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(value.as_bytes())
            .map_err(|e| PersistenceError::Io {
                operation: "write",
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| PersistenceError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &path).map_err(|e| PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.clone(),
            source: e,
        })?;

        tracing::trace!("Wrote draft file {}", path.display());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        check_key(key)?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::Io {
                operation: "delete",
                path,
                source: e,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|entry| entry.key).collect())
    }
}
