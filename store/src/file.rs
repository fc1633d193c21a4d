//! File-backed store: one JSON document, write-through on every mutation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{error, warn};

use crate::error::StoreResult;
use crate::PersistentStore;

/// Durable store holding all keys in a single JSON object on disk.
///
/// The document is loaded once at open; every mutation rewrites it through a
/// temp file + rename so a crash mid-write leaves the previous snapshot
/// intact. A missing or corrupt document opens as an empty store.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at the given path, hydrating any existing document.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Store unreadable, starting empty");
                HashMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> StoreResult<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn flush(&self, entries: &HashMap<String, String>) -> StoreResult<()> {
        let raw = serde_json::to_string(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate(&self, apply: impl FnOnce(&mut HashMap<String, String>)) {
        let mut entries = self.entries.lock();
        apply(&mut entries);
        if let Err(err) = self.flush(&entries) {
            error!(path = %self.path.display(), error = %err, "Failed to persist store");
        }
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        self.mutate(|entries| {
            entries.remove(key);
        });
    }
}
