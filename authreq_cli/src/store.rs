//! JSON-file key-value store used to persist the session between runs.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use authreq_api::KeyValueStore;

/// Key-value store persisted as a flat JSON object.
///
/// Every operation re-reads the file, so separate invocations see each
/// other's writes. `try_set` and `try_remove` report I/O failures; the
/// [`KeyValueStore`] impl logs them instead.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets `key` and reports any failure to persist it.
    pub fn try_set(&self, key: &str, value: &str) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    /// Removes `key` if present and reports any failure to persist that.
    pub fn try_remove(&self, key: &str) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    /// A missing file is an empty store. A corrupt one is logged and read as
    /// empty so the next write replaces it.
    fn load(&self) -> io::Result<BTreeMap<String, String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e),
        };
        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
            BTreeMap::new()
        }))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        std::fs::write(&self.path, json)
    }
}

/// Used by the client, which cannot act on storage errors: they are logged.
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!("Failed to read session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value) {
            tracing::warn!("Failed to write session file {}: {}", self.path.display(), e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            tracing::warn!("Failed to write session file {}: {}", self.path.display(), e);
        }
    }
}
