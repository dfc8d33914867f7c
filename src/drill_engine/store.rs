//! Key-value persistence for the high score and recent-question history.
//!
//! The engine only needs string get/set. Missing or unreadable values fall
//! back to defaults (score 0, empty history).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::drill_engine::error::{DrillError, Result};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Process-local store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object file, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&next)?;
        fs::write(&self.path, text)
            .map_err(|e| DrillError::Store(format!("{}: {e}", self.path.display())))?;
        self.values = next;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Typed slots
// ---------------------------------------------------------------------------

/// Stored high score, 0 when absent or unreadable.
pub fn load_high_score<K: KeyValueStore + ?Sized>(store: &K, key: &str) -> i64 {
    match store.get(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, raw = %raw, "unreadable high score, using 0");
            0
        }),
        Ok(None) => 0,
        Err(err) => {
            warn!(key, %err, "high score lookup failed, using 0");
            0
        }
    }
}

pub fn save_high_score<K: KeyValueStore + ?Sized>(store: &mut K, key: &str, score: i64) -> Result<()> {
    store.set(key, score.to_string())
}

/// Stored recent history (oldest first), empty when absent or unreadable.
pub fn load_recent<K: KeyValueStore + ?Sized>(store: &K, key: &str) -> Vec<String> {
    match store.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(key, %err, "unreadable recent history, starting empty");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!(key, %err, "recent history lookup failed, starting empty");
            Vec::new()
        }
    }
}

pub fn save_recent<K: KeyValueStore + ?Sized>(store: &mut K, key: &str, recent: &[String]) -> Result<()> {
    store.set(key, serde_json::to_string(recent)?)
}
