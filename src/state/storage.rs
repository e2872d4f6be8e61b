//! Durable key-value storage
//!
//! The settings store only needs a namespaced string map with `get`, `set`,
//! `remove` and `keys`. Two backends are provided: an in-memory map and a
//! JSON file that is rewritten atomically on every mutation. Both can enforce
//! a byte quota counted the way browser storage counts it (key plus value).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{FlameError, Result};

/// Namespaced string key-value storage
pub trait KeyValueStorage {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any existing one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>>;
}

/// Bytes used by a map of entries
fn usage_bytes(entries: &BTreeMap<String, String>) -> u64 {
    entries
        .iter()
        .map(|(k, v)| (k.len() + v.len()) as u64)
        .sum()
}

/// Bytes the map would use after replacing `key` with `value`
fn usage_after_set(entries: &BTreeMap<String, String>, key: &str, value: &str) -> u64 {
    let current = usage_bytes(entries);
    let replaced = entries
        .get(key)
        .map(|old| (key.len() + old.len()) as u64)
        .unwrap_or(0);
    current - replaced + (key.len() + value.len()) as u64
}

fn check_quota(
    entries: &BTreeMap<String, String>,
    quota: Option<u64>,
    key: &str,
    value: &str,
) -> Result<()> {
    if let Some(limit) = quota {
        let needed = usage_after_set(entries, key, value);
        if needed > limit {
            return Err(FlameError::StorageQuotaExceeded {
                needed_bytes: needed,
                limit_bytes: limit,
            });
        }
    }
    Ok(())
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<u64>,
}

impl MemoryStorage {
    /// Create an empty, unlimited storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage with a byte quota
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used
    pub fn usage_bytes(&self) -> u64 {
        usage_bytes(&self.entries)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        check_quota(&self.entries, self.quota_bytes, key, value)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Read a storage file; a missing or empty file holds no entries.
fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path).map_err(|e| FlameError::StorageUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&content).map_err(|e| FlameError::StorageUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Storage backed by a single JSON object file.
///
/// Reads are served from the entries seen at open or at the last mutation.
/// Every mutation re-reads the file first, so handles sharing a file keep
/// each other's writes. The file is then rewritten through a temporary file
/// and a rename, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    quota_bytes: Option<u64>,
}

impl FileStorage {
    /// Open the storage file, starting empty if it does not exist yet.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the file exists but cannot be read or
    /// is not a JSON object of strings.
    pub fn open(path: &Path, quota_bytes: Option<u64>) -> Result<Self> {
        let entries = read_entries(path)?;

        debug!(
            "Opened settings storage {} ({} entries)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            quota_bytes,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently used
    pub fn usage_bytes(&self) -> u64 {
        usage_bytes(&self.entries)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| FlameError::StorageUnavailable {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");

        fs::write(&tmp_path, content).map_err(|e| FlameError::StorageUnavailable {
            path: tmp_path.clone(),
            reason: e.to_string(),
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| FlameError::StorageUnavailable {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = read_entries(&self.path)?;
        check_quota(&next, self.quota_bytes, key, value)?;

        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut next = read_entries(&self.path)?;
        if next.remove(key).is_some() {
            self.persist(&next)?;
        }
        self.entries = next;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
