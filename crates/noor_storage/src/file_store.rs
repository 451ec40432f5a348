#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::kv::{KeyValueStore, StoreError};

const STORE_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    schema_version: u8,
    entries: BTreeMap<String, String>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// Key-value store persisted as one JSON document on local disk.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKvStore {
    /// Resolves `NOOR_STORE_PATH`, falling back to the user config directory.
    pub fn default_local() -> Self {
        let path = env::var("NOOR_STORE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_store_path);
        Self::at_path(path)
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        let doc = serde_json::from_str::<StoreDocument>(&raw)?;
        if doc.schema_version != STORE_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                expected: STORE_SCHEMA_VERSION,
                got: doc.schema_version,
            });
        }
        Ok(doc)
    }

    fn write_document(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_vec_pretty(doc)?;
        atomic_write(&self.path, &serialized)
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let doc = self.read_document()?;
        Ok(doc.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.read_document()?;
        doc.entries.insert(key.to_string(), value.to_string());
        self.write_document(&doc)?;
        tracing::debug!(key, path = %self.path.display(), "store value written");
        Ok(())
    }
}

fn default_store_path() -> PathBuf {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg_config_home).join("noor").join("store.json");
    }
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("noor")
            .join("store.json");
    }
    PathBuf::from(".noor").join("store.json")
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.to_path_buf();
    tmp.set_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(tmp, path)?;
    Ok(())
}
