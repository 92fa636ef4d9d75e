//! Key-value configuration stores.

use crate::error::PublishError;
use crate::pipeline::ConfigStore;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration persisted as a flat JSON object on disk.
///
/// The file is re-read on every `get`, so edits made by another process
/// (or `rating2post config set`) apply to the next publish.
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored entry, in file order. A missing file is an empty store.
    pub async fn entries(&self) -> Result<IndexMap<String, String>, PublishError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(e) => {
                return Err(PublishError::storage(
                    &format!("reading {}", self.path.display()),
                    e,
                ))
            }
        };

        if text.trim().is_empty() {
            return Ok(IndexMap::new());
        }

        serde_json::from_str(&text)
            .map_err(|e| PublishError::storage(&format!("parsing {}", self.path.display()), e))
    }

    async fn write_entries(&self, entries: &IndexMap<String, String>) -> Result<(), PublishError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PublishError::storage(&format!("creating {}", parent.display()), e))?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| PublishError::storage("serializing configuration", e))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PublishError::storage(&format!("writing {}", self.path.display()), e))
    }
}

#[async_trait::async_trait]
impl ConfigStore for JsonFileConfigStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, PublishError> {
        let entries = self.entries().await?;
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PublishError> {
        let mut entries = self.entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await?;
        log::info!("Stored configuration key {}", key);
        Ok(())
    }
}

/// Process-local configuration, shared behind a lock.
#[derive(Default)]
pub struct MemoryConfigStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, PublishError> {
        let entries = self.entries.read();
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PublishError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
