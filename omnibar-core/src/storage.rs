//! Named-record storage behind the pipeline.
//!
//! The pipeline reads persisted customization once at startup and writes
//! incrementally (last-used command text, usage counters). Records are
//! independent named JSON values; last-write-wins per record is the only
//! guarantee callers may rely on.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Record holding the general settings and per-plugin command overrides.
pub const CONFIG_RECORD: &str = "config";
/// Record holding the raw text of the last keyword command used.
pub const LAST_CMD_RECORD: &str = "last_cmd";

/// Async get/set of named JSON records.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;
}

/// Read a typed record. `Ok(None)` when the record does not exist.
pub async fn get_record<T: DeserializeOwned>(
    store: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Write a typed record, replacing any previous value.
pub async fn set_record<T: Serialize>(
    store: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let value = serde_json::to_value(value).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value).await
}

/// In-memory store for tests and ephemeral embedders.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.records.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// One JSON file per record under a data directory.
///
/// Writes go to a `.tmp` sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated record behind.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory for the default store location.
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "omnibar", "omnibar")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    fn record_path(&self, key: &str) -> PathBuf {
        // Record names are flat identifiers; keep them filesystem-safe.
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    fn io_err(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

#[async_trait]
impl Storage for FileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let path = self.record_path(key);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Self::io_err(key, err)),
        };
        let value = serde_json::from_str(&data).map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| Self::io_err(key, err))?;

        let path = self.record_path(key);
        let tmp = path.with_extension("tmp");
        let data = serde_json::to_string_pretty(&value).map_err(|source| {
            StorageError::Corrupt {
                key: key.to_string(),
                source,
            }
        })?;

        tokio::fs::write(&tmp, data)
            .await
            .map_err(|err| Self::io_err(key, err))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|err| Self::io_err(key, err))?;
        Ok(())
    }
}
