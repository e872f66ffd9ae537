//! In-memory storage backend.
//!
//! Holds every slot in a `BTreeMap` behind a `RwLock`. Nothing survives the
//! process. An optional byte quota makes writes fail the way a full browser
//! storage area does, which is how the persisted store's degradation path is
//! exercised in tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{StorageBackend, StorageError};

/// An in-memory storage backend backed by a `BTreeMap`.
///
/// Clones share the same underlying map.
///
/// # Examples
///
/// ```
/// # use keeptouch_storage::{MemoryBackend, StorageBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let backend = MemoryBackend::new();
/// backend.put("kt_widget_state", b"{}").await.unwrap();
/// let val = backend.get("kt_widget_state").await.unwrap();
/// assert_eq!(val, Some(b"{}".to_vec()));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend with no size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects writes once the summed size of all
    /// stored values would exceed `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            data: Arc::default(),
            quota: Some(limit),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        if let Some(limit) = self.quota {
            let others: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let required = others.saturating_add(value.len());
            if required > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    required,
                    limit,
                });
            }
        }
        data.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let data = self.data.read().await;
        Ok(data.contains_key(key))
    }
}
