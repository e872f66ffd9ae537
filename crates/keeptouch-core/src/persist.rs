//! Persisted state store.
//!
//! Mirrors a JSON-serializable value into a single named slot of a
//! [`StorageBackend`]. Storage is best-effort: a missing backend (no durable
//! storage in this execution context) turns every write into a no-op, and
//! read or write failures are logged and swallowed. The in-memory value is
//! always authoritative for the current session; when a write fails the
//! persisted copy is simply stale.

use std::fmt;
use std::sync::Arc;

use keeptouch_storage::StorageBackend;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistError;

/// Reads and writes JSON values in named storage slots.
#[derive(Clone, Default)]
pub struct PersistedStore {
    backend: Option<Arc<dyn StorageBackend>>,
}

impl fmt::Debug for PersistedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedStore")
            .field("available", &self.is_available())
            .finish()
    }
}

impl PersistedStore {
    /// A store writing through to `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A store for contexts without durable storage. Loads return the
    /// default and saves do nothing.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Read and decode the slot.
    ///
    /// Returns `Ok(None)` when the slot was never written or storage is
    /// unavailable.
    ///
    /// # Errors
    ///
    /// - [`PersistError::Storage`] if the backend read fails.
    /// - [`PersistError::Deserialize`] if the stored bytes are not a valid `T`.
    pub async fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };
        let Some(bytes) = backend.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| PersistError::Deserialize {
                key: key.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Read the slot, falling back to `default` when it is absent or
    /// unreadable. Never fails.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted state, using default");
                default
            }
        }
    }

    /// Encode and write the slot. A no-op when storage is unavailable.
    ///
    /// # Errors
    ///
    /// - [`PersistError::Serialize`] if `value` cannot be encoded as JSON.
    /// - [`PersistError::Storage`] if the backend rejects the write.
    pub async fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(value).map_err(|e| PersistError::Serialize {
            key: key.to_owned(),
            reason: e.to_string(),
        })?;
        backend.put(key, &bytes).await?;
        Ok(())
    }

    /// Write the slot, logging and swallowing any failure.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value).await {
            tracing::warn!(key, error = %e, "failed to persist state, keeping in-memory copy only");
        }
    }

    /// Remove the slot, logging and swallowing any failure.
    pub async fn clear(&self, key: &str) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = backend.delete(key).await {
            tracing::warn!(key, error = %e, "failed to clear persisted state");
        }
    }
}

/// A value bound to a storage slot.
///
/// Hydrated once from the slot; every mutation afterwards issues exactly one
/// save under the same key. There is no flush and no batching.
#[derive(Debug)]
pub struct Persisted<T> {
    store: PersistedStore,
    key: String,
    value: T,
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    /// Load the slot, or start from `default` when there is nothing usable.
    pub async fn hydrate(store: PersistedStore, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = store.load(&key, default).await;
        Self { store, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mutate the value in place and persist the result.
    pub async fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.store.save(&self.key, &self.value).await;
    }

    /// Swap in a new value and persist it.
    pub async fn replace(&mut self, value: T) {
        self.value = value;
        self.store.save(&self.key, &self.value).await;
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use keeptouch_storage::{MemoryBackend, StorageError};
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Answers {
        name: String,
        tags: Vec<String>,
    }

    /// Counts writes so tests can check one save per mutation.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        puts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl StorageBackend for CountingBackend {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            self.inner.get(key).await
        }
        async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(key, value).await
        }
        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    fn memory_store() -> (PersistedStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        (PersistedStore::new(Arc::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let (store, _) = memory_store();
        let values = [
            json!(null),
            json!(42),
            json!("plain"),
            json!({"name": "Ada", "completedSteps": ["name", "blocker"], "nested": {"x": [1, 2.5, false]}}),
        ];
        for value in values {
            store.save("slot", &value).await;
            let loaded: Value = store.load("slot", json!("default")).await;
            assert_eq!(loaded, value);
        }
    }

    #[tokio::test]
    async fn load_never_written_returns_default() {
        let (store, _) = memory_store();
        let loaded = store.load("kt_widget_state", Answers::default()).await;
        assert_eq!(loaded, Answers::default());
    }

    #[tokio::test]
    async fn load_corrupted_slot_returns_default() {
        let (store, backend) = memory_store();
        backend.put("slot", b"{not json").await.unwrap();

        let fallback = Answers {
            name: "fallback".to_owned(),
            tags: vec![],
        };
        assert_eq!(store.load("slot", fallback.clone()).await, fallback);
        assert!(matches!(
            store.try_load::<Answers>("slot").await,
            Err(PersistError::Deserialize { .. })
        ));
    }

    #[tokio::test]
    async fn load_wrong_shape_returns_default() {
        let (store, backend) = memory_store();
        backend.put("slot", b"[1,2,3]").await.unwrap();
        assert_eq!(store.load("slot", Answers::default()).await, Answers::default());
    }

    #[tokio::test]
    async fn unavailable_store_is_a_noop() {
        let store = PersistedStore::unavailable();
        assert!(!store.is_available());
        store.try_save("slot", &json!({"a": 1})).await.unwrap();
        assert!(store.try_load::<Value>("slot").await.unwrap().is_none());
        assert_eq!(store.load("slot", 7).await, 7);
    }

    #[tokio::test]
    async fn quota_failure_is_swallowed_and_memory_stays_authoritative() {
        let backend = MemoryBackend::with_quota(16);
        let store = PersistedStore::new(Arc::new(backend.clone()));
        let mut answers = Persisted::hydrate(store.clone(), "slot", Answers::default()).await;

        answers
            .update(|a| a.name = "a name far longer than sixteen bytes".to_owned())
            .await;

        assert_eq!(answers.get().name, "a name far longer than sixteen bytes");
        assert_eq!(backend.get("slot").await.unwrap(), None);
        assert!(matches!(
            store.try_save("slot", answers.get()).await,
            Err(PersistError::Storage(StorageError::QuotaExceeded { .. }))
        ));
    }

    #[tokio::test]
    async fn unserializable_value_is_reported_not_thrown() {
        let (store, backend) = memory_store();
        let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
        bad.insert((1, 2), 3);

        assert!(matches!(
            store.try_save("slot", &bad).await,
            Err(PersistError::Serialize { .. })
        ));
        store.save("slot", &bad).await;
        assert_eq!(backend.get("slot").await.unwrap(), None);
    }

    #[tokio::test]
    async fn each_mutation_writes_exactly_once() {
        let backend = Arc::new(CountingBackend::default());
        let store = PersistedStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>);

        let mut answers = Persisted::hydrate(store, "slot", Answers::default()).await;
        assert_eq!(backend.puts.load(Ordering::SeqCst), 0);

        answers.update(|a| a.name = "Ada".to_owned()).await;
        answers.update(|a| a.tags.push("x".to_owned())).await;
        answers.replace(Answers::default()).await;
        assert_eq!(backend.puts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn hydrate_picks_up_previous_session() {
        let (store, _) = memory_store();
        {
            let mut first = Persisted::hydrate(store.clone(), "slot", Answers::default()).await;
            first.update(|a| a.name = "John Doe".to_owned()).await;
        }
        let second = Persisted::hydrate(store, "slot", Answers::default()).await;
        assert_eq!(second.get().name, "John Doe");
        assert_eq!(second.key(), "slot");
    }

    #[tokio::test]
    async fn clear_removes_slot() {
        let (store, backend) = memory_store();
        store.save("slot", &json!(1)).await;
        store.clear("slot").await;
        assert!(!backend.exists("slot").await.unwrap());
    }
}
