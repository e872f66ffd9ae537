//! Storage backend abstraction for `KeepTouch`.
//!
//! This crate defines the [`StorageBackend`] trait, a pure key-value slot
//! store that knows nothing about widgets, steps, or JSON. The persisted
//! store in `keeptouch-core` serializes values before they reach this layer
//! and treats every failure here as non-fatal.
//!
//! Two implementations are provided:
//!
//! - [`RedbBackend`]: durable on-disk slots backed by redb (feature `redb-backend`)
//! - [`MemoryBackend`]: in-memory, optionally quota-limited, for tests and
//!   sessions that must not touch disk

mod error;
mod memory;
#[cfg(feature = "redb-backend")]
mod redb_backend;

pub use error::StorageError;
pub use memory::MemoryBackend;
#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;

/// A pluggable key-value storage backend.
///
/// Keys are short UTF-8 slot names (e.g. `kt_widget_state`). Values are
/// opaque byte arrays, always serialized by the caller.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails, or
    /// [`StorageError::QuotaExceeded`] if the backend enforces a size budget.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Deleting a non-existent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}
