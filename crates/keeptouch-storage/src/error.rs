//! Storage error types.
//!
//! Every variant names the slot or path involved so a log line is enough to
//! diagnose the problem.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to open the storage backend at the given path.
    #[error("failed to open storage at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// Failed to read a value from storage.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to storage.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to delete a key from storage.
    #[error("failed to delete key '{key}': {reason}")]
    Delete { key: String, reason: String },

    /// The write would push the backend past its byte budget.
    #[error("quota exceeded writing key '{key}': {required} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
    },

    /// The slot table could not be opened or created.
    #[error("missing table '{name}'")]
    MissingTable { name: String },

    /// Failed to begin or commit a transaction.
    #[error("transaction failed: {reason}")]
    Transaction { reason: String },
}
