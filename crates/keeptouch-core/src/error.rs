//! Error types for `keeptouch-core`.
//!
//! None of these are fatal to the process. Flow and persistence errors are
//! logged and degraded by their callers; generation, lead and client errors
//! are turned into fallback text or a user notice.

use keeptouch_storage::StorageError;

/// Errors from constructing a step flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The flow was given no steps at all.
    #[error("a step flow needs at least one step")]
    EmptySteps,

    /// The initial step is not one of the flow's steps.
    #[error("initial step '{step}' is not one of the flow's steps")]
    UnknownInitialStep { step: String },
}

/// Errors from the persisted state store.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The value could not be serialized to JSON.
    #[error("failed to serialize value for slot '{key}': {reason}")]
    Serialize { key: String, reason: String },

    /// The stored bytes are not a valid serialized value.
    #[error("failed to deserialize slot '{key}': {reason}")]
    Deserialize { key: String, reason: String },

    /// The storage backend returned an error.
    #[error("persist storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from a text-generation provider.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// A required credential or URL is not configured.
    #[error("text generation is not configured: {reason}")]
    NotConfigured { reason: String },

    /// The provider could not be reached or answered with an error.
    #[error("text generation provider failed: {reason}")]
    Provider { reason: String },

    /// The provider answered with a body that could not be understood.
    #[error("unexpected provider response: {reason}")]
    InvalidResponse { reason: String },
}

/// Errors from lead, signup and feedback persistence.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    /// A required field was missing or blank. `field` is the label shown
    /// to the user.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The backing repository failed.
    #[error("lead repository error: {reason}")]
    Repository { reason: String },
}

/// Errors from the widget's remote collaborators (plan fetch, lead submit).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("request failed: {reason}")]
    Network { reason: String },

    /// The server answered with a non-success status.
    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {reason}")]
    Decode { reason: String },
}
