//! Object store errors
//!
//! [`StoreError`] is what an [`ObjectStore`](crate::store::ObjectStore)
//! implementation returns. Callers wrap it with the operation and key that
//! failed before handing it to the top level.

use thiserror::Error;

use super::UnpackError;

/// Errors returned by an object store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} '{key}' not found")]
    NotFound { kind: String, key: String },

    #[error("{kind} '{key}' already exists")]
    AlreadyExists { kind: String, key: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("failed to decode stored object '{path}': {reason}")]
    Decode { path: String, reason: String },

    #[error("store I/O failed at '{path}': {reason}")]
    Io { path: String, reason: String },
}

impl StoreError {
    /// Whether this is the distinguishable not-found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Creates a store not found error
pub fn not_found(kind: impl Into<String>, key: impl ToString) -> StoreError {
    StoreError::NotFound {
        kind: kind.into(),
        key: key.to_string(),
    }
}

/// Creates a store already exists error
pub fn already_exists(kind: impl Into<String>, key: impl ToString) -> StoreError {
    StoreError::AlreadyExists {
        kind: kind.into(),
        key: key.to_string(),
    }
}

/// Creates a store I/O error
pub fn io_failed(path: impl Into<String>, reason: impl ToString) -> StoreError {
    StoreError::Io {
        path: path.into(),
        reason: reason.to_string(),
    }
}

/// Creates a stored-object decode error
pub fn decode_failed(path: impl Into<String>, reason: impl ToString) -> StoreError {
    StoreError::Decode {
        path: path.into(),
        reason: reason.to_string(),
    }
}

/// Wraps a store error with the operation and key that produced it
pub fn operation_failed(
    operation: impl Into<String>,
    key: impl ToString,
    source: StoreError,
) -> UnpackError {
    UnpackError::Store {
        operation: operation.into(),
        key: key.to_string(),
        source,
    }
}
