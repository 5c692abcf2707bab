//! Error types and handling for kuberpak-unpack
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`manifest`]: Manifest loading and encoding errors
//! - [`bundle`]: Bundle, pod and desired-state errors
//! - [`store`]: Object store errors and their context wrappers
//! - [`config`]: Configuration errors

pub mod bundle;
pub mod config;
pub mod manifest;
pub mod store;


pub use store::StoreError;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for unpack operations
#[derive(Error, Diagnostic, Debug)]
pub enum UnpackError {
    // Manifest errors
    #[error("Failed to decode manifest document {index} in '{path}': {reason}")]
    #[diagnostic(
        code(kuberpak::manifest::decode_failed),
        help("Every document must be a YAML or JSON mapping with a non-empty 'kind'")
    )]
    ManifestDecode {
        path: String,
        index: usize,
        reason: String,
    },

    #[error("Failed to read manifest '{path}': {reason}")]
    #[diagnostic(code(kuberpak::manifest::read_failed))]
    ManifestRead { path: String, reason: String },

    #[error("Failed to encode {kind} '{name}': {reason}")]
    #[diagnostic(code(kuberpak::manifest::encode_failed))]
    Encode {
        kind: String,
        name: String,
        reason: String,
    },

    // Bundle errors
    #[error("Bundle '{namespace}/{name}' not found")]
    #[diagnostic(
        code(kuberpak::bundle::not_found),
        help("Check that the bundle name and namespace are correct")
    )]
    BundleNotFound { namespace: String, name: String },

    #[error("Pod '{namespace}/{name}' not found")]
    #[diagnostic(code(kuberpak::bundle::pod_not_found))]
    PodNotFound { namespace: String, name: String },

    #[error("Image digest for image '{image}' not found in pod '{pod}'")]
    #[diagnostic(
        code(kuberpak::bundle::digest_unresolved),
        help("The pod has not reported an image ID for this image yet; re-run the unpack later")
    )]
    DigestUnresolved { image: String, pod: String },

    #[error(
        "Chunk name '{name}' collides: objects with hashes {first_sha256} and {second_sha256} share a prefix"
    )]
    #[diagnostic(
        code(kuberpak::bundle::name_collision),
        help("Two distinct manifest objects map to the same chunk name; rename or change one of them")
    )]
    NameCollision {
        name: String,
        first_sha256: String,
        second_sha256: String,
    },

    #[error("Duplicate manifest object {kind} '{object_name}' (chunk '{name}')")]
    #[diagnostic(
        code(kuberpak::bundle::duplicate_object),
        help("Remove the repeated document from the bundle manifests")
    )]
    DuplicateObject {
        name: String,
        kind: String,
        object_name: String,
    },

    // Store errors
    #[error("Failed to {operation} {key}: {source}")]
    #[diagnostic(code(kuberpak::store::operation_failed))]
    Store {
        operation: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Reconcile aborted after {applied} operation(s): failed to {operation} {key}: {source}")]
    #[diagnostic(
        code(kuberpak::store::reconcile_failed),
        help("Operations already applied remain; re-run the unpack to converge")
    )]
    Reconcile {
        operation: String,
        key: String,
        applied: usize,
        #[source]
        source: StoreError,
    },

    #[error("Reconcile cancelled after {applied} operation(s)")]
    #[diagnostic(code(kuberpak::store::cancelled))]
    Cancelled { applied: usize },

    #[error("{count} chunk(s) failed payload verification")]
    #[diagnostic(code(kuberpak::store::verify_failed))]
    VerifyFailed { count: usize },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(kuberpak::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(kuberpak::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for UnpackError {
    fn from(err: std::io::Error) -> Self {
        UnpackError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for UnpackError {
    fn from(err: serde_json::Error) -> Self {
        UnpackError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, UnpackError>;
