//! Bundle, pod and desired-state errors

use super::UnpackError;

/// Creates a bundle not found error
pub fn not_found(namespace: impl Into<String>, name: impl Into<String>) -> UnpackError {
    UnpackError::BundleNotFound {
        namespace: namespace.into(),
        name: name.into(),
    }
}

/// Creates a pod not found error
pub fn pod_not_found(namespace: impl Into<String>, name: impl Into<String>) -> UnpackError {
    UnpackError::PodNotFound {
        namespace: namespace.into(),
        name: name.into(),
    }
}

/// Creates a digest unresolved error
pub fn digest_unresolved(image: impl Into<String>, pod: impl Into<String>) -> UnpackError {
    UnpackError::DigestUnresolved {
        image: image.into(),
        pod: pod.into(),
    }
}
