//! Manifest loading and encoding errors

use super::UnpackError;

/// Creates a manifest decode error for document `index` (zero-based) of `path`
pub fn decode_failed(
    path: impl Into<String>,
    index: usize,
    reason: impl Into<String>,
) -> UnpackError {
    UnpackError::ManifestDecode {
        path: path.into(),
        index,
        reason: reason.into(),
    }
}

/// Creates a manifest read error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> UnpackError {
    UnpackError::ManifestRead {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an encode error for a manifest object
pub fn encode_failed(
    kind: impl Into<String>,
    name: impl Into<String>,
    reason: impl Into<String>,
) -> UnpackError {
    UnpackError::Encode {
        kind: kind.into(),
        name: name.into(),
        reason: reason.into(),
    }
}
