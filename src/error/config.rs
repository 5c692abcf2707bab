//! Configuration errors

use super::UnpackError;

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> UnpackError {
    UnpackError::ConfigInvalid {
        message: message.into(),
    }
}
