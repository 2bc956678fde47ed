//! Manifest loading and validation errors

use super::CorralError;

/// Creates a manifest missing error
pub fn missing(path: impl Into<String>) -> CorralError {
    CorralError::ManifestMissing { path: path.into() }
}

/// Creates a manifest unparseable error
pub fn unparseable(path: impl Into<String>, reason: impl Into<String>) -> CorralError {
    CorralError::ManifestUnparseable {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a manifest invalid error carrying every violation
pub fn invalid(path: impl Into<String>, errors: Vec<String>) -> CorralError {
    CorralError::ManifestInvalid {
        path: path.into(),
        errors,
    }
}

/// Creates a binary missing error
pub fn binary_missing(path: impl Into<String>) -> CorralError {
    CorralError::BinaryMissing { path: path.into() }
}
