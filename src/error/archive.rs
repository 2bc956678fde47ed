//! Archive extraction errors

use super::CorralError;

/// Creates an illegal path error
pub fn illegal_path(path: impl Into<String>) -> CorralError {
    CorralError::IllegalPath { path: path.into() }
}

/// Creates an unsupported entry type error
pub fn unsupported_entry(path: impl Into<String>, kind: impl Into<String>) -> CorralError {
    CorralError::UnsupportedEntryType {
        path: path.into(),
        kind: kind.into(),
    }
}

/// Creates an unsupported archive format error
pub fn unsupported_format(reason: impl Into<String>) -> CorralError {
    CorralError::UnsupportedArchive {
        reason: reason.into(),
    }
}

/// Creates an entry too large error
pub fn entry_too_large(path: impl Into<String>, limit: u64) -> CorralError {
    CorralError::ArchiveEntryTooLarge {
        path: path.into(),
        limit,
    }
}

/// Creates a read failed error
pub fn read_failed(reason: impl Into<String>) -> CorralError {
    CorralError::ArchiveReadFailed {
        reason: reason.into(),
    }
}
