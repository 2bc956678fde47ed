//! Plugin registry lookup and conflict errors

use super::CorralError;

/// Creates a source conflict error
pub fn source_conflict(repository: impl Into<String>) -> CorralError {
    CorralError::SourceConflict {
        repository: repository.into(),
    }
}

/// Creates an ambiguous plugin name error
pub fn ambiguous_name(name: impl Into<String>) -> CorralError {
    CorralError::AmbiguousPluginName { name: name.into() }
}

/// Creates a command conflict error
pub fn command_conflict(name: impl Into<String>, command: impl Into<String>) -> CorralError {
    CorralError::CommandConflict {
        name: name.into(),
        command: command.into(),
    }
}

/// Creates a plugin not found error
pub fn not_found(specifier: impl Into<String>) -> CorralError {
    CorralError::PluginNotFound {
        specifier: specifier.into(),
    }
}

/// Creates a plugin execution failed error
pub fn execution_failed(name: impl Into<String>, reason: impl Into<String>) -> CorralError {
    CorralError::PluginExecutionFailed {
        name: name.into(),
        reason: reason.into(),
    }
}
