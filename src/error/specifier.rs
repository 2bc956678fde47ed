//! Plugin specifier errors

use super::CorralError;

/// Creates an invalid specifier error
pub fn invalid(input: impl Into<String>, reason: impl Into<String>) -> CorralError {
    CorralError::InvalidSpecifier {
        input: input.into(),
        reason: reason.into(),
    }
}
