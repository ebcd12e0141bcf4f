use thiserror::Error;

use crate::persist::FieldKind;

/// Errors raised while restoring saved or replicated animation state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Snapshot written by an incompatible version
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Field name not present in the field table
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Field value has the wrong kind
    #[error("Field {field} expects {expected:?}")]
    TypeMismatch {
        field: &'static str,
        expected: FieldKind,
    },

    /// Array field has the wrong length
    #[error("Field {field} expects {expected} values, found {found}")]
    ArrayLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// Field value outside its domain
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type for state restore operations
pub type Result<T> = std::result::Result<T, StateError>;
