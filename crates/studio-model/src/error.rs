use std::io;
use thiserror::Error;

/// Error types for building and loading studio models
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON model description
    #[cfg(feature = "serde-support")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A bone references a parent that does not precede it
    #[error("Bone {bone} has invalid parent {parent}")]
    InvalidParent { bone: usize, parent: usize },

    /// Two entries of the same table share a name
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    /// A table entry references an index outside another table
    #[error("{kind} index {index} out of range (count {count})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    /// Animation data is inconsistent with its frame count
    #[error("Invalid animation: {0}")]
    InvalidAnimation(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type for studio model operations
pub type Result<T> = std::result::Result<T, ModelError>;
