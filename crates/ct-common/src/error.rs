//! Error types for conftree.
//!
//! Every failure the engine can raise is one variant here, with the
//! context that produced it carried as fields rather than baked into a
//! message string. Codes are stable and grouped by category:
//! - 10-19: value errors
//! - 20-29: declaration errors
//! - 30-39: document errors
//! - 40-49: session errors
//! - 60-69: I/O errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for conftree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A value failed type, emptiness, or choice validation.
    Value,
    /// Schema-construction-time contradictions.
    Declaration,
    /// Structural problems in a value document.
    Document,
    /// Editing-session failures.
    Session,
    /// File I/O and JSON parsing errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Value => write!(f, "value"),
            ErrorCategory::Declaration => write!(f, "declaration"),
            ErrorCategory::Document => write!(f, "document"),
            ErrorCategory::Session => write!(f, "session"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for conftree.
#[derive(Error, Debug)]
pub enum Error {
    // Value errors (10-19)
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    // Declaration errors (20-29)
    #[error("incompatible declaration for {id}: {message}")]
    IncompatibleDeclaration { id: String, message: String },

    #[error("duplicate id: {id} already used in {group}")]
    DuplicateId { id: String, group: String },

    // Document errors (30-39)
    #[error("unknown key {key} in document for group {group}")]
    UnknownKey { key: String, group: String },

    #[error("document has no entry for {id}")]
    MissingKey { id: String },

    // Session errors (40-49)
    #[error("group {id} has no children to edit")]
    EmptyGroup { id: String },

    #[error("editing session interrupted")]
    Interrupted,

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidValue { .. } => 10,
            Error::IncompatibleDeclaration { .. } => 20,
            Error::DuplicateId { .. } => 21,
            Error::UnknownKey { .. } => 30,
            Error::MissingKey { .. } => 31,
            Error::EmptyGroup { .. } => 40,
            Error::Interrupted => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidValue { .. } => ErrorCategory::Value,
            Error::IncompatibleDeclaration { .. } | Error::DuplicateId { .. } => {
                ErrorCategory::Declaration
            }
            Error::UnknownKey { .. } | Error::MissingKey { .. } => ErrorCategory::Document,
            Error::EmptyGroup { .. } | Error::Interrupted => ErrorCategory::Session,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }
}
