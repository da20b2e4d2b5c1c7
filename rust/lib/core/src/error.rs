use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Callers match on these —
// never on the human-readable message string.

/// Stable error code constants.
///
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const PARTIAL_WRITE: &str = "PARTIAL_WRITE";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Each variant maps to a stable error code (see [`error_code`]).
/// Module-level error enums convert into this at the service boundary.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Referenced document or resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid.
    #[error("{0}")]
    Validation(String),

    /// Some constituent writes of a fan-out operation failed while others
    /// succeeded. The succeeded writes are not rolled back.
    #[error("{0}")]
    PartialWrite(String),

    /// Storage backend failure.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::PartialWrite(_) => error_code::PARTIAL_WRITE,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }
}
