//! Error types for the tugscope CLI.
//!
//! [`CliError`] wraps store, I/O and JSON failures. Every error maps to an
//! [`OutputErrorCode`], which is both the `code` in the JSON error response
//! and the process exit status.

use std::fmt;
use std::io;

use thiserror::Error;
use tugscope_core::error::StoreError;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable error codes for JSON output and exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed manifest).
    InvalidArguments = 2,
    /// Resolution errors (module, entity, tree or fragment not found).
    ResolutionError = 3,
    /// Internal errors (bugs, unexpected I/O failures).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// CLI Error
// ============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A dotted object name did not resolve inside a module.
    #[error("object not found: {name} in {module}")]
    ObjectNotFound { module: String, name: String },

    /// Store lookup or mutation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading the manifest or writing output failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The manifest is not valid JSON for the expected shape.
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CliError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an object not found error.
    pub fn object_not_found(module: impl Into<String>, name: impl Into<String>) -> Self {
        CliError::ObjectNotFound {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl From<&CliError> for OutputErrorCode {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            CliError::ObjectNotFound { .. } => OutputErrorCode::ResolutionError,
            CliError::Store(store) => match store {
                StoreError::CodeTreeNotFound { .. }
                | StoreError::FragmentNotFound { .. }
                | StoreError::EntityNotFound { .. }
                | StoreError::ModuleNotFound { .. } => OutputErrorCode::ResolutionError,
                StoreError::ModuleHasErrors { .. } | StoreError::ForeignObject { .. } => {
                    OutputErrorCode::InvalidArguments
                }
            },
            CliError::Io(io) if io.kind() == io::ErrorKind::NotFound => {
                OutputErrorCode::ResolutionError
            }
            CliError::Io(_) => OutputErrorCode::InternalError,
            CliError::Json(_) => OutputErrorCode::InvalidArguments,
        }
    }
}
