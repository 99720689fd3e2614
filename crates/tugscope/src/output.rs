//! JSON output types for CLI responses.
//!
//! Every response carries `status` and `schema_version`. Successful commands
//! print one response object; failures print an [`ErrorResponse`].

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tugscope_core::entity::EntityRef;
use tugscope_core::parser::ParseError;

use crate::error::{CliError, OutputErrorCode};

/// Current schema version of all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Snapshot
// ============================================================================

/// Response for the snapshot command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Modules sorted by subpath.
    pub modules: Vec<ModuleReport>,
}

impl SnapshotResponse {
    /// Create a new snapshot response.
    pub fn new(modules: Vec<ModuleReport>) -> Self {
        SnapshotResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            modules,
        }
    }
}

/// One module in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleReport {
    pub subpath: String,
    pub locator: String,
    pub has_code_tree: bool,
    /// Subpath of the enclosing package module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    pub objects: Vec<ObjectReport>,
    /// Names of the test classes, in insertion order.
    pub test_cases: Vec<String>,
    pub changed: bool,
}

/// A module object or one of its members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectReport {
    pub id: EntityRef,
    pub name: String,
    /// True if a fragment is recorded for this entity.
    pub has_code: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ObjectReport>,
}

// ============================================================================
// Locate and Code
// ============================================================================

/// Response for the locate command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Canonical subpath.
    pub subpath: String,
    /// Dotted locator.
    pub locator: String,
}

impl LocateResponse {
    /// Create a new locate response.
    pub fn new(subpath: impl Into<String>, locator: impl Into<String>) -> Self {
        LocateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            subpath: subpath.into(),
            locator: locator.into(),
        }
    }
}

/// Response for the code command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Subpath of the containing module.
    pub module: String,
    /// The entity whose code was resolved.
    pub entity: EntityRef,
    /// The recorded code.
    pub code: String,
}

impl CodeResponse {
    /// Create a new code response.
    pub fn new(module: impl Into<String>, entity: EntityRef, code: impl Into<String>) -> Self {
        CodeResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            module: module.into(),
            entity,
            code: code.into(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error information in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the exit status).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Create from a CliError.
    pub fn from_error(err: &CliError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a CliError.
    pub fn from_error(err: &CliError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
