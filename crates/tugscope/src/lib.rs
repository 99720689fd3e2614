//! Tugscope - project model inspector for generated-test pipelines.
//!
//! This crate provides the CLI binary for tugscope.
//!
//! ## Modules
//!
//! - `cli` - CLI command implementations
//! - `error` - CLI error type and exit codes
//! - `manifest` - JSON project manifests
//! - `output` - JSON response types

pub mod cli;
pub mod error;
pub mod manifest;
pub mod output;

// Re-export core types for convenience
pub use error::{CliError, CliResult, OutputErrorCode};
pub use output::{emit_response, ErrorResponse, SCHEMA_VERSION};
pub use tugscope_core::{CodeTree, EntityRef, Project, StoreError};
