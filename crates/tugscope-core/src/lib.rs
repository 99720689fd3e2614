//! Core store for tugscope.
//!
//! This crate provides the project model a test generator works against:
//! - Entity model for modules, classes, functions, methods and generated tests
//! - Project registry keyed by subpath, with locator derivation
//! - Code trees associating parsed modules and entity fragments
//! - Owner and code resolution for any entity
//! - Test-case adder for attaching generated code
//! - Parser collaborator trait
//! - Error types and layered configuration

pub mod adder;
pub mod code_tree;
pub mod config;
pub mod entity;
pub mod error;
pub mod parser;
pub mod project;
pub mod traversal;

pub use code_tree::CodeTree;
pub use entity::{EntityRef, ModuleId, ModuleObject};
pub use error::{StoreError, StoreResult};
pub use project::Project;
