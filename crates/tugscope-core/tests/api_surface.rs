//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -p tugscope-core -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// entity module - tables, IDs and path helpers
use tugscope_core::entity::{
    canonical_subpath, locator_for, Class, ClassId, EntityKind, EntityRef, Function, FunctionId,
    Method, MethodId, Module, ModuleId, ModuleObject, TestClass, TestClassId, TestMethod,
    TestMethodId, CANONICAL_SEPARATOR,
};

// project module - registry
use tugscope_core::project::{locator_in, Project, PACKAGE_INIT};

// code_tree module - module trees and fragments
use tugscope_core::code_tree::CodeTree;

// traversal and adder - free-function forms
use tugscope_core::adder::{add_test_case, add_test_method};
use tugscope_core::traversal::{code_of, module_of};

// error module
use tugscope_core::error::{StoreError, StoreResult};

// parser module - collaborator seam
use tugscope_core::parser::{ParseError, SourceParser};

// config module - layered configuration
use tugscope_core::config::{
    ConfigOverrides, ConfigSource, ConfigValue, ProjectConfig, ResolvedConfig, ENV_PATH_SEPARATOR,
    ENV_ROOT,
};

// crate-root re-exports
use tugscope_core::{
    CodeTree as RootCodeTree, EntityRef as RootEntityRef, ModuleId as RootModuleId,
    ModuleObject as RootModuleObject, Project as RootProject, StoreError as RootStoreError,
    StoreResult as RootStoreResult,
};

#[test]
fn api_surface_compiles() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Project<String>>();
    assert_send_sync::<CodeTree<String>>();
    assert_send_sync::<StoreError>();
}
