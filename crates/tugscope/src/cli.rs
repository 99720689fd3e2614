//! CLI command implementations.
//!
//! Each function builds its response value and leaves printing to the
//! caller (typically `main.rs`):
//! - [`run_snapshot`] - load a manifest and report every module
//! - [`run_locate`] - derive the locator for a subpath
//! - [`run_code`] - resolve the code of a module or a named object
//!
//! All functions return `Result<T, CliError>`.

use std::path::Path;

use tracing::{info, warn};
use tugscope_core::config::{ConfigOverrides, ResolvedConfig};
use tugscope_core::entity::{canonical_subpath, locator_for, EntityRef, Module, ModuleObject};
use tugscope_core::project::Project;

use crate::error::{CliError, CliResult};
use crate::manifest::Manifest;
use crate::output::{CodeResponse, LocateResponse, ModuleReport, ObjectReport, SnapshotResponse};

// ============================================================================
// Snapshot
// ============================================================================

/// Load the manifest at `path` and report on the resulting project.
pub fn run_snapshot(path: &Path) -> CliResult<SnapshotResponse> {
    let project = Manifest::load(path)?.build()?;
    info!(modules = project.len(), "snapshot built");
    snapshot(&project)
}

/// Report on every module of `project`, sorted by subpath.
pub fn snapshot(project: &Project<String>) -> CliResult<SnapshotResponse> {
    let modules = project
        .modules()
        .map(|module| module_report(project, module))
        .collect::<CliResult<Vec<_>>>()?;
    Ok(SnapshotResponse::new(modules))
}

fn module_report(project: &Project<String>, module: &Module) -> CliResult<ModuleReport> {
    let objects = module
        .objects()
        .iter()
        .map(|object| object_report(project, *object))
        .collect::<CliResult<Vec<_>>>()?;
    let test_cases = module
        .test_cases()
        .map(|id| project.name_of(id).map(str::to_string))
        .collect::<Result<Vec<_>, _>>()?;
    let package = project
        .package_of(module.module_id)
        .and_then(|id| project.module(id))
        .map(|package| package.subpath.clone());

    Ok(ModuleReport {
        subpath: module.subpath.clone(),
        locator: module.locator.clone(),
        has_code_tree: project.has_code_tree(module.module_id),
        package,
        errors: module.errors.clone(),
        imports: module.imports.clone(),
        objects,
        test_cases,
        changed: module.is_changed(),
    })
}

fn object_report(project: &Project<String>, object: ModuleObject) -> CliResult<ObjectReport> {
    let children: Vec<EntityRef> = match object {
        ModuleObject::Class(id) => project
            .class(id)
            .map(|class| class.methods().iter().map(|m| EntityRef::from(*m)).collect())
            .unwrap_or_default(),
        ModuleObject::TestClass(id) => project
            .test_class(id)
            .map(|tc| tc.test_cases().iter().map(|t| EntityRef::from(*t)).collect())
            .unwrap_or_default(),
        ModuleObject::Function(_) => Vec::new(),
    };

    let mut report = entity_report(project, object.into())?;
    report.children = children
        .into_iter()
        .map(|child| entity_report(project, child))
        .collect::<CliResult<Vec<_>>>()?;
    Ok(report)
}

fn entity_report(project: &Project<String>, entity: EntityRef) -> CliResult<ObjectReport> {
    let has_code = match project.code_of(entity) {
        Ok(_) => true,
        Err(err) if err.is_missing_association() => false,
        Err(err) => return Err(err.into()),
    };
    Ok(ObjectReport {
        id: entity,
        name: project.name_of(entity)?.to_string(),
        has_code,
        children: Vec::new(),
    })
}

// ============================================================================
// Locate
// ============================================================================

/// Derive the locator for `subpath`.
///
/// `separator` overrides `TUGSCOPE_PATH_SEPARATOR` and the host default.
pub fn run_locate(subpath: &str, separator: Option<char>) -> CliResult<LocateResponse> {
    if subpath.is_empty() {
        return Err(CliError::invalid_args("subpath must not be empty"));
    }
    let overrides = ConfigOverrides {
        root: None,
        path_separator: separator,
    };
    let config = ResolvedConfig::resolve(&overrides).into_project_config();
    let canonical = canonical_subpath(subpath, config.path_separator);
    let locator = locator_for(&canonical);
    Ok(LocateResponse::new(canonical, locator))
}

// ============================================================================
// Code
// ============================================================================

/// Resolve the code of `module` (a subpath or locator) or of `object` inside
/// it.
///
/// `object` is a dotted name: `Widget`, `Widget.render`, `build` or
/// `TestWidget.test_render`.
pub fn run_code(manifest: &Path, module: &str, object: Option<&str>) -> CliResult<CodeResponse> {
    let project = Manifest::load(manifest)?.build()?;
    code(&project, module, object)
}

/// Resolve code in an already built project.
pub fn code(project: &Project<String>, module: &str, object: Option<&str>) -> CliResult<CodeResponse> {
    let entry = project.find_module(module)?;
    let entity = match object {
        None => EntityRef::from(entry.module_id),
        Some(name) => resolve_object(project, entry, name)?,
    };

    let code = project.code_of(entity).inspect_err(|err| {
        if err.is_missing_association() {
            warn!(entity = %entity, "no code recorded");
        }
    })?;
    Ok(CodeResponse::new(entry.subpath.clone(), entity, code.clone()))
}

fn resolve_object(project: &Project<String>, module: &Module, name: &str) -> CliResult<EntityRef> {
    let not_found = || CliError::object_not_found(module.subpath.clone(), name);
    let (head, member) = match name.split_once('.') {
        Some((head, member)) => (head, Some(member)),
        None => (name, None),
    };
    let object = project
        .find_object_by_name(module.module_id, head)
        .ok_or_else(not_found)?;

    let Some(member) = member else {
        return Ok(object.into());
    };
    let entity = match object {
        ModuleObject::Class(klass) => project
            .find_method_by_name(klass, member)
            .map(EntityRef::from),
        ModuleObject::TestClass(test_class) => project
            .find_test_method_by_name(test_class, member)
            .map(EntityRef::from),
        ModuleObject::Function(_) => None,
    };
    entity.ok_or_else(not_found)
}
