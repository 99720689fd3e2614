//! JSON project manifests.
//!
//! A manifest describes a project without parsing anything: each module lists
//! its parse outcome (`source` for the parsed value, or `errors`), its imports
//! and its objects. Any entity may carry `code`, which is recorded as its
//! fragment in the module's code tree.
//!
//! ```json
//! {
//!   "path_separator": "/",
//!   "modules": [
//!     {
//!       "subpath": "pkg/widget.py",
//!       "source": "<module>",
//!       "imports": ["os"],
//!       "objects": [
//!         { "kind": "class", "name": "Widget", "bases": ["object"],
//!           "methods": [{ "name": "render", "args": ["self"], "code": "def render" }] },
//!         { "kind": "function", "name": "build", "args": [] },
//!         { "kind": "test_class", "name": "TestWidget",
//!           "test_methods": [{ "name": "test_render" }] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tugscope_core::config::{ConfigOverrides, ProjectConfig, ResolvedConfig};
use tugscope_core::entity::{EntityRef, ModuleId};
use tugscope_core::error::StoreResult;
use tugscope_core::parser::ParseError;
use tugscope_core::project::Project;

use crate::error::CliResult;

/// A whole project description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Project root; overrides the environment when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Separator used in `subpath` values; overrides the environment when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_separator: Option<char>,
    /// Modules, in registration order.
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

/// One module entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub subpath: String,
    /// Parsed value; absent means the module gets no code tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub errors: Vec<ParseError>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

/// A direct child of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectSpec {
    Class {
        name: String,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        bases: Vec<String>,
        #[serde(default)]
        methods: Vec<MemberSpec>,
    },
    Function {
        name: String,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        args: Vec<String>,
    },
    TestClass {
        name: String,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        test_methods: Vec<MemberSpec>,
    },
}

/// A method or test method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSpec {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Manifest {
    /// Read a manifest from a JSON file.
    pub fn load(path: &Path) -> CliResult<Manifest> {
        let text = fs::read_to_string(path)?;
        Manifest::from_json(&text)
    }

    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> CliResult<Manifest> {
        Ok(serde_json::from_str(text)?)
    }

    /// Project configuration: manifest values over environment over defaults.
    pub fn config(&self) -> ProjectConfig {
        let overrides = ConfigOverrides {
            root: self.root.clone(),
            path_separator: self.path_separator,
        };
        ResolvedConfig::resolve(&overrides).into_project_config()
    }

    /// Build a project from this manifest.
    pub fn build(&self) -> CliResult<Project<String>> {
        self.build_with(self.config())
    }

    /// Build a project with an explicit configuration.
    pub fn build_with(&self, config: ProjectConfig) -> CliResult<Project<String>> {
        let mut project = Project::new(config);
        for spec in &self.modules {
            load_module(&mut project, spec)?;
        }
        debug!(modules = project.len(), "manifest loaded");
        Ok(project)
    }
}

fn load_module(project: &mut Project<String>, spec: &ModuleSpec) -> CliResult<ModuleId> {
    let module = project.create_module(&spec.subpath, spec.source.clone(), spec.errors.clone());
    project.add_imports(module, spec.imports.iter().cloned())?;

    for object in &spec.objects {
        match object {
            ObjectSpec::Class {
                name,
                code,
                bases,
                methods,
            } => {
                let klass = project.declare_class(module, name.as_str())?;
                project.set_bases(klass, bases.clone())?;
                record_fragment(project, module, klass, code)?;
                for member in methods {
                    let method = project.declare_method(klass, member.name.as_str())?;
                    project.set_method_args(method, member.args.clone())?;
                    record_fragment(project, module, method, &member.code)?;
                }
            }
            ObjectSpec::Function { name, code, args } => {
                let function = project.declare_function(module, name.as_str())?;
                project.set_function_args(function, args.clone())?;
                record_fragment(project, module, function, code)?;
            }
            ObjectSpec::TestClass {
                name,
                code,
                test_methods,
            } => {
                let test_class = project.new_test_class(module, name.as_str())?;
                let fragment = usable_fragment(project, module, test_class.into(), code);
                project.add_test_case(module, test_class, fragment)?;
                for member in test_methods {
                    let test_method = project.new_test_method(test_class, member.name.as_str())?;
                    let fragment = usable_fragment(project, module, test_method.into(), &member.code);
                    project.add_test_method(test_class, test_method, fragment)?;
                }
            }
        }
    }
    Ok(module)
}

/// The fragment to record, or `None` if the module cannot hold one.
fn usable_fragment(
    project: &Project<String>,
    module: ModuleId,
    entity: EntityRef,
    code: &Option<String>,
) -> Option<String> {
    let code = code.as_ref()?;
    match project.code_tree_of(module) {
        Ok(_) => Some(code.clone()),
        Err(err) => {
            warn!(entity = %entity, error = %err, "skipping fragment");
            None
        }
    }
}

fn record_fragment(
    project: &mut Project<String>,
    module: ModuleId,
    entity: impl Into<EntityRef>,
    code: &Option<String>,
) -> StoreResult<()> {
    let entity = entity.into();
    let Some(code) = usable_fragment(project, module, entity, code) else {
        return Ok(());
    };
    project.code_tree_of_mut(module)?.add_object(entity, code);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tugscope_core::entity::ModuleObject;

    fn build(json: &str) -> Project<String> {
        Manifest::from_json(json)
            .unwrap()
            .build_with(ProjectConfig::default().with_path_separator('/'))
            .unwrap()
    }

    #[test]
    fn builds_modules_objects_and_fragments() {
        let project = build(
            r#"{
                "modules": [{
                    "subpath": "pkg/widget.py",
                    "source": "<module>",
                    "imports": ["os"],
                    "objects": [
                        {"kind": "class", "name": "Widget", "code": "class Widget",
                         "methods": [{"name": "render", "args": ["self"], "code": "def render"}]},
                        {"kind": "function", "name": "build", "args": ["size"]},
                        {"kind": "test_class", "name": "TestWidget", "code": "class TestWidget",
                         "test_methods": [{"name": "test_render", "code": "def test_render"}]}
                    ]
                }]
            }"#,
        );

        let module = project.find_module("pkg.widget").unwrap();
        assert_eq!(module.imports, vec!["os"]);
        assert_eq!(module.objects().len(), 3);
        assert!(module.is_changed());

        let Some(ModuleObject::Class(klass)) = project.find_object_by_name(module.module_id, "Widget")
        else {
            panic!("Widget should be a class");
        };
        let render = project.find_method_by_name(klass, "render").unwrap();
        assert_eq!(project.code_of(render).unwrap(), "def render");
        assert_eq!(project.method(render).unwrap().args, vec!["self"]);
        assert_eq!(project.code_of(module.module_id).unwrap(), "<module>");
    }

    #[test]
    fn module_with_errors_skips_fragments() {
        let project = build(
            r#"{
                "modules": [{
                    "subpath": "broken.py",
                    "source": "ignored",
                    "errors": [{"message": "invalid syntax", "line": 3}],
                    "objects": [{"kind": "function", "name": "f", "code": "def f"}]
                }]
            }"#,
        );

        let module = project.find_module("broken.py").unwrap();
        assert!(module.has_errors());
        assert!(!project.has_code_tree(module.module_id));
        assert_eq!(module.functions().count(), 1);
    }

    #[test]
    fn test_class_without_tree_is_still_attached() {
        let project = build(
            r#"{
                "modules": [{
                    "subpath": "test_m.py",
                    "objects": [{"kind": "test_class", "name": "TestM", "code": "class TestM",
                                 "test_methods": [{"name": "test_a"}]}]
                }]
            }"#,
        );

        let module = project.find_module("test_m.py").unwrap();
        assert!(module.has_test_cases());
        let test_class = module.test_cases().next().unwrap();
        assert_eq!(project.test_class(test_class).unwrap().test_cases().len(), 1);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Manifest::from_json(
            r#"{"modules": [{"subpath": "m.py", "objects": [{"kind": "lambda", "name": "x"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid manifest"));
    }

    #[test]
    fn manifest_settings_override_environment() {
        let manifest = Manifest {
            root: Some(PathBuf::from("/proj")),
            path_separator: Some('#'),
            modules: Vec::new(),
        };
        let config = manifest.config();
        assert_eq!(config.root, PathBuf::from("/proj"));
        assert_eq!(config.path_separator, '#');
    }
}
