//! End-to-end scenarios for the project store.
//!
//! These exercise the public API only: module lifecycle, attachment order,
//! owner resolution and code lookup across every entity kind.

use tugscope_core::code_tree::CodeTree;
use tugscope_core::config::ProjectConfig;
use tugscope_core::entity::{EntityRef, ModuleObject};
use tugscope_core::error::StoreError;
use tugscope_core::parser::{ParseError, SourceParser};
use tugscope_core::project::Project;
use tugscope_core::traversal::{code_of, module_of};

/// A stand-in parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Tree {
    Empty,
    Fragment(&'static str),
}

fn project() -> Project<Tree> {
    Project::new(ProjectConfig::default().with_path_separator('/'))
}

// ============================================================================
// Module Lifecycle
// ============================================================================

#[test]
fn create_then_remove_module_drops_tree() {
    let mut project = project();
    let module = project.create_module("a/b.py", Some(Tree::Empty), Vec::new());

    assert_eq!(project.module(module).unwrap().locator, "a.b");
    assert_eq!(CodeTree::of(&project, module).unwrap().code(), &Tree::Empty);

    project.remove_module("a/b.py");

    let err = CodeTree::of(&project, module).unwrap_err();
    assert_eq!(err, StoreError::CodeTreeNotFound { module });
    assert!(err.is_missing_association());
}

#[test]
fn module_with_errors_has_no_tree_from_creation() {
    let mut project = project();
    let module = project.create_module(
        "broken.py",
        Some(Tree::Empty),
        vec![ParseError::at("invalid syntax", 1, 4)],
    );

    assert!(CodeTree::of(&project, module).unwrap_err().is_missing_association());
    assert_eq!(project.module(module).unwrap().errors[0].line, Some(1));
}

#[test]
fn locator_normalizes_configured_separator() {
    let mut project: Project<Tree> =
        Project::new(ProjectConfig::default().with_path_separator('#'));
    let module = project.create_module("some#path.py", None, Vec::new());
    assert_eq!(project.module(module).unwrap().locator, "some.path");
    assert_eq!(project.find_module("some.path").unwrap().module_id, module);
}

// ============================================================================
// Attachment Order
// ============================================================================

#[test]
fn add_objects_preserves_order_and_duplicates() {
    let mut project = project();
    let module = project.create_module("test_m.py", None, Vec::new());
    let first = project.new_test_class(module, "TestFirst").unwrap();
    let helper = project.new_function(module, "helper").unwrap();
    let second = project.new_test_class(module, "TestSecond").unwrap();

    project.add_objects(module, [first]).unwrap();
    project
        .add_objects(
            module,
            [
                ModuleObject::from(helper),
                ModuleObject::from(second),
                ModuleObject::from(first),
            ],
        )
        .unwrap();

    let entry = project.module(module).unwrap();
    assert_eq!(
        entry.objects(),
        &[
            ModuleObject::TestClass(first),
            ModuleObject::Function(helper),
            ModuleObject::TestClass(second),
            ModuleObject::TestClass(first),
        ]
    );
    assert_eq!(
        entry.test_cases().collect::<Vec<_>>(),
        vec![first, second, first]
    );
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn module_of_resolves_to_root_not_intermediate_owner() {
    let mut project = project();
    let module = project.create_module("m.py", Some(Tree::Empty), Vec::new());
    let klass = project.declare_class(module, "Widget").unwrap();
    let method = project.declare_method(klass, "render").unwrap();

    assert_eq!(module_of(&project, method).unwrap(), module);
    assert_ne!(EntityRef::from(module_of(&project, method).unwrap()), EntityRef::from(klass));
}

#[test]
fn code_of_round_trips_every_kind() {
    let mut project = project();
    let module = project.create_module("m.py", Some(Tree::Empty), Vec::new());
    let klass = project.declare_class(module, "Widget").unwrap();
    let method = project.declare_method(klass, "render").unwrap();
    let function = project.declare_function(module, "build").unwrap();
    let test_class = project.new_test_class(module, "TestWidget").unwrap();
    let test_method = project.new_test_method(test_class, "test_render").unwrap();

    let fragments: [(EntityRef, &'static str); 5] = [
        (klass.into(), "class Widget"),
        (method.into(), "def render"),
        (function.into(), "def build"),
        (test_class.into(), "class TestWidget"),
        (test_method.into(), "def test_render"),
    ];
    {
        let tree = project.code_tree_of_mut(module).unwrap();
        for (entity, text) in fragments {
            tree.add_object(entity, Tree::Fragment(text));
        }
    }

    for (entity, text) in fragments {
        assert_eq!(code_of(&project, entity).unwrap(), &Tree::Fragment(text));
    }
    assert_eq!(code_of(&project, module).unwrap(), &Tree::Empty);
}

#[test]
fn missing_fragment_is_distinct_from_missing_tree() {
    let mut project = project();
    let with_tree = project.create_module("a.py", Some(Tree::Empty), Vec::new());
    let without_tree = project.create_module("b.py", None, Vec::new());
    let a = project.declare_function(with_tree, "f").unwrap();
    let b = project.declare_function(without_tree, "g").unwrap();

    assert!(matches!(
        project.code_of(a),
        Err(StoreError::FragmentNotFound { .. })
    ));
    assert!(matches!(
        project.code_of(b),
        Err(StoreError::CodeTreeNotFound { .. })
    ));
}

#[test]
fn removed_entities_are_unresolvable() {
    let mut project = project();
    let module = project.create_module("m.py", Some(Tree::Empty), Vec::new());
    let klass = project.declare_class(module, "Widget").unwrap();
    let method = project.declare_method(klass, "render").unwrap();

    project.remove_module("m.py");

    assert_eq!(
        module_of(&project, method).unwrap_err(),
        StoreError::entity_not_found(method)
    );
    let err = code_of(&project, method).unwrap_err();
    assert_eq!(err, StoreError::CodeTreeNotFound { module });
    assert!(err.is_missing_association());
}

// ============================================================================
// Parser Seam and Adder
// ============================================================================

struct StrictParser;

impl SourceParser for StrictParser {
    type Tree = Tree;

    fn parse(&self, _subpath: &str, source: &str) -> Result<Tree, Vec<ParseError>> {
        if source.trim().is_empty() {
            Ok(Tree::Empty)
        } else {
            Err(vec![ParseError::new("only empty sources parse")])
        }
    }
}

#[test]
fn load_module_encodes_parse_outcome() {
    let mut project = project();
    let ok = project.load_module(&StrictParser, "ok.py", "");
    let bad = project.load_module(&StrictParser, "bad.py", "def");

    assert!(project.has_code_tree(ok));
    assert!(!project.has_code_tree(bad));
    assert!(project.module(bad).unwrap().has_errors());
}

#[test]
fn generated_tests_land_in_changed_module() {
    let mut project = project();
    let target = project.create_module("test_widget.py", Some(Tree::Empty), Vec::new());
    let untouched = project.create_module("widget.py", Some(Tree::Empty), Vec::new());
    let test_class = project.new_test_class(target, "TestWidget").unwrap();
    let test_method = project.new_test_method(test_class, "test_render").unwrap();

    project
        .add_test_case(target, test_class, Some(Tree::Fragment("class TestWidget")))
        .unwrap();
    project
        .add_test_method(test_class, test_method, Some(Tree::Fragment("def test_render")))
        .unwrap();

    let changed: Vec<_> = project.changed_modules().map(|m| m.module_id).collect();
    assert_eq!(changed, vec![target]);
    assert!(!project.module(untouched).unwrap().is_changed());
    assert_eq!(
        project.code_of(test_method).unwrap(),
        &Tree::Fragment("def test_render")
    );
}
