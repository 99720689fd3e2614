//! Entity model: modules, classes, functions, methods and generated tests.
//!
//! Entities are plain tables owned by a [`Project`](crate::project::Project)
//! and addressed by typed IDs:
//! - [`Module`]: one source file, keyed by its canonical subpath
//! - [`Class`] and [`Function`]: owned by a module
//! - [`Method`]: owned by a class
//! - [`TestClass`]: generated, owned by a module
//! - [`TestMethod`]: generated, owned by a test class
//!
//! Back-references (`module`, `klass`, `parent`) are IDs. They never own
//! anything; the project's arenas are the only ownership edge.
//!
//! [`EntityRef`] is the closed union of all six ID kinds and is what the
//! polymorphic operations (`module_of`, `code_of`, code tree fragments)
//! accept. [`ModuleObject`] is the narrower union of kinds a module can list
//! as direct children.
//!
//! # Subpaths and Locators
//!
//! Subpaths are stored with the canonical `/` separator regardless of the
//! host. The locator is the dotted module name; a package's init module is
//! located as the package itself:
//!
//! | Subpath | Locator |
//! |---------|---------|
//! | `module.py` | `module` |
//! | `pkg/sub/mod.py` | `pkg.sub.mod` |
//! | `pkg/__init__.py` | `pkg` |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::ParseError;

/// Canonical separator used in stored subpaths.
pub const CANONICAL_SEPARATOR: char = '/';

/// Suffix of a package's init module, located as the package itself.
const PACKAGE_INIT_SUFFIX: &str = "/__init__.py";

/// Source file extension dropped from locators.
const SOURCE_EXTENSION: &str = ".py";

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a module within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    /// Create a new module ID.
    pub fn new(id: u32) -> Self {
        ModuleId(id)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mod_{}", self.0)
    }
}

/// Unique identifier for a class within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Create a new class ID.
    pub fn new(id: u32) -> Self {
        ClassId(id)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cls_{}", self.0)
    }
}

/// Unique identifier for a function within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    /// Create a new function ID.
    pub fn new(id: u32) -> Self {
        FunctionId(id)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn_{}", self.0)
    }
}

/// Unique identifier for a method within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MethodId(pub u32);

impl MethodId {
    /// Create a new method ID.
    pub fn new(id: u32) -> Self {
        MethodId(id)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "meth_{}", self.0)
    }
}

/// Unique identifier for a generated test class within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TestClassId(pub u32);

impl TestClassId {
    /// Create a new test class ID.
    pub fn new(id: u32) -> Self {
        TestClassId(id)
    }
}

impl fmt::Display for TestClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcls_{}", self.0)
    }
}

/// Unique identifier for a generated test method within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TestMethodId(pub u32);

impl TestMethodId {
    /// Create a new test method ID.
    pub fn new(id: u32) -> Self {
        TestMethodId(id)
    }
}

impl fmt::Display for TestMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmeth_{}", self.0)
    }
}

// ============================================================================
// Entity References
// ============================================================================

/// Kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Module,
    Class,
    Function,
    Method,
    TestClass,
    TestMethod,
}

impl EntityKind {
    /// Stable lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Module => "module",
            EntityKind::Class => "class",
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::TestClass => "test_class",
            EntityKind::TestMethod => "test_method",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to any entity in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Module(ModuleId),
    Class(ClassId),
    Function(FunctionId),
    Method(MethodId),
    TestClass(TestClassId),
    TestMethod(TestMethodId),
}

impl EntityRef {
    /// The kind of the referenced entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Module(_) => EntityKind::Module,
            EntityRef::Class(_) => EntityKind::Class,
            EntityRef::Function(_) => EntityKind::Function,
            EntityRef::Method(_) => EntityKind::Method,
            EntityRef::TestClass(_) => EntityKind::TestClass,
            EntityRef::TestMethod(_) => EntityKind::TestMethod,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Module(id) => fmt::Display::fmt(id, f),
            EntityRef::Class(id) => fmt::Display::fmt(id, f),
            EntityRef::Function(id) => fmt::Display::fmt(id, f),
            EntityRef::Method(id) => fmt::Display::fmt(id, f),
            EntityRef::TestClass(id) => fmt::Display::fmt(id, f),
            EntityRef::TestMethod(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl From<ModuleId> for EntityRef {
    fn from(id: ModuleId) -> Self {
        EntityRef::Module(id)
    }
}

impl From<ClassId> for EntityRef {
    fn from(id: ClassId) -> Self {
        EntityRef::Class(id)
    }
}

impl From<FunctionId> for EntityRef {
    fn from(id: FunctionId) -> Self {
        EntityRef::Function(id)
    }
}

impl From<MethodId> for EntityRef {
    fn from(id: MethodId) -> Self {
        EntityRef::Method(id)
    }
}

impl From<TestClassId> for EntityRef {
    fn from(id: TestClassId) -> Self {
        EntityRef::TestClass(id)
    }
}

impl From<TestMethodId> for EntityRef {
    fn from(id: TestMethodId) -> Self {
        EntityRef::TestMethod(id)
    }
}

/// A direct child of a module, as listed in [`Module::objects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ModuleObject {
    Class(ClassId),
    Function(FunctionId),
    TestClass(TestClassId),
}

impl From<ClassId> for ModuleObject {
    fn from(id: ClassId) -> Self {
        ModuleObject::Class(id)
    }
}

impl From<FunctionId> for ModuleObject {
    fn from(id: FunctionId) -> Self {
        ModuleObject::Function(id)
    }
}

impl From<TestClassId> for ModuleObject {
    fn from(id: TestClassId) -> Self {
        ModuleObject::TestClass(id)
    }
}

impl From<ModuleObject> for EntityRef {
    fn from(object: ModuleObject) -> Self {
        match object {
            ModuleObject::Class(id) => EntityRef::Class(id),
            ModuleObject::Function(id) => EntityRef::Function(id),
            ModuleObject::TestClass(id) => EntityRef::TestClass(id),
        }
    }
}

// ============================================================================
// Path Helpers
// ============================================================================

/// Normalize a project-relative path to the canonical `/` separator.
///
/// `separator` is the host (or configured) path separator.
pub fn canonical_subpath(raw: &str, separator: char) -> String {
    if separator == CANONICAL_SEPARATOR {
        raw.to_string()
    } else {
        raw.replace(separator, "/")
    }
}

/// Derive the dotted locator of a canonical subpath.
///
/// A trailing `/__init__.py` is dropped, otherwise a trailing `.py`; then
/// every `/` becomes `.`.
pub fn locator_for(subpath: &str) -> String {
    let module = subpath
        .strip_suffix(PACKAGE_INIT_SUFFIX)
        .or_else(|| subpath.strip_suffix(SOURCE_EXTENSION))
        .unwrap_or(subpath);
    module.replace(CANONICAL_SEPARATOR, ".")
}

// ============================================================================
// Entity Tables
// ============================================================================

/// A source module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Unique identifier for this module.
    pub module_id: ModuleId,
    /// Project-relative path with `/` separators.
    pub subpath: String,
    /// Dotted name derived from `subpath`.
    pub locator: String,
    /// Errors reported when parsing failed. Non-empty means no code tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
    /// Imported module names, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    objects: Vec<ModuleObject>,
    #[serde(default)]
    changed: bool,
}

impl Module {
    /// Create a new module entry for a canonical subpath.
    pub fn new(module_id: ModuleId, subpath: impl Into<String>) -> Self {
        let subpath = subpath.into();
        let locator = locator_for(&subpath);
        Module {
            module_id,
            subpath,
            locator,
            errors: Vec::new(),
            imports: Vec::new(),
            objects: Vec::new(),
            changed: false,
        }
    }

    /// Set the parse errors.
    pub fn with_errors(mut self, errors: Vec<ParseError>) -> Self {
        self.errors = errors;
        self
    }

    /// True if parsing this module failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Direct children in insertion order.
    pub fn objects(&self) -> &[ModuleObject] {
        &self.objects
    }

    /// Classes among the direct children, in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.objects.iter().filter_map(|object| match object {
            ModuleObject::Class(id) => Some(*id),
            _ => None,
        })
    }

    /// Functions among the direct children, in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.objects.iter().filter_map(|object| match object {
            ModuleObject::Function(id) => Some(*id),
            _ => None,
        })
    }

    /// Test classes among the direct children, in insertion order.
    pub fn test_cases(&self) -> impl Iterator<Item = TestClassId> + '_ {
        self.objects.iter().filter_map(|object| match object {
            ModuleObject::TestClass(id) => Some(*id),
            _ => None,
        })
    }

    /// True if any direct child is a test class.
    pub fn has_test_cases(&self) -> bool {
        self.test_cases().next().is_some()
    }

    /// True once generated test code has been added to this module.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn push_objects(&mut self, objects: impl IntoIterator<Item = ModuleObject>) {
        self.objects.extend(objects);
    }

    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    /// Unique identifier for this class.
    pub class_id: ClassId,
    /// Class name.
    pub name: String,
    /// Module this class belongs to.
    pub module: ModuleId,
    /// Base class expressions, as written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    methods: Vec<MethodId>,
}

impl Class {
    /// Create a new class entry.
    pub fn new(class_id: ClassId, name: impl Into<String>, module: ModuleId) -> Self {
        Class {
            class_id,
            name: name.into(),
            module,
            bases: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Methods in insertion order.
    pub fn methods(&self) -> &[MethodId] {
        &self.methods
    }

    pub(crate) fn push_methods(&mut self, methods: impl IntoIterator<Item = MethodId>) {
        self.methods.extend(methods);
    }
}

/// A module-level function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Unique identifier for this function.
    pub function_id: FunctionId,
    /// Function name.
    pub name: String,
    /// Module this function belongs to.
    pub module: ModuleId,
    /// Argument names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Function {
    /// Create a new function entry.
    pub fn new(function_id: FunctionId, name: impl Into<String>, module: ModuleId) -> Self {
        Function {
            function_id,
            name: name.into(),
            module,
            args: Vec::new(),
        }
    }
}

/// A method of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    /// Unique identifier for this method.
    pub method_id: MethodId,
    /// Method name.
    pub name: String,
    /// Class this method belongs to.
    pub klass: ClassId,
    /// Argument names, including the receiver.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Method {
    /// Create a new method entry.
    pub fn new(method_id: MethodId, name: impl Into<String>, klass: ClassId) -> Self {
        Method {
            method_id,
            name: name.into(),
            klass,
            args: Vec::new(),
        }
    }
}

/// A generated test class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestClass {
    /// Unique identifier for this test class.
    pub test_class_id: TestClassId,
    /// Class name.
    pub name: String,
    /// Module this test class lives in.
    pub parent: ModuleId,
    test_cases: Vec<TestMethodId>,
}

impl TestClass {
    /// Create a new test class entry.
    pub fn new(test_class_id: TestClassId, name: impl Into<String>, parent: ModuleId) -> Self {
        TestClass {
            test_class_id,
            name: name.into(),
            parent,
            test_cases: Vec::new(),
        }
    }

    /// Test methods in insertion order.
    pub fn test_cases(&self) -> &[TestMethodId] {
        &self.test_cases
    }

    pub(crate) fn push_test_cases(&mut self, methods: impl IntoIterator<Item = TestMethodId>) {
        self.test_cases.extend(methods);
    }
}

/// A generated test method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMethod {
    /// Unique identifier for this test method.
    pub test_method_id: TestMethodId,
    /// Method name.
    pub name: String,
    /// Test class this method belongs to.
    pub parent: TestClassId,
}

impl TestMethod {
    /// Create a new test method entry.
    pub fn new(test_method_id: TestMethodId, name: impl Into<String>, parent: TestClassId) -> Self {
        TestMethod {
            test_method_id,
            name: name.into(),
            parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod path_tests {
        use super::*;

        #[test]
        fn locator_drops_extension_and_dots_directories() {
            assert_eq!(locator_for("module.py"), "module");
            assert_eq!(locator_for("a/b.py"), "a.b");
            assert_eq!(locator_for("pkg/sub/mod.py"), "pkg.sub.mod");
        }

        #[test]
        fn package_init_is_located_as_the_package() {
            assert_eq!(locator_for("pkg/__init__.py"), "pkg");
            assert_eq!(locator_for("pkg/sub/__init__.py"), "pkg.sub");
            assert_eq!(locator_for("__init__.py"), "__init__");
            assert_eq!(locator_for("pkg/not__init__.py"), "pkg.not__init__");
        }

        #[test]
        fn locator_only_strips_source_extension() {
            assert_eq!(locator_for("v1.2/tool.tar.gz"), "v1.2.tool.tar.gz");
            assert_eq!(locator_for("scripts/run"), "scripts.run");
            assert_eq!(locator_for("pkg/mod.pyc"), "pkg.mod.pyc");
        }

        #[test]
        fn custom_separator_is_normalized_before_locating() {
            let subpath = canonical_subpath("some#path.py", '#');
            assert_eq!(subpath, "some/path.py");
            assert_eq!(locator_for(&subpath), "some.path");
        }

        #[test]
        fn different_hosts_agree_on_locators() {
            let unix = canonical_subpath("pkg/mod.py", '/');
            let windows = canonical_subpath("pkg\\mod.py", '\\');
            assert_eq!(unix, windows);
            assert_eq!(locator_for(&unix), locator_for(&windows));
        }

        #[test]
        fn canonical_subpath_is_idempotent() {
            let once = canonical_subpath("a\\b\\c.py", '\\');
            assert_eq!(canonical_subpath(&once, '\\'), once);
        }
    }

    mod module_tests {
        use super::*;

        #[test]
        fn new_module_derives_locator() {
            let module = Module::new(ModuleId::new(0), "a/b.py");
            assert_eq!(module.locator, "a.b");
            assert!(module.objects().is_empty());
            assert!(!module.has_errors());
            assert!(!module.is_changed());
        }

        #[test]
        fn views_preserve_insertion_order() {
            let mut module = Module::new(ModuleId::new(0), "m.py");
            module.push_objects([
                ModuleObject::TestClass(TestClassId::new(3)),
                ModuleObject::Class(ClassId::new(1)),
                ModuleObject::Function(FunctionId::new(0)),
                ModuleObject::TestClass(TestClassId::new(1)),
                ModuleObject::Class(ClassId::new(0)),
            ]);

            let classes: Vec<_> = module.classes().collect();
            assert_eq!(classes, vec![ClassId::new(1), ClassId::new(0)]);

            let tests: Vec<_> = module.test_cases().collect();
            assert_eq!(tests, vec![TestClassId::new(3), TestClassId::new(1)]);

            let functions: Vec<_> = module.functions().collect();
            assert_eq!(functions, vec![FunctionId::new(0)]);
            assert!(module.has_test_cases());
        }

        #[test]
        fn duplicates_are_kept() {
            let mut module = Module::new(ModuleId::new(0), "m.py");
            let tc = ModuleObject::TestClass(TestClassId::new(0));
            module.push_objects([tc, tc]);
            assert_eq!(module.objects(), &[tc, tc]);
        }

        #[test]
        fn errors_are_recorded() {
            let module =
                Module::new(ModuleId::new(0), "bad.py").with_errors(vec![ParseError::new("eof")]);
            assert!(module.has_errors());
        }
    }

    mod ref_tests {
        use super::*;

        #[test]
        fn display_uses_kind_prefixes() {
            assert_eq!(EntityRef::from(ModuleId::new(1)).to_string(), "mod_1");
            assert_eq!(EntityRef::from(ClassId::new(2)).to_string(), "cls_2");
            assert_eq!(EntityRef::from(FunctionId::new(3)).to_string(), "fn_3");
            assert_eq!(EntityRef::from(MethodId::new(4)).to_string(), "meth_4");
            assert_eq!(EntityRef::from(TestClassId::new(5)).to_string(), "tcls_5");
            assert_eq!(EntityRef::from(TestMethodId::new(6)).to_string(), "tmeth_6");
        }

        #[test]
        fn module_objects_convert_to_matching_refs() {
            let object = ModuleObject::from(TestClassId::new(9));
            let entity = EntityRef::from(object);
            assert_eq!(entity, EntityRef::TestClass(TestClassId::new(9)));
            assert_eq!(entity.kind(), EntityKind::TestClass);
            assert_eq!(entity.kind().as_str(), "test_class");
        }

        #[test]
        fn entity_ref_serializes_tagged() {
            let json = serde_json::to_string(&EntityRef::from(MethodId::new(2))).unwrap();
            assert_eq!(json, r#"{"kind":"method","id":2}"#);
        }
    }
}
