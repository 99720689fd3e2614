//! Project registry: modules, their entities and their code trees.
//!
//! The [`Project`] owns every entity in arenas keyed by typed IDs, plus the
//! association from modules to [`CodeTree`]s. It provides:
//! - Module creation from a parse outcome, and atomic removal
//! - Entity construction that always names the owner
//! - Append-only attachment (`add_objects`, `add_methods`, `add_test_cases`)
//! - Deterministic iteration (modules sorted by subpath, children in
//!   insertion order)
//!
//! # Invariants
//!
//! - A subpath maps to at most one live module.
//! - A module has at most one code tree.
//! - A module with parse errors never has a code tree.
//! - Removing a module removes its code tree and every entity it owns.
//!
//! # Example
//!
//! ```
//! use tugscope_core::code_tree::CodeTree;
//! use tugscope_core::project::Project;
//!
//! let mut project: Project<&str> = Project::default();
//! let module = project.create_module("a/b.py", Some("<tree>"), Vec::new());
//! assert_eq!(project.module(module).unwrap().locator, "a.b");
//! assert_eq!(*CodeTree::of(&project, module).unwrap().code(), "<tree>");
//!
//! project.remove_module("a/b.py");
//! assert!(CodeTree::of(&project, module).is_err());
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Component, Path};

use tracing::{debug, warn};

use crate::code_tree::CodeTree;
use crate::config::ProjectConfig;
use crate::entity::{
    canonical_subpath, locator_for, Class, ClassId, EntityRef, Function, FunctionId, Method,
    MethodId, Module, ModuleId, ModuleObject, TestClass, TestClassId, TestMethod, TestMethodId,
};
use crate::error::{StoreError, StoreResult};
use crate::parser::{ParseError, SourceParser};

/// File name that marks a directory as a package.
pub const PACKAGE_INIT: &str = "__init__.py";

/// The registry of modules, entities and code trees for one project.
#[derive(Debug)]
pub struct Project<C> {
    config: ProjectConfig,

    // Primary storage (BTreeMap for deterministic iteration)
    modules: BTreeMap<ModuleId, Module>,
    classes: BTreeMap<ClassId, Class>,
    functions: BTreeMap<FunctionId, Function>,
    methods: BTreeMap<MethodId, Method>,
    test_classes: BTreeMap<TestClassId, TestClass>,
    test_methods: BTreeMap<TestMethodId, TestMethod>,

    /// Canonical subpath → live module.
    modules_by_subpath: BTreeMap<String, ModuleId>,
    /// Module → its code tree. Absent means no tree.
    code_trees: HashMap<ModuleId, CodeTree<C>>,
    /// Entity removed with its module → that module. IDs are never reused.
    retired: HashMap<EntityRef, ModuleId>,

    // ID generators
    next_module_id: u32,
    next_class_id: u32,
    next_function_id: u32,
    next_method_id: u32,
    next_test_class_id: u32,
    next_test_method_id: u32,
}

impl<C> Default for Project<C> {
    fn default() -> Self {
        Project::new(ProjectConfig::default())
    }
}

impl<C> Project<C> {
    /// Create an empty project.
    pub fn new(config: ProjectConfig) -> Self {
        Project {
            config,
            modules: BTreeMap::new(),
            classes: BTreeMap::new(),
            functions: BTreeMap::new(),
            methods: BTreeMap::new(),
            test_classes: BTreeMap::new(),
            test_methods: BTreeMap::new(),
            modules_by_subpath: BTreeMap::new(),
            code_trees: HashMap::new(),
            retired: HashMap::new(),
            next_module_id: 0,
            next_class_id: 0,
            next_function_id: 0,
            next_method_id: 0,
            next_test_class_id: 0,
            next_test_method_id: 0,
        }
    }

    /// The configuration this project was created with.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    // ========================================================================
    // ID Generation
    // ========================================================================

    fn next_module_id(&mut self) -> ModuleId {
        let id = ModuleId::new(self.next_module_id);
        self.next_module_id += 1;
        id
    }

    fn next_class_id(&mut self) -> ClassId {
        let id = ClassId::new(self.next_class_id);
        self.next_class_id += 1;
        id
    }

    fn next_function_id(&mut self) -> FunctionId {
        let id = FunctionId::new(self.next_function_id);
        self.next_function_id += 1;
        id
    }

    fn next_method_id(&mut self) -> MethodId {
        let id = MethodId::new(self.next_method_id);
        self.next_method_id += 1;
        id
    }

    fn next_test_class_id(&mut self) -> TestClassId {
        let id = TestClassId::new(self.next_test_class_id);
        self.next_test_class_id += 1;
        id
    }

    fn next_test_method_id(&mut self) -> TestMethodId {
        let id = TestMethodId::new(self.next_test_method_id);
        self.next_test_method_id += 1;
        id
    }

    // ========================================================================
    // Module Lifecycle
    // ========================================================================

    /// Create and register a module.
    ///
    /// `subpath` uses the configured path separator and is stored in canonical
    /// form. If `errors` is empty and `code` is present, the module gets a code
    /// tree wrapping `code`. If `errors` is non-empty the module carries them
    /// and gets no tree; `code` is dropped.
    ///
    /// A module already registered at the same subpath is replaced, together
    /// with its code tree and entities.
    pub fn create_module(
        &mut self,
        subpath: &str,
        code: Option<C>,
        errors: Vec<ParseError>,
    ) -> ModuleId {
        let subpath = canonical_subpath(subpath, self.config.path_separator);
        if let Some(previous) = self.remove_module(&subpath) {
            debug!(subpath = %subpath, previous = %previous.module_id, "replacing module");
        }

        let module_id = self.next_module_id();
        let module = Module::new(module_id, subpath.clone()).with_errors(errors);

        if module.has_errors() {
            warn!(
                subpath = %subpath,
                errors = module.errors.len(),
                "module failed to parse; no code tree attached"
            );
        } else if let Some(code) = code {
            self.code_trees.insert(module_id, CodeTree::new(code));
        }

        debug!(subpath = %subpath, module = %module_id, locator = %module.locator, "module created");
        self.modules_by_subpath.insert(subpath, module_id);
        self.modules.insert(module_id, module);
        module_id
    }

    /// Create a module from a parser's outcome.
    pub fn create_module_from(
        &mut self,
        subpath: &str,
        outcome: Result<C, Vec<ParseError>>,
    ) -> ModuleId {
        match outcome {
            Ok(code) => self.create_module(subpath, Some(code), Vec::new()),
            Err(errors) => self.create_module(subpath, None, errors),
        }
    }

    /// Parse `source` with `parser` and register the result as a module.
    pub fn load_module<P>(&mut self, parser: &P, subpath: &str, source: &str) -> ModuleId
    where
        P: SourceParser<Tree = C>,
    {
        let outcome = parser.parse(subpath, source);
        self.create_module_from(subpath, outcome)
    }

    /// Associate `tree` with `module`, replacing any existing association.
    ///
    /// Returns the replaced tree.
    pub fn remember_code_tree(
        &mut self,
        tree: CodeTree<C>,
        module: ModuleId,
    ) -> StoreResult<Option<CodeTree<C>>> {
        let entry = self
            .modules
            .get(&module)
            .ok_or_else(|| StoreError::entity_not_found(module))?;
        if entry.has_errors() {
            return Err(StoreError::ModuleHasErrors {
                subpath: entry.subpath.clone(),
                count: entry.errors.len(),
            });
        }

        let previous = self.code_trees.insert(module, tree);
        if previous.is_some() {
            debug!(module = %module, "code tree replaced");
        }
        Ok(previous)
    }

    /// Remove the module at `subpath`, its code tree and every entity it owns.
    ///
    /// Returns the removed module, or `None` if nothing was registered there.
    pub fn remove_module(&mut self, subpath: &str) -> Option<Module> {
        let subpath = canonical_subpath(subpath, self.config.path_separator);
        let module_id = self.modules_by_subpath.remove(&subpath)?;

        self.code_trees.remove(&module_id);
        self.remove_owned_entities(module_id);
        let module = self.modules.remove(&module_id);

        debug!(subpath = %subpath, module = %module_id, "module removed");
        module
    }

    fn remove_owned_entities(&mut self, module: ModuleId) {
        let classes: BTreeSet<ClassId> = self
            .classes
            .values()
            .filter(|class| class.module == module)
            .map(|class| class.class_id)
            .collect();
        let test_classes: BTreeSet<TestClassId> = self
            .test_classes
            .values()
            .filter(|test_class| test_class.parent == module)
            .map(|test_class| test_class.test_class_id)
            .collect();

        let mut retired: Vec<EntityRef> = Vec::new();
        retired.extend(classes.iter().map(|&id| EntityRef::from(id)));
        retired.extend(
            self.methods
                .values()
                .filter(|method| classes.contains(&method.klass))
                .map(|method| EntityRef::from(method.method_id)),
        );
        retired.extend(
            self.functions
                .values()
                .filter(|function| function.module == module)
                .map(|function| EntityRef::from(function.function_id)),
        );
        retired.extend(test_classes.iter().map(|&id| EntityRef::from(id)));
        retired.extend(
            self.test_methods
                .values()
                .filter(|test_method| test_classes.contains(&test_method.parent))
                .map(|test_method| EntityRef::from(test_method.test_method_id)),
        );

        self.classes.retain(|_, class| class.module != module);
        self.methods.retain(|_, method| !classes.contains(&method.klass));
        self.functions.retain(|_, function| function.module != module);
        self.test_classes
            .retain(|_, test_class| test_class.parent != module);
        self.test_methods
            .retain(|_, test_method| !test_classes.contains(&test_method.parent));

        self.retired
            .extend(retired.into_iter().map(|entity| (entity, module)));
    }

    /// The module `entity` was removed with, if it was removed by
    /// [`Project::remove_module`].
    pub(crate) fn retired_owner(&self, entity: EntityRef) -> Option<ModuleId> {
        self.retired.get(&entity).copied()
    }

    // ========================================================================
    // Code Tree Association
    // ========================================================================

    /// The code tree associated with `module`.
    pub fn code_tree_of(&self, module: ModuleId) -> StoreResult<&CodeTree<C>> {
        self.code_trees
            .get(&module)
            .ok_or(StoreError::CodeTreeNotFound { module })
    }

    /// Mutable access to the code tree associated with `module`.
    pub fn code_tree_of_mut(&mut self, module: ModuleId) -> StoreResult<&mut CodeTree<C>> {
        self.code_trees
            .get_mut(&module)
            .ok_or(StoreError::CodeTreeNotFound { module })
    }

    /// True if `module` has a code tree.
    pub fn has_code_tree(&self, module: ModuleId) -> bool {
        self.code_trees.contains_key(&module)
    }

    // ========================================================================
    // Entity Construction
    // ========================================================================

    fn require_module(&self, module: ModuleId) -> StoreResult<&Module> {
        self.modules
            .get(&module)
            .ok_or_else(|| StoreError::entity_not_found(module))
    }

    /// Create a class owned by `module`. The class is not yet listed in the
    /// module's objects.
    pub fn new_class(&mut self, module: ModuleId, name: impl Into<String>) -> StoreResult<ClassId> {
        self.require_module(module)?;
        let class_id = self.next_class_id();
        self.classes
            .insert(class_id, Class::new(class_id, name, module));
        Ok(class_id)
    }

    /// Create a function owned by `module`.
    pub fn new_function(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
    ) -> StoreResult<FunctionId> {
        self.require_module(module)?;
        let function_id = self.next_function_id();
        self.functions
            .insert(function_id, Function::new(function_id, name, module));
        Ok(function_id)
    }

    /// Create a method owned by `klass`.
    pub fn new_method(&mut self, klass: ClassId, name: impl Into<String>) -> StoreResult<MethodId> {
        if !self.classes.contains_key(&klass) {
            return Err(StoreError::entity_not_found(klass));
        }
        let method_id = self.next_method_id();
        self.methods
            .insert(method_id, Method::new(method_id, name, klass));
        Ok(method_id)
    }

    /// Create a test class owned by `module`.
    pub fn new_test_class(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
    ) -> StoreResult<TestClassId> {
        self.require_module(module)?;
        let test_class_id = self.next_test_class_id();
        self.test_classes
            .insert(test_class_id, TestClass::new(test_class_id, name, module));
        Ok(test_class_id)
    }

    /// Create a test method owned by `test_class`.
    pub fn new_test_method(
        &mut self,
        test_class: TestClassId,
        name: impl Into<String>,
    ) -> StoreResult<TestMethodId> {
        if !self.test_classes.contains_key(&test_class) {
            return Err(StoreError::entity_not_found(test_class));
        }
        let test_method_id = self.next_test_method_id();
        self.test_methods.insert(
            test_method_id,
            TestMethod::new(test_method_id, name, test_class),
        );
        Ok(test_method_id)
    }

    /// Create a class and append it to the module's objects.
    pub fn declare_class(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
    ) -> StoreResult<ClassId> {
        let class_id = self.new_class(module, name)?;
        self.add_object(module, class_id)?;
        Ok(class_id)
    }

    /// Create a function and append it to the module's objects.
    pub fn declare_function(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
    ) -> StoreResult<FunctionId> {
        let function_id = self.new_function(module, name)?;
        self.add_object(module, function_id)?;
        Ok(function_id)
    }

    /// Create a method and append it to the class's methods.
    pub fn declare_method(
        &mut self,
        klass: ClassId,
        name: impl Into<String>,
    ) -> StoreResult<MethodId> {
        let method_id = self.new_method(klass, name)?;
        self.add_methods(klass, [method_id])?;
        Ok(method_id)
    }

    /// Set the base class expressions of `klass`.
    pub fn set_bases(&mut self, klass: ClassId, bases: Vec<String>) -> StoreResult<()> {
        let class = self
            .classes
            .get_mut(&klass)
            .ok_or_else(|| StoreError::entity_not_found(klass))?;
        class.bases = bases;
        Ok(())
    }

    /// Set the argument names of `function`.
    pub fn set_function_args(&mut self, function: FunctionId, args: Vec<String>) -> StoreResult<()> {
        let entry = self
            .functions
            .get_mut(&function)
            .ok_or_else(|| StoreError::entity_not_found(function))?;
        entry.args = args;
        Ok(())
    }

    /// Set the argument names of `method`.
    pub fn set_method_args(&mut self, method: MethodId, args: Vec<String>) -> StoreResult<()> {
        let entry = self
            .methods
            .get_mut(&method)
            .ok_or_else(|| StoreError::entity_not_found(method))?;
        entry.args = args;
        Ok(())
    }

    // ========================================================================
    // Attachment (append-only)
    // ========================================================================

    /// Append `objects` to the module's objects, in order.
    ///
    /// Every object must be live and owned by `module`; otherwise nothing is
    /// appended.
    pub fn add_objects<I, O>(&mut self, module: ModuleId, objects: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = O>,
        O: Into<ModuleObject>,
    {
        self.require_module(module)?;
        let objects: Vec<ModuleObject> = objects.into_iter().map(Into::into).collect();
        for object in &objects {
            let owner = self.owner_of_object(*object)?;
            if owner != module {
                return Err(StoreError::foreign_object(*object, module));
            }
        }

        debug!(module = %module, count = objects.len(), "objects added");
        if let Some(entry) = self.modules.get_mut(&module) {
            entry.push_objects(objects);
        }
        Ok(())
    }

    /// Append one object to the module's objects.
    pub fn add_object(
        &mut self,
        module: ModuleId,
        object: impl Into<ModuleObject>,
    ) -> StoreResult<()> {
        self.add_objects(module, [object.into()])
    }

    fn owner_of_object(&self, object: ModuleObject) -> StoreResult<ModuleId> {
        let owner = match object {
            ModuleObject::Class(id) => self.classes.get(&id).map(|class| class.module),
            ModuleObject::Function(id) => self.functions.get(&id).map(|function| function.module),
            ModuleObject::TestClass(id) => self.test_classes.get(&id).map(|tc| tc.parent),
        };
        owner.ok_or_else(|| StoreError::entity_not_found(object))
    }

    /// Append `methods` to the class's methods, in order.
    pub fn add_methods<I>(&mut self, klass: ClassId, methods: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = MethodId>,
    {
        if !self.classes.contains_key(&klass) {
            return Err(StoreError::entity_not_found(klass));
        }
        let methods: Vec<MethodId> = methods.into_iter().collect();
        for method in &methods {
            let entry = self
                .methods
                .get(method)
                .ok_or_else(|| StoreError::entity_not_found(*method))?;
            if entry.klass != klass {
                return Err(StoreError::foreign_object(*method, klass));
            }
        }

        if let Some(class) = self.classes.get_mut(&klass) {
            class.push_methods(methods);
        }
        Ok(())
    }

    /// Append `test_methods` to the test class's test cases, in order.
    pub fn add_test_cases<I>(&mut self, test_class: TestClassId, test_methods: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = TestMethodId>,
    {
        if !self.test_classes.contains_key(&test_class) {
            return Err(StoreError::entity_not_found(test_class));
        }
        let test_methods: Vec<TestMethodId> = test_methods.into_iter().collect();
        for test_method in &test_methods {
            let entry = self
                .test_methods
                .get(test_method)
                .ok_or_else(|| StoreError::entity_not_found(*test_method))?;
            if entry.parent != test_class {
                return Err(StoreError::foreign_object(*test_method, test_class));
            }
        }

        if let Some(entry) = self.test_classes.get_mut(&test_class) {
            entry.push_test_cases(test_methods);
        }
        Ok(())
    }

    /// Append imported module names to the module.
    pub fn add_imports<I, S>(&mut self, module: ModuleId, names: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .modules
            .get_mut(&module)
            .ok_or_else(|| StoreError::entity_not_found(module))?;
        entry.imports.extend(names.into_iter().map(Into::into));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Crate-internal mutation used by the test-case adder
    // ------------------------------------------------------------------------

    pub(crate) fn module_holding(&self, test_class: TestClassId) -> Option<ModuleId> {
        self.modules
            .values()
            .find(|module| module.test_cases().any(|id| id == test_class))
            .map(|module| module.module_id)
    }

    pub(crate) fn test_class_holding(&self, test_method: TestMethodId) -> Option<TestClassId> {
        self.test_classes
            .values()
            .find(|test_class| test_class.test_cases().contains(&test_method))
            .map(|test_class| test_class.test_class_id)
    }

    pub(crate) fn reparent_test_class(&mut self, test_class: TestClassId, module: ModuleId) {
        if let Some(entry) = self.test_classes.get_mut(&test_class) {
            entry.parent = module;
        }
    }

    pub(crate) fn reparent_test_method(&mut self, test_method: TestMethodId, test_class: TestClassId) {
        if let Some(entry) = self.test_methods.get_mut(&test_method) {
            entry.parent = test_class;
        }
    }

    /// True if `module`'s tree records a fragment for any of `entities`.
    pub(crate) fn holds_fragments(&self, module: ModuleId, entities: &[EntityRef]) -> bool {
        self.code_trees
            .get(&module)
            .is_some_and(|tree| entities.iter().any(|&entity| tree.contains(entity)))
    }

    /// Move the fragments of `entities` from `from`'s tree into `to`'s tree.
    ///
    /// Fragments already in `to` are replaced. Nothing moves if `to` has no
    /// tree; callers check that first.
    pub(crate) fn move_fragments(&mut self, from: ModuleId, to: ModuleId, entities: &[EntityRef]) {
        if from == to || !self.code_trees.contains_key(&to) {
            return;
        }
        let Some(source) = self.code_trees.get_mut(&from) else {
            return;
        };
        let moved: Vec<(EntityRef, C)> = entities
            .iter()
            .filter_map(|&entity| source.remove_object(entity).map(|code| (entity, code)))
            .collect();
        if moved.is_empty() {
            return;
        }
        if let Some(target) = self.code_trees.get_mut(&to) {
            for (entity, code) in moved {
                target.add_object(entity, code);
            }
        }
        debug!(from = %from, to = %to, "fragments moved");
    }

    pub(crate) fn mark_changed(&mut self, module: ModuleId) {
        if let Some(entry) = self.modules.get_mut(&module) {
            entry.mark_changed();
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Look up a module by ID.
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    /// Look up a class by ID.
    pub fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(&id)
    }

    /// Look up a function by ID.
    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(&id)
    }

    /// Look up a method by ID.
    pub fn method(&self, id: MethodId) -> Option<&Method> {
        self.methods.get(&id)
    }

    /// Look up a test class by ID.
    pub fn test_class(&self, id: TestClassId) -> Option<&TestClass> {
        self.test_classes.get(&id)
    }

    /// Look up a test method by ID.
    pub fn test_method(&self, id: TestMethodId) -> Option<&TestMethod> {
        self.test_methods.get(&id)
    }

    /// True if `entity` names a live entity.
    pub fn contains(&self, entity: impl Into<EntityRef>) -> bool {
        match entity.into() {
            EntityRef::Module(id) => self.modules.contains_key(&id),
            EntityRef::Class(id) => self.classes.contains_key(&id),
            EntityRef::Function(id) => self.functions.contains_key(&id),
            EntityRef::Method(id) => self.methods.contains_key(&id),
            EntityRef::TestClass(id) => self.test_classes.contains_key(&id),
            EntityRef::TestMethod(id) => self.test_methods.contains_key(&id),
        }
    }

    /// Name of an entity (the subpath for modules).
    pub fn name_of(&self, entity: impl Into<EntityRef>) -> StoreResult<&str> {
        let entity = entity.into();
        let name = match entity {
            EntityRef::Module(id) => self.modules.get(&id).map(|m| m.subpath.as_str()),
            EntityRef::Class(id) => self.classes.get(&id).map(|c| c.name.as_str()),
            EntityRef::Function(id) => self.functions.get(&id).map(|f| f.name.as_str()),
            EntityRef::Method(id) => self.methods.get(&id).map(|m| m.name.as_str()),
            EntityRef::TestClass(id) => self.test_classes.get(&id).map(|t| t.name.as_str()),
            EntityRef::TestMethod(id) => self.test_methods.get(&id).map(|t| t.name.as_str()),
        };
        name.ok_or(StoreError::EntityNotFound { entity })
    }

    /// Look up a module by subpath (any separator the config accepts).
    pub fn module_by_subpath(&self, subpath: &str) -> Option<&Module> {
        let subpath = canonical_subpath(subpath, self.config.path_separator);
        self.modules_by_subpath
            .get(&subpath)
            .and_then(|id| self.modules.get(id))
    }

    /// Look up a module by dotted locator.
    pub fn module_by_locator(&self, locator: &str) -> Option<&Module> {
        self.modules().find(|module| module.locator == locator)
    }

    /// Look up a module by subpath, falling back to its locator.
    pub fn find_module(&self, name: &str) -> StoreResult<&Module> {
        self.module_by_subpath(name)
            .or_else(|| self.module_by_locator(name))
            .ok_or_else(|| StoreError::module_not_found(name))
    }

    /// Look up a module by a path that includes the project root.
    ///
    /// Pure path arithmetic; the file system is not consulted.
    pub fn find_module_by_full_path(&self, path: &Path) -> StoreResult<&Module> {
        let not_found = || StoreError::module_not_found(path.display().to_string());
        let relative = path.strip_prefix(&self.config.root).map_err(|_| not_found())?;
        let subpath = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        self.modules_by_subpath
            .get(&subpath)
            .and_then(|id| self.modules.get(id))
            .ok_or_else(not_found)
    }

    /// The package module (`<dir>/__init__.py`) enclosing `module`, if any.
    pub fn package_of(&self, module: ModuleId) -> Option<ModuleId> {
        let subpath = &self.modules.get(&module)?.subpath;
        let (dir, file) = subpath.rsplit_once('/')?;
        let package_dir = if file == PACKAGE_INIT {
            dir.rsplit_once('/')?.0
        } else {
            dir
        };
        self.modules_by_subpath
            .get(&format!("{}/{}", package_dir, PACKAGE_INIT))
            .copied()
    }

    /// The method of `klass` named `name`.
    pub fn find_method_by_name(&self, klass: ClassId, name: &str) -> Option<MethodId> {
        self.classes
            .get(&klass)?
            .methods()
            .iter()
            .copied()
            .find(|id| self.methods.get(id).is_some_and(|method| method.name == name))
    }

    /// The test method of `test_class` named `name`.
    pub fn find_test_method_by_name(&self, test_class: TestClassId, name: &str) -> Option<TestMethodId> {
        self.test_classes
            .get(&test_class)?
            .test_cases()
            .iter()
            .copied()
            .find(|id| self.test_methods.get(id).is_some_and(|method| method.name == name))
    }

    /// The direct child of `module` named `name`.
    pub fn find_object_by_name(&self, module: ModuleId, name: &str) -> Option<ModuleObject> {
        self.modules
            .get(&module)?
            .objects()
            .iter()
            .copied()
            .find(|object| self.name_of(*object).is_ok_and(|found| found == name))
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Number of live modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All modules, sorted by subpath.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules_by_subpath
            .values()
            .filter_map(|id| self.modules.get(id))
    }

    /// All listed classes, by module then insertion order.
    pub fn iter_classes(&self) -> impl Iterator<Item = &Class> {
        self.modules()
            .flat_map(|module| module.classes())
            .filter_map(|id| self.classes.get(&id))
    }

    /// All listed functions, by module then insertion order.
    pub fn iter_functions(&self) -> impl Iterator<Item = &Function> {
        self.modules()
            .flat_map(|module| module.functions())
            .filter_map(|id| self.functions.get(&id))
    }

    /// All listed test classes, by module then insertion order.
    pub fn iter_test_classes(&self) -> impl Iterator<Item = &TestClass> {
        self.modules()
            .flat_map(|module| module.test_cases())
            .filter_map(|id| self.test_classes.get(&id))
    }

    /// Modules that list at least one test class.
    pub fn test_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules().filter(|module| module.has_test_cases())
    }

    /// Modules that received generated test code.
    pub fn changed_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules().filter(|module| module.is_changed())
    }
}

/// Locator a subpath would get in a project with `config`.
pub fn locator_in(config: &ProjectConfig, subpath: &str) -> String {
    locator_for(&canonical_subpath(subpath, config.path_separator))
}
