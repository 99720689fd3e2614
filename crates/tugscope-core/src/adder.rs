//! Attaching generated tests to modules.
//!
//! A test generator builds [`TestClass`](crate::entity::TestClass) and
//! [`TestMethod`](crate::entity::TestMethod) entities and, optionally, the
//! code fragments that render them. The functions here place them in the
//! project:
//!
//! 1. The target must already have a code tree if a fragment is supplied, or
//!    if fragments recorded in another module have to follow the entity.
//!    This is checked before anything is mutated.
//! 2. The entity is reparented under the target and appended to its children,
//!    unless it is already listed there (regenerating a test keeps its slot).
//! 3. Fragments recorded for the entity (and, for a test class, its test
//!    methods) in the module it came from move to the target module's tree.
//! 4. The supplied fragment is recorded in the target module's tree,
//!    replacing any previous one.
//! 5. The target module is marked changed, as is the module that gave up
//!    fragments.
//!
//! An entity already listed under a different owner is rejected with
//! [`StoreError::ForeignObject`]. Only an entity no owner lists yet can move
//! to a new owner.

use tracing::debug;

use crate::entity::{EntityRef, ModuleId, TestClassId, TestMethodId};
use crate::error::{StoreError, StoreResult};
use crate::project::Project;
use crate::traversal::module_of;

/// Attach `test_class` to `module`, optionally recording its code.
pub fn add_test_case<C>(
    project: &mut Project<C>,
    module: ModuleId,
    test_class: TestClassId,
    fragment: Option<C>,
) -> StoreResult<()> {
    if project.module(module).is_none() {
        return Err(StoreError::entity_not_found(module));
    }
    let Some(entry) = project.test_class(test_class) else {
        return Err(StoreError::entity_not_found(test_class));
    };
    let holder = project.module_holding(test_class);
    if holder.is_some_and(|other| other != module) {
        return Err(StoreError::foreign_object(test_class, module));
    }

    let previous = entry.parent;
    let carried: Vec<EntityRef> = std::iter::once(EntityRef::from(test_class))
        .chain(entry.test_cases().iter().map(|&id| EntityRef::from(id)))
        .collect();
    let moves_fragments = previous != module && project.holds_fragments(previous, &carried);
    if (fragment.is_some() || moves_fragments) && !project.has_code_tree(module) {
        return Err(StoreError::CodeTreeNotFound { module });
    }

    project.reparent_test_class(test_class, module);
    if holder.is_none() {
        project.add_object(module, test_class)?;
    }
    if moves_fragments {
        project.move_fragments(previous, module, &carried);
        project.mark_changed(previous);
    }
    if let Some(fragment) = fragment {
        project.code_tree_of_mut(module)?.add_object(test_class, fragment);
    }
    project.mark_changed(module);

    debug!(module = %module, test_class = %test_class, "test case added");
    Ok(())
}

/// Attach `test_method` to `test_class`, optionally recording its code in
/// the test class's module.
pub fn add_test_method<C>(
    project: &mut Project<C>,
    test_class: TestClassId,
    test_method: TestMethodId,
    fragment: Option<C>,
) -> StoreResult<()> {
    let module = module_of(project, test_class)?;
    let holder = project.test_class_holding(test_method);
    if holder.is_some_and(|other| other != test_class) {
        return Err(StoreError::foreign_object(test_method, test_class));
    }

    let previous = module_of(project, test_method)?;
    let carried = [EntityRef::from(test_method)];
    let moves_fragments = previous != module && project.holds_fragments(previous, &carried);
    if (fragment.is_some() || moves_fragments) && !project.has_code_tree(module) {
        return Err(StoreError::CodeTreeNotFound { module });
    }

    project.reparent_test_method(test_method, test_class);
    if holder.is_none() {
        project.add_test_cases(test_class, [test_method])?;
    }
    if moves_fragments {
        project.move_fragments(previous, module, &carried);
        project.mark_changed(previous);
    }
    if let Some(fragment) = fragment {
        project
            .code_tree_of_mut(module)?
            .add_object(test_method, fragment);
    }
    project.mark_changed(module);

    debug!(test_class = %test_class, test_method = %test_method, "test method added");
    Ok(())
}

impl<C> Project<C> {
    /// Attach a generated test class. See [`add_test_case`].
    pub fn add_test_case(
        &mut self,
        module: ModuleId,
        test_class: TestClassId,
        fragment: Option<C>,
    ) -> StoreResult<()> {
        add_test_case(self, module, test_class, fragment)
    }

    /// Attach a generated test method. See [`add_test_method`].
    pub fn add_test_method(
        &mut self,
        test_class: TestClassId,
        test_method: TestMethodId,
        fragment: Option<C>,
    ) -> StoreResult<()> {
        add_test_method(self, test_class, test_method, fragment)
    }
}
