//! Owner resolution and code lookup for any entity.
//!
//! [`module_of`] walks the back-references of an entity up to the module
//! that contains it:
//!
//! | Entity | Module |
//! |--------|--------|
//! | Module | itself |
//! | Class, Function | `module` |
//! | Method | `module_of(klass)` |
//! | TestClass | `parent` |
//! | TestMethod | `module_of(parent)` |
//!
//! [`code_of`] resolves the module, then its code tree, then either the tree's
//! root (for a module) or the entity's fragment.
//!
//! A module ID resolves to itself without a liveness check, so asking for the
//! code of a removed module reports the missing tree. The same holds for the
//! code of an entity that was removed along with its module: [`module_of`]
//! reports it as gone, but [`code_of`] reports the removed module's missing
//! tree.

use crate::entity::{EntityRef, ModuleId};
use crate::error::{StoreError, StoreResult};
use crate::project::Project;

/// The module that contains `entity`.
pub fn module_of<C>(project: &Project<C>, entity: impl Into<EntityRef>) -> StoreResult<ModuleId> {
    let entity = entity.into();
    let missing = || StoreError::EntityNotFound { entity };
    match entity {
        EntityRef::Module(id) => Ok(id),
        EntityRef::Class(id) => project.class(id).map(|class| class.module).ok_or_else(missing),
        EntityRef::Function(id) => project
            .function(id)
            .map(|function| function.module)
            .ok_or_else(missing),
        EntityRef::Method(id) => {
            let method = project.method(id).ok_or_else(missing)?;
            module_of(project, method.klass)
        }
        EntityRef::TestClass(id) => project
            .test_class(id)
            .map(|test_class| test_class.parent)
            .ok_or_else(missing),
        EntityRef::TestMethod(id) => {
            let test_method = project.test_method(id).ok_or_else(missing)?;
            module_of(project, test_method.parent)
        }
    }
}

/// The code representing `entity`.
///
/// For a module this is the root of its code tree; for anything else it is
/// the fragment recorded for the entity in its module's tree.
pub fn code_of<C>(project: &Project<C>, entity: impl Into<EntityRef>) -> StoreResult<&C> {
    let entity = entity.into();
    let module = match module_of(project, entity) {
        Ok(module) => module,
        Err(err) => match project.retired_owner(entity) {
            Some(module) => return Err(StoreError::CodeTreeNotFound { module }),
            None => return Err(err),
        },
    };
    let tree = project.code_tree_of(module)?;
    match entity {
        EntityRef::Module(_) => Ok(tree.code()),
        _ => tree.get(entity),
    }
}

impl<C> Project<C> {
    /// The module that contains `entity`. See [`module_of`].
    pub fn module_of(&self, entity: impl Into<EntityRef>) -> StoreResult<ModuleId> {
        module_of(self, entity)
    }

    /// The code representing `entity`. See [`code_of`].
    pub fn code_of(&self, entity: impl Into<EntityRef>) -> StoreResult<&C> {
        code_of(self, entity)
    }
}
