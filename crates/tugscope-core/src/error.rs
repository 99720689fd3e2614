//! Error types for the project model.
//!
//! Every lookup in the store fails explicitly. The taxonomy separates
//! "no source at all" from "source exists, this piece is missing":
//!
//! - [`StoreError::CodeTreeNotFound`]: the module has no code tree (never set,
//!   removed, or the module failed to parse); also reported for code lookups
//!   on entities removed along with their module
//! - [`StoreError::FragmentNotFound`]: the module has a code tree but nothing
//!   was recorded for the entity
//! - [`StoreError::EntityNotFound`]: an ID does not name a live entity
//!
//! Pipeline stages should treat the first two as "skip this module for this
//! stage" (see [`StoreError::is_missing_association`]), not as a failure of
//! the whole run.

use thiserror::Error;

use crate::entity::{EntityRef, ModuleId};

/// Errors produced by the project registry, code trees and traversals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The module has no code tree associated with it.
    #[error("no code tree associated with module {module}")]
    CodeTreeNotFound { module: ModuleId },

    /// The code tree exists but holds no fragment for the entity.
    #[error("code tree has no fragment for {entity}")]
    FragmentNotFound { entity: EntityRef },

    /// The ID does not name a live entity in this project.
    #[error("entity not found: {entity}")]
    EntityNotFound { entity: EntityRef },

    /// No module is registered under the given subpath or locator.
    #[error("module not found: {name}")]
    ModuleNotFound { name: String },

    /// A code tree was offered to a module that failed to parse.
    #[error("module {subpath} has {count} parse error(s) and cannot hold a code tree")]
    ModuleHasErrors { subpath: String, count: usize },

    /// An entity was attached under an owner it does not name.
    #[error("{entity} does not belong to {owner}")]
    ForeignObject { entity: EntityRef, owner: EntityRef },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Create an entity not found error.
    pub fn entity_not_found(entity: impl Into<EntityRef>) -> Self {
        StoreError::EntityNotFound {
            entity: entity.into(),
        }
    }

    /// Create a module not found error.
    pub fn module_not_found(name: impl Into<String>) -> Self {
        StoreError::ModuleNotFound { name: name.into() }
    }

    /// Create a foreign object error.
    pub fn foreign_object(entity: impl Into<EntityRef>, owner: impl Into<EntityRef>) -> Self {
        StoreError::ForeignObject {
            entity: entity.into(),
            owner: owner.into(),
        }
    }

    /// True for the two "code not available" conditions.
    ///
    /// Callers resolving code for rendering or insertion use this to skip a
    /// module rather than abort.
    pub fn is_missing_association(&self) -> bool {
        matches!(
            self,
            StoreError::CodeTreeNotFound { .. } | StoreError::FragmentNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ClassId, TestMethodId};

    #[test]
    fn missing_association_covers_tree_and_fragment() {
        let no_tree = StoreError::CodeTreeNotFound {
            module: ModuleId::new(0),
        };
        let no_fragment = StoreError::FragmentNotFound {
            entity: ClassId::new(1).into(),
        };
        assert!(no_tree.is_missing_association());
        assert!(no_fragment.is_missing_association());
        assert!(!StoreError::entity_not_found(ClassId::new(1)).is_missing_association());
        assert!(!StoreError::module_not_found("a.py").is_missing_association());
    }

    #[test]
    fn messages_name_the_entity() {
        let err = StoreError::FragmentNotFound {
            entity: TestMethodId::new(4).into(),
        };
        assert_eq!(err.to_string(), "code tree has no fragment for tmeth_4");

        let err = StoreError::foreign_object(ClassId::new(2), ModuleId::new(7));
        assert_eq!(err.to_string(), "cls_2 does not belong to mod_7");
    }

    #[test]
    fn module_has_errors_reports_count() {
        let err = StoreError::ModuleHasErrors {
            subpath: "pkg/broken.py".to_string(),
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "module pkg/broken.py has 2 parse error(s) and cannot hold a code tree"
        );
    }
}
