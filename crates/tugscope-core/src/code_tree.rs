//! Code trees: one parsed module plus per-entity fragments.
//!
//! A [`CodeTree`] wraps the parsed value of one module and records, for any
//! entity, the fragment of syntax that represents it. Both are of the same
//! opaque type `C`; nothing here inspects them.
//!
//! A code tree does not know which module it belongs to. The association is
//! held by the [`Project`], so removing a module removes its tree in one step
//! and "no tree" is an explicit error rather than an empty field.

use std::collections::BTreeMap;

use tracing::trace;

use crate::entity::{EntityRef, ModuleId};
use crate::error::{StoreError, StoreResult};
use crate::project::Project;

/// The parsed representation of one module and its entity fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTree<C> {
    code: C,
    fragments: BTreeMap<EntityRef, C>,
}

impl<C> CodeTree<C> {
    /// Wrap a parsed value.
    ///
    /// The value may be a sentinel (such as `()` or `None`) for trees built
    /// without a real parse.
    pub fn new(code: C) -> Self {
        CodeTree {
            code,
            fragments: BTreeMap::new(),
        }
    }

    /// The code tree associated with `module` in `project`.
    pub fn of(project: &Project<C>, module: ModuleId) -> StoreResult<&CodeTree<C>> {
        project.code_tree_of(module)
    }

    /// The wrapped parsed value.
    pub fn code(&self) -> &C {
        &self.code
    }

    /// Mutable access to the wrapped parsed value.
    pub fn code_mut(&mut self) -> &mut C {
        &mut self.code
    }

    /// Consume the tree and return the wrapped parsed value.
    pub fn into_code(self) -> C {
        self.code
    }

    /// Record the fragment for `entity`, replacing any previous one.
    ///
    /// Returns the replaced fragment.
    pub fn add_object(&mut self, entity: impl Into<EntityRef>, fragment: C) -> Option<C> {
        let entity = entity.into();
        let previous = self.fragments.insert(entity, fragment);
        trace!(%entity, replaced = previous.is_some(), "fragment recorded");
        previous
    }

    /// The fragment recorded for `entity`.
    pub fn get(&self, entity: impl Into<EntityRef>) -> StoreResult<&C> {
        let entity = entity.into();
        self.fragments
            .get(&entity)
            .ok_or(StoreError::FragmentNotFound { entity })
    }

    /// True if a fragment is recorded for `entity`.
    pub fn contains(&self, entity: impl Into<EntityRef>) -> bool {
        self.fragments.contains_key(&entity.into())
    }

    /// Forget the fragment for `entity`.
    pub fn remove_object(&mut self, entity: impl Into<EntityRef>) -> Option<C> {
        self.fragments.remove(&entity.into())
    }

    /// Number of recorded fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// True if no fragments are recorded.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Recorded fragments, ordered by entity.
    pub fn fragments(&self) -> impl Iterator<Item = (EntityRef, &C)> {
        self.fragments.iter().map(|(entity, code)| (*entity, code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ClassId, FunctionId, MethodId, TestClassId};

    #[test]
    fn wraps_sentinel_value() {
        let tree: CodeTree<Option<String>> = CodeTree::new(None);
        assert_eq!(tree.code(), &None);
        assert!(tree.is_empty());
    }

    #[test]
    fn get_returns_recorded_fragment() {
        let mut tree = CodeTree::new("module".to_string());
        tree.add_object(FunctionId::new(0), "def f(): pass".to_string());

        assert_eq!(tree.get(FunctionId::new(0)).unwrap(), "def f(): pass");
        assert!(tree.contains(FunctionId::new(0)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn missing_fragment_is_an_error() {
        let tree = CodeTree::new(0u8);
        let err = tree.get(MethodId::new(3)).unwrap_err();
        assert_eq!(
            err,
            StoreError::FragmentNotFound {
                entity: MethodId::new(3).into()
            }
        );
    }

    #[test]
    fn last_write_wins() {
        let mut tree = CodeTree::new(0);
        assert_eq!(tree.add_object(TestClassId::new(0), 1), None);
        assert_eq!(tree.add_object(TestClassId::new(0), 2), Some(1));
        assert_eq!(*tree.get(TestClassId::new(0)).unwrap(), 2);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn ids_of_different_kinds_do_not_collide() {
        let mut tree = CodeTree::new("");
        tree.add_object(ClassId::new(0), "class");
        tree.add_object(FunctionId::new(0), "function");

        assert_eq!(*tree.get(ClassId::new(0)).unwrap(), "class");
        assert_eq!(*tree.get(FunctionId::new(0)).unwrap(), "function");
    }

    #[test]
    fn remove_object_forgets_fragment() {
        let mut tree = CodeTree::new(());
        tree.add_object(ClassId::new(1), ());
        assert_eq!(tree.remove_object(ClassId::new(1)), Some(()));
        assert!(tree.get(ClassId::new(1)).is_err());
        assert_eq!(tree.remove_object(ClassId::new(1)), None);
    }

    #[test]
    fn fragments_iterate_in_entity_order() {
        let mut tree = CodeTree::new(0);
        tree.add_object(MethodId::new(1), 3);
        tree.add_object(ClassId::new(2), 2);
        tree.add_object(ClassId::new(0), 1);

        let order: Vec<_> = tree.fragments().map(|(entity, code)| (entity, *code)).collect();
        assert_eq!(
            order,
            vec![
                (EntityRef::from(ClassId::new(0)), 1),
                (EntityRef::from(ClassId::new(2)), 2),
                (EntityRef::from(MethodId::new(1)), 3),
            ]
        );
    }

    #[test]
    fn into_code_returns_root() {
        let mut tree = CodeTree::new(vec![1, 2]);
        tree.code_mut().push(3);
        assert_eq!(tree.into_code(), vec![1, 2, 3]);
    }
}
