use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::{ApplySnafu, RevertSnafu};
use crate::changes::{BaseChange, ChangeError, ChangeTrait};
use crate::tree::{EntryId, IdPath, RootEntry};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CreateDirectoryChange {
    base: BaseChange,
    id: EntryId,
}

impl CreateDirectoryChange {
    pub fn new(id: EntryId, path: impl Into<String>) -> Self {
        CreateDirectoryChange {
            base: BaseChange::new(path),
            id,
        }
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn id(&self) -> EntryId {
        self.id
    }
}

impl ChangeTrait for CreateDirectoryChange {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let id_path = tree
            .create_directory(self.id, self.base.path())
            .context(ApplySnafu {
                path: self.base.path(),
            })?;
        self.base.record(vec![id_path]);
        Ok(())
    }

    fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        self.base.ensure_applied()?;
        tree.delete(self.base.path()).context(RevertSnafu {
            path: self.base.path(),
        })?;
        Ok(())
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        self.base.affected_id_paths()
    }

    fn is_creational_for(&self, id: EntryId) -> bool {
        self.base
            .affected_id_paths()
            .iter()
            .any(|path| path.leaf() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_then_revert_restores_tree() {
        let mut tree = RootEntry::new();
        let before = tree.copy();
        let mut change = CreateDirectoryChange::new(EntryId(1), "dir");

        change.apply_to(&mut tree).unwrap();
        assert!(tree.get_entry("dir").unwrap().is_directory());

        change.revert_on(&mut tree).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn apply_fails_under_missing_parent() {
        let mut tree = RootEntry::new();
        let mut change = CreateDirectoryChange::new(EntryId(1), "missing/dir");
        assert!(change.apply_to(&mut tree).is_err());
        assert!(!change.is_creational_for(EntryId(1)));
    }
}
