use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::{ApplySnafu, RevertSnafu};
use crate::changes::{BaseChange, ChangeError, ChangeTrait};
use crate::tree::{IdPath, RootEntry, paths};

/// Moves an entry under another directory.
///
/// The footprint has two id paths, one through the old parent and one
/// through the new parent, so that history of either directory sees the move.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MoveChange {
    base: BaseChange,
    new_parent_path: String,
}

impl MoveChange {
    pub fn new(path: impl Into<String>, new_parent_path: impl Into<String>) -> Self {
        MoveChange {
            base: BaseChange::new(path),
            new_parent_path: new_parent_path.into(),
        }
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn new_parent_path(&self) -> &str {
        &self.new_parent_path
    }

    pub fn new_path(&self) -> String {
        paths::join(&self.new_parent_path, paths::name_of(self.base.path()))
    }
}

impl ChangeTrait for MoveChange {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let path = self.base.path();
        let old_id_path = tree.id_path(path).context(ApplySnafu { path })?;
        let new_id_path = tree
            .move_entry(path, &self.new_parent_path)
            .context(ApplySnafu { path })?;
        self.base.record(vec![old_id_path, new_id_path]);
        Ok(())
    }

    fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        self.base.ensure_applied()?;
        let old_parent_path = paths::parent_of(self.base.path());
        tree.move_entry(&self.new_path(), old_parent_path)
            .context(RevertSnafu {
                path: self.base.path(),
            })?;
        Ok(())
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        self.base.affected_id_paths()
    }
}
