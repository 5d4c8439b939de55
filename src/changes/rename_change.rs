use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::{ApplySnafu, RevertSnafu};
use crate::changes::{BaseChange, ChangeError, ChangeTrait};
use crate::tree::{IdPath, RootEntry, paths};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RenameChange {
    base: BaseChange,
    new_name: String,
}

impl RenameChange {
    pub fn new(path: impl Into<String>, new_name: impl Into<String>) -> Self {
        RenameChange {
            base: BaseChange::new(path),
            new_name: new_name.into(),
        }
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    /// Path of the entry after the rename.
    pub fn new_path(&self) -> String {
        paths::join(paths::parent_of(self.base.path()), &self.new_name)
    }
}

impl ChangeTrait for RenameChange {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let id_path = tree
            .rename(self.base.path(), &self.new_name)
            .context(ApplySnafu {
                path: self.base.path(),
            })?;
        self.base.record(vec![id_path]);
        Ok(())
    }

    fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        self.base.ensure_applied()?;
        let old_name = paths::name_of(self.base.path());
        tree.rename(&self.new_path(), old_name)
            .context(RevertSnafu {
                path: self.base.path(),
            })?;
        Ok(())
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        self.base.affected_id_paths()
    }
}
