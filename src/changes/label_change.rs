use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::ApplySnafu;
use crate::changes::{BaseChange, ChangeError, ChangeTrait};
use crate::tree::{IdPath, ROOT_ID, RootEntry};

/// Label put on the whole project history.
///
/// A global label affects every entry; a non-global one is a plain marker
/// that affects none. Neither touches the tree.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct PutLabelChange {
    label: String,
    timestamp: i64,
    is_global: bool,
}

impl PutLabelChange {
    pub fn new(timestamp: i64, label: impl Into<String>, is_global: bool) -> Self {
        PutLabelChange {
            label: label.into(),
            timestamp,
            is_global,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn is_global(&self) -> bool {
        self.is_global
    }
}

impl ChangeTrait for PutLabelChange {
    fn apply_to(&mut self, _tree: &mut RootEntry) -> Result<(), ChangeError> {
        Ok(())
    }

    fn revert_on(&self, _tree: &mut RootEntry) -> Result<(), ChangeError> {
        Ok(())
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        &[]
    }

    fn is_structural(&self) -> bool {
        false
    }

    fn affects(&self, _entry: &IdPath) -> bool {
        self.is_global
    }

    fn affects_only(&self, entry: &IdPath) -> bool {
        self.is_global && entry.leaf() == ROOT_ID
    }
}

/// Label put on one entry. It affects the entry and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct PutEntryLabelChange {
    base: BaseChange,
    label: String,
    timestamp: i64,
    is_global: bool,
}

impl PutEntryLabelChange {
    pub fn new(
        timestamp: i64,
        path: impl Into<String>,
        label: impl Into<String>,
        is_global: bool,
    ) -> Self {
        PutEntryLabelChange {
            base: BaseChange::new(path),
            label: label.into(),
            timestamp,
            is_global,
        }
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn is_global(&self) -> bool {
        self.is_global
    }
}

impl ChangeTrait for PutEntryLabelChange {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let id_path = tree.id_path(self.base.path()).context(ApplySnafu {
            path: self.base.path(),
        })?;
        self.base.record(vec![id_path]);
        Ok(())
    }

    fn revert_on(&self, _tree: &mut RootEntry) -> Result<(), ChangeError> {
        self.base.ensure_applied()
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        self.base.affected_id_paths()
    }

    fn is_structural(&self) -> bool {
        false
    }

    fn affects(&self, entry: &IdPath) -> bool {
        self.is_global
            || self
                .base
                .affected_id_paths()
                .iter()
                .any(|labeled| entry.starts_with(labeled))
    }

    fn affects_only(&self, entry: &IdPath) -> bool {
        if self.is_global {
            return entry.leaf() == ROOT_ID;
        }
        let paths = self.base.affected_id_paths();
        !paths.is_empty() && paths.iter().all(|labeled| labeled.contains(entry.leaf()))
    }
}
