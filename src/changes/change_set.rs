use bincode::{Decode, Encode};

use crate::changes::{Change, ChangeError, ChangeTrait};
use crate::content::Content;
use crate::tree::{EntryId, IdPath, RootEntry};

/// Changes recorded together as one logical commit.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ChangeSet {
    timestamp: i64,
    name: Option<String>,
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new(timestamp: i64, changes: Vec<Change>) -> Self {
        ChangeSet {
            timestamp,
            name: None,
            changes,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Applies the changes in order. Stops at the first failure and leaves
    /// the changes applied so far in place.
    pub fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        for change in &mut self.changes {
            change.apply_to(tree)?;
        }
        Ok(())
    }

    pub fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        for change in self.changes.iter().rev() {
            change.revert_on(tree)?;
        }
        Ok(())
    }

    pub fn affects(&self, entry: &IdPath) -> bool {
        self.changes.iter().any(|change| change.affects(entry))
    }

    pub fn is_creational_for(&self, id: EntryId) -> bool {
        self.changes.iter().any(|change| change.is_creational_for(id))
    }

    pub fn contents_to_purge(&self) -> Vec<Content> {
        self.changes
            .iter()
            .flat_map(|change| change.contents_to_purge())
            .collect()
    }
}
