use std::fmt;

use bincode::{Decode, Encode};
use derive_more::From;
use snafu::Snafu;

use crate::changes::{
    ChangeFileContentChange, CreateDirectoryChange, CreateFileChange, DeleteChange, MoveChange,
    PutEntryLabelChange, PutLabelChange, RenameChange,
};
use crate::content::Content;
use crate::tree::{EntryId, IdPath, RootEntry, TreeError};

/// Behaviour shared by all change variants.
pub trait ChangeTrait {
    /// Mutates the tree and records what is needed to revert the change.
    /// Applying the same change twice is not supported.
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError>;

    /// Undoes the change on a tree that is in the post-apply state. The tree
    /// does not have to be the one the change was applied to.
    fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError>;

    /// Id paths captured by `apply_to`. Empty before the change is applied.
    fn affected_id_paths(&self) -> &[IdPath];

    fn is_creational_for(&self, _id: EntryId) -> bool {
        false
    }

    /// Contents nothing else refers to once this change is purged.
    fn contents_to_purge(&self) -> Vec<Content> {
        Vec::new()
    }

    /// Label changes mark the history without touching the tree.
    fn is_structural(&self) -> bool {
        true
    }

    fn affects(&self, entry: &IdPath) -> bool {
        self.affected_id_paths()
            .iter()
            .any(|path| path.contains(entry.leaf()))
    }

    /// True when the whole footprint lies inside the subtree of `entry`.
    fn affects_only(&self, entry: &IdPath) -> bool {
        let paths = self.affected_id_paths();
        !paths.is_empty() && paths.iter().all(|path| path.contains(entry.leaf()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, From, Encode, Decode)]
pub enum Change {
    CreateFile(CreateFileChange),
    CreateDirectory(CreateDirectoryChange),
    ChangeFileContent(ChangeFileContentChange),
    Rename(RenameChange),
    Move(MoveChange),
    Delete(DeleteChange),
    PutEntryLabel(PutEntryLabelChange),
    PutLabel(PutLabelChange),
}

impl Change {
    fn as_trait(&self) -> &dyn ChangeTrait {
        match self {
            Change::CreateFile(change) => change,
            Change::CreateDirectory(change) => change,
            Change::ChangeFileContent(change) => change,
            Change::Rename(change) => change,
            Change::Move(change) => change,
            Change::Delete(change) => change,
            Change::PutEntryLabel(change) => change,
            Change::PutLabel(change) => change,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ChangeTrait {
        match self {
            Change::CreateFile(change) => change,
            Change::CreateDirectory(change) => change,
            Change::ChangeFileContent(change) => change,
            Change::Rename(change) => change,
            Change::Move(change) => change,
            Change::Delete(change) => change,
            Change::PutEntryLabel(change) => change,
            Change::PutLabel(change) => change,
        }
    }

    /// Two structural changes are linked when one of them touches an entry
    /// on the id path of the other, or below it.
    pub fn affects_same_as(&self, other: &Change) -> bool {
        if !self.is_structural() || !other.is_structural() {
            return false;
        }
        self.affected_id_paths().iter().any(|mine| {
            other
                .affected_id_paths()
                .iter()
                .any(|theirs| mine.is_child_or_parent_of(theirs))
        })
    }
}

impl ChangeTrait for Change {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        self.as_trait_mut().apply_to(tree)
    }

    fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        self.as_trait().revert_on(tree)
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        self.as_trait().affected_id_paths()
    }

    fn is_creational_for(&self, id: EntryId) -> bool {
        self.as_trait().is_creational_for(id)
    }

    fn contents_to_purge(&self) -> Vec<Content> {
        self.as_trait().contents_to_purge()
    }

    fn is_structural(&self) -> bool {
        self.as_trait().is_structural()
    }

    fn affects(&self, entry: &IdPath) -> bool {
        self.as_trait().affects(entry)
    }

    fn affects_only(&self, entry: &IdPath) -> bool {
        self.as_trait().affects_only(entry)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::CreateFile(c) => write!(f, "create file {}", c.path()),
            Change::CreateDirectory(c) => write!(f, "create directory {}", c.path()),
            Change::ChangeFileContent(c) => write!(f, "change content of {}", c.path()),
            Change::Rename(c) => write!(f, "rename {} to {}", c.path(), c.new_name()),
            Change::Move(c) => write!(f, "move {} to '{}'", c.path(), c.new_parent_path()),
            Change::Delete(c) => write!(f, "delete {}", c.path()),
            Change::PutEntryLabel(c) => write!(f, "label {} as '{}'", c.path(), c.label()),
            Change::PutLabel(c) => write!(f, "label '{}'", c.label()),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChangeError {
    #[snafu(display("Failed to apply change to '{}'", path))]
    ApplyError { path: String, source: TreeError },
    #[snafu(display("Failed to revert change on '{}'", path))]
    RevertError { path: String, source: TreeError },
    #[snafu(display("Change on '{}' was never applied", path))]
    NotAppliedError { path: String },
}
