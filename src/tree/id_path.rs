use std::fmt;

use bincode::{Decode, Encode};

use crate::tree::EntryId;
use crate::tree::ROOT_ID;

/// Root-to-entry sequence of ids.
///
/// Unlike a textual path, an id path keeps identifying the same entries when
/// they are renamed. Moving an entry changes the ancestors in its id path but
/// never the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub struct IdPath {
    ids: Vec<EntryId>,
}

impl IdPath {
    pub fn root() -> Self {
        IdPath { ids: vec![ROOT_ID] }
    }

    pub fn appended_with(&self, id: EntryId) -> Self {
        let mut ids = self.ids.clone();
        ids.push(id);
        IdPath { ids }
    }

    /// Id of the entry this path points at.
    pub fn leaf(&self) -> EntryId {
        self.ids.last().copied().unwrap_or(ROOT_ID)
    }

    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.ids.contains(&id)
    }

    /// True when `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &IdPath) -> bool {
        self.ids.starts_with(&prefix.ids)
    }

    pub fn is_child_or_parent_of(&self, other: &IdPath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl From<Vec<EntryId>> for IdPath {
    fn from(ids: Vec<EntryId>) -> Self {
        IdPath { ids }
    }
}

impl fmt::Display for IdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");
        write!(f, "{rendered}")
    }
}
