use bincode::{Decode, Encode};
use derive_more::{Display, From};

use crate::content::Content;

/// Stable identity of an entry, kept across renames and moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Encode, Decode)]
pub struct EntryId(pub i32);

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum EntryKind {
    File { content: Content, timestamp: i64 },
    /// Children are kept sorted by name.
    Directory { children: Vec<Entry> },
}

/// A file or directory node of the versioned tree.
///
/// An entry owns its children. The parent relation is not stored: it is the
/// directory a path walk came through.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Entry {
    id: EntryId,
    name: String,
    kind: EntryKind,
}

impl Entry {
    pub fn file(id: EntryId, name: impl Into<String>, content: Content, timestamp: i64) -> Self {
        Entry {
            id,
            name: name.into(),
            kind: EntryKind::File { content, timestamp },
        }
    }

    pub fn directory(id: EntryId, name: impl Into<String>) -> Self {
        Entry {
            id,
            name: name.into(),
            kind: EntryKind::Directory {
                children: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    pub fn content(&self) -> Option<Content> {
        match &self.kind {
            EntryKind::File { content, .. } => Some(*content),
            EntryKind::Directory { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Option<i64> {
        match &self.kind {
            EntryKind::File { timestamp, .. } => Some(*timestamp),
            EntryKind::Directory { .. } => None,
        }
    }

    /// Children of a directory, empty for files.
    pub fn children(&self) -> &[Entry] {
        match &self.kind {
            EntryKind::Directory { children } => children,
            EntryKind::File { .. } => &[],
        }
    }

    pub fn find_child(&self, name: &str) -> Option<&Entry> {
        let children = self.children();
        children
            .binary_search_by(|child| child.name.as_str().cmp(name))
            .ok()
            .map(|index| &children[index])
    }

    /// Contents of every file in this subtree, depth first.
    pub fn collect_contents(&self) -> Vec<Content> {
        let mut contents = Vec::new();
        self.collect_contents_into(&mut contents);
        contents
    }

    fn collect_contents_into(&self, contents: &mut Vec<Content>) {
        match &self.kind {
            EntryKind::File { content, .. } => contents.push(*content),
            EntryKind::Directory { children } => {
                for child in children {
                    child.collect_contents_into(contents);
                }
            }
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EntryKind {
        &mut self.kind
    }

    pub(crate) fn find_child_mut(&mut self, name: &str) -> Option<&mut Entry> {
        match &mut self.kind {
            EntryKind::Directory { children } => {
                let index = children
                    .binary_search_by(|child| child.name.as_str().cmp(name))
                    .ok()?;
                Some(&mut children[index])
            }
            EntryKind::File { .. } => None,
        }
    }

    /// Inserts a child at its sorted position. Hands the child back when the
    /// name is taken or this entry is a file.
    pub(crate) fn insert_child(&mut self, child: Entry) -> Result<(), Entry> {
        match &mut self.kind {
            EntryKind::Directory { children } => {
                match children.binary_search_by(|c| c.name.as_str().cmp(&child.name)) {
                    Ok(_) => Err(child),
                    Err(index) => {
                        children.insert(index, child);
                        Ok(())
                    }
                }
            }
            EntryKind::File { .. } => Err(child),
        }
    }

    pub(crate) fn remove_child(&mut self, name: &str) -> Option<Entry> {
        match &mut self.kind {
            EntryKind::Directory { children } => {
                let index = children
                    .binary_search_by(|child| child.name.as_str().cmp(name))
                    .ok()?;
                Some(children.remove(index))
            }
            EntryKind::File { .. } => None,
        }
    }
}
