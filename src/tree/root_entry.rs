use std::mem;

use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::content::Content;
use crate::tree::paths;
use crate::tree::{Entry, EntryId, EntryKind, IdPath};

/// Reserved id of the root directory.
pub const ROOT_ID: EntryId = EntryId(-1);

/// Owner of the whole entry tree.
///
/// Every mutation addresses entries by path and fails without touching the
/// tree when the path is missing or the target name is taken.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct RootEntry {
    root: Entry,
}

impl Default for RootEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl RootEntry {
    pub fn new() -> Self {
        RootEntry {
            root: Entry::directory(ROOT_ID, ""),
        }
    }

    pub fn root(&self) -> &Entry {
        &self.root
    }

    /// Snapshot that is independent of later mutations of `self`.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn find_entry(&self, path: &str) -> Option<&Entry> {
        paths::segments(path).try_fold(&self.root, |entry, name| entry.find_child(name))
    }

    pub fn get_entry(&self, path: &str) -> Result<&Entry, TreeError> {
        self.find_entry(path).context(EntryNotFoundSnafu { path })
    }

    pub fn has_entry(&self, path: &str) -> bool {
        self.find_entry(path).is_some()
    }

    pub fn id_path(&self, path: &str) -> Result<IdPath, TreeError> {
        let mut ids = vec![ROOT_ID];
        let mut current = &self.root;
        for name in paths::segments(path) {
            current = current
                .find_child(name)
                .context(EntryNotFoundSnafu { path })?;
            ids.push(current.id());
        }
        Ok(IdPath::from(ids))
    }

    /// Current id path of the entry with the given id, wherever it lives now.
    pub fn id_path_of(&self, id: EntryId) -> Option<IdPath> {
        self.trail_to(id)
            .map(|trail| IdPath::from(trail.iter().map(|e| e.id()).collect::<Vec<_>>()))
    }

    /// Current textual path of the entry with the given id.
    pub fn path_of(&self, id: EntryId) -> Option<String> {
        self.trail_to(id).map(|trail| {
            trail
                .iter()
                .skip(1)
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join("/")
        })
    }

    pub fn create_file(
        &mut self,
        id: EntryId,
        path: &str,
        content: Content,
        timestamp: i64,
    ) -> Result<IdPath, TreeError> {
        let (parent, name) = paths::split_parent(path).context(RootModificationSnafu {
            operation: "created",
        })?;
        self.add_child(parent, Entry::file(id, name, content, timestamp))
    }

    pub fn create_directory(&mut self, id: EntryId, path: &str) -> Result<IdPath, TreeError> {
        let (parent, name) = paths::split_parent(path).context(RootModificationSnafu {
            operation: "created",
        })?;
        self.add_child(parent, Entry::directory(id, name))
    }

    /// Replaces the content of a file and returns the previous content and
    /// timestamp.
    pub fn change_file_content(
        &mut self,
        path: &str,
        content: Content,
        timestamp: i64,
    ) -> Result<(Content, i64), TreeError> {
        let entry = self
            .find_entry_mut(path)
            .context(EntryNotFoundSnafu { path })?;
        match entry.kind_mut() {
            EntryKind::File {
                content: current_content,
                timestamp: current_timestamp,
            } => Ok((
                mem::replace(current_content, content),
                mem::replace(current_timestamp, timestamp),
            )),
            EntryKind::Directory { .. } => NotAFileSnafu { path }.fail(),
        }
    }

    /// Renames an entry in place and returns its id path.
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<IdPath, TreeError> {
        let (parent_path, old_name) = paths::split_parent(path).context(RootModificationSnafu {
            operation: "renamed",
        })?;
        ensure!(
            paths::is_valid_name(new_name),
            InvalidNameSnafu { name: new_name }
        );
        ensure!(self.has_entry(path), EntryNotFoundSnafu { path });

        let new_path = paths::join(parent_path, new_name);
        if old_name == new_name {
            return self.id_path(&new_path);
        }
        ensure!(
            !self.has_entry(&new_path),
            EntryAlreadyExistsSnafu { path: &new_path }
        );

        let parent = self.directory_mut(parent_path)?;
        let mut entry = parent
            .remove_child(old_name)
            .context(EntryNotFoundSnafu { path })?;
        entry.set_name(new_name);
        parent
            .insert_child(entry)
            .map_err(|_| EntryAlreadyExistsSnafu { path: &new_path }.build())?;

        self.id_path(&new_path)
    }

    /// Moves an entry under a new parent directory and returns its new id
    /// path.
    pub fn move_entry(&mut self, path: &str, new_parent_path: &str) -> Result<IdPath, TreeError> {
        let (old_parent_path, name) = paths::split_parent(path).context(RootModificationSnafu {
            operation: "moved",
        })?;
        let moved_id = self.get_entry(path)?.id();

        let target = self.id_path(new_parent_path)?;
        ensure!(
            !target.contains(moved_id),
            MoveIntoDescendantSnafu {
                path,
                new_parent_path
            }
        );
        ensure!(
            self.get_entry(new_parent_path)?.is_directory(),
            NotADirectorySnafu {
                path: new_parent_path
            }
        );

        let new_path = paths::join(new_parent_path, name);
        if paths::segments(old_parent_path).eq(paths::segments(new_parent_path)) {
            return self.id_path(&new_path);
        }
        ensure!(
            !self.has_entry(&new_path),
            EntryAlreadyExistsSnafu { path: &new_path }
        );

        let entry = self
            .directory_mut(old_parent_path)?
            .remove_child(name)
            .context(EntryNotFoundSnafu { path })?;
        self.add_child(new_parent_path, entry)
    }

    /// Removes an entry with its whole subtree and hands it back.
    pub fn delete(&mut self, path: &str) -> Result<Entry, TreeError> {
        let (parent_path, name) = paths::split_parent(path).context(RootModificationSnafu {
            operation: "deleted",
        })?;
        self.find_entry_mut(parent_path)
            .and_then(|parent| parent.remove_child(name))
            .context(EntryNotFoundSnafu { path })
    }

    /// Puts a previously deleted subtree back under `parent_path`.
    pub fn restore(&mut self, parent_path: &str, entry: Entry) -> Result<IdPath, TreeError> {
        self.add_child(parent_path, entry)
    }

    fn add_child(&mut self, parent_path: &str, entry: Entry) -> Result<IdPath, TreeError> {
        ensure!(
            paths::is_valid_name(entry.name()),
            InvalidNameSnafu { name: entry.name() }
        );
        let path = paths::join(parent_path, entry.name());
        self.directory_mut(parent_path)?
            .insert_child(entry)
            .map_err(|_| EntryAlreadyExistsSnafu { path: &path }.build())?;
        self.id_path(&path)
    }

    fn find_entry_mut(&mut self, path: &str) -> Option<&mut Entry> {
        let mut current = &mut self.root;
        for name in paths::segments(path) {
            current = current.find_child_mut(name)?;
        }
        Some(current)
    }

    fn directory_mut(&mut self, path: &str) -> Result<&mut Entry, TreeError> {
        let entry = self
            .find_entry_mut(path)
            .context(EntryNotFoundSnafu { path })?;
        ensure!(entry.is_directory(), NotADirectorySnafu { path });
        Ok(entry)
    }

    fn trail_to(&self, id: EntryId) -> Option<Vec<&Entry>> {
        fn walk<'a>(entry: &'a Entry, id: EntryId, trail: &mut Vec<&'a Entry>) -> bool {
            trail.push(entry);
            if entry.id() == id || entry.children().iter().any(|c| walk(c, id, trail)) {
                return true;
            }
            trail.pop();
            false
        }

        let mut trail = Vec::new();
        walk(&self.root, id, &mut trail).then_some(trail)
    }
}

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display("Entry '{}' does not exist", path))]
    EntryNotFoundError { path: String },
    #[snafu(display("Entry '{}' already exists", path))]
    EntryAlreadyExistsError { path: String },
    #[snafu(display("Entry '{}' is not a directory", path))]
    NotADirectoryError { path: String },
    #[snafu(display("Entry '{}' is not a file", path))]
    NotAFileError { path: String },
    #[snafu(display("Cannot move '{}' into its own subtree '{}'", path, new_parent_path))]
    MoveIntoDescendantError {
        path: String,
        new_parent_path: String,
    },
    #[snafu(display("'{}' is not a valid entry name", name))]
    InvalidNameError { name: String },
    #[snafu(display("The root entry cannot be {}", operation))]
    RootModificationError { operation: &'static str },
}
