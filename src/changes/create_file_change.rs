use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::{ApplySnafu, RevertSnafu};
use crate::changes::{BaseChange, ChangeError, ChangeTrait};
use crate::content::Content;
use crate::tree::{EntryId, IdPath, RootEntry};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CreateFileChange {
    base: BaseChange,
    id: EntryId,
    content: Content,
    timestamp: i64,
}

impl CreateFileChange {
    pub fn new(id: EntryId, path: impl Into<String>, content: Content, timestamp: i64) -> Self {
        CreateFileChange {
            base: BaseChange::new(path),
            id,
            content,
            timestamp,
        }
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn content(&self) -> Content {
        self.content
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl ChangeTrait for CreateFileChange {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let id_path = tree
            .create_file(self.id, self.base.path(), self.content, self.timestamp)
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
    use crate::tree::ROOT_ID;

    #[test]
    fn apply_creates_file_and_records_id_path() {
        let mut tree = RootEntry::new();
        let mut change = CreateFileChange::new(EntryId(1), "file", Content::of(b"one"), 5);

        change.apply_to(&mut tree).unwrap();

        let entry = tree.get_entry("file").unwrap();
        assert_eq!(entry.content(), Some(Content::of(b"one")));
        assert_eq!(entry.timestamp(), Some(5));
        assert_eq!(
            change.affected_id_paths(),
            &[IdPath::from(vec![ROOT_ID, EntryId(1)])]
        );
        assert!(change.is_creational_for(EntryId(1)));
        assert!(!change.is_creational_for(ROOT_ID));
    }

    #[test]
    fn revert_removes_file_from_a_copy() {
        let mut tree = RootEntry::new();
        tree.create_directory(EntryId(0), "dir").unwrap();
        let before = tree.copy();
        let mut change = CreateFileChange::new(EntryId(1), "dir/file", Content::of(b"one"), 5);
        change.apply_to(&mut tree).unwrap();

        let mut copy = tree.copy();
        change.revert_on(&mut copy).unwrap();

        assert_eq!(copy, before);
        assert!(tree.has_entry("dir/file"));
    }

    #[test]
    fn apply_fails_on_existing_name() {
        let mut tree = RootEntry::new();
        CreateFileChange::new(EntryId(1), "file", Content::of(b"one"), 5)
            .apply_to(&mut tree)
            .unwrap();

        let mut duplicate = CreateFileChange::new(EntryId(2), "file", Content::of(b"two"), 6);
        let result = duplicate.apply_to(&mut tree);

        assert!(matches!(result, Err(ChangeError::ApplyError { .. })));
        assert!(duplicate.affected_id_paths().is_empty());
    }

    #[test]
    fn unapplied_change_cannot_be_reverted() {
        let mut tree = RootEntry::new();
        let change = CreateFileChange::new(EntryId(1), "file", Content::of(b"one"), 5);
        assert!(matches!(
            change.revert_on(&mut tree),
            Err(ChangeError::NotAppliedError { .. })
        ));
    }
}
