use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::{ApplySnafu, NotAppliedSnafu, RevertSnafu};
use crate::changes::{BaseChange, ChangeError, ChangeTrait};
use crate::content::Content;
use crate::tree::{Entry, IdPath, RootEntry, paths};

/// Deletes an entry and keeps the removed subtree for undeletion.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct DeleteChange {
    base: BaseChange,
    removed: Option<Entry>,
}

impl DeleteChange {
    pub fn new(path: impl Into<String>) -> Self {
        DeleteChange {
            base: BaseChange::new(path),
            removed: None,
        }
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn removed_entry(&self) -> Option<&Entry> {
        self.removed.as_ref()
    }
}

impl ChangeTrait for DeleteChange {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let path = self.base.path();
        let id_path = tree.id_path(path).context(ApplySnafu { path })?;
        let removed = tree.delete(path).context(ApplySnafu { path })?;

        self.removed = Some(removed);
        self.base.record(vec![id_path]);
        Ok(())
    }

    fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let path = self.base.path();
        let removed = self
            .removed
            .as_ref()
            .context(NotAppliedSnafu { path })?;
        tree.restore(paths::parent_of(path), removed.clone())
            .context(RevertSnafu { path })?;
        Ok(())
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        self.base.affected_id_paths()
    }

    fn contents_to_purge(&self) -> Vec<Content> {
        self.removed
            .as_ref()
            .map(Entry::collect_contents)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::EntryId;

    fn tree() -> RootEntry {
        let mut tree = RootEntry::new();
        tree.create_directory(EntryId(1), "dir").unwrap();
        tree.create_file(EntryId(2), "dir/a", Content::of(b"a"), 1)
            .unwrap();
        tree.create_file(EntryId(3), "dir/b", Content::of(b"b"), 1)
            .unwrap();
        tree
    }

    #[test]
    fn delete_round_trip_restores_subtree() {
        let mut tree = tree();
        let before = tree.copy();
        let mut change = DeleteChange::new("dir");

        change.apply_to(&mut tree).unwrap();
        assert!(!tree.has_entry("dir"));

        change.revert_on(&mut tree).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn purges_every_content_of_removed_subtree() {
        let mut tree = tree();
        let mut change = DeleteChange::new("dir");
        change.apply_to(&mut tree).unwrap();

        assert_eq!(
            change.contents_to_purge(),
            vec![Content::of(b"a"), Content::of(b"b")]
        );
    }

    #[test]
    fn deleting_missing_entry_fails() {
        let mut tree = tree();
        let mut change = DeleteChange::new("dir/missing");
        assert!(matches!(
            change.apply_to(&mut tree),
            Err(ChangeError::ApplyError { .. })
        ));
        assert!(change.removed_entry().is_none());
    }
}
