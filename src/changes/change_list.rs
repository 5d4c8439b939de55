use std::ptr;

use bincode::{Decode, Encode};
use snafu::prelude::*;
use tracing::debug;

use crate::changes::{Change, ChangeError, ChangeSet, ChangeTrait};
use crate::content::Content;
use crate::tree::{EntryId, RootEntry, TreeError};

/// Chronological log of change sets.
///
/// Sets are stored oldest first and exposed newest first. Changes are
/// identified by reference, so the `&Change` arguments must come from this
/// list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct ChangeList {
    change_sets: Vec<ChangeSet>,
}

impl ChangeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an already applied change set as the newest one.
    pub fn add_change_set(&mut self, change_set: ChangeSet) -> Result<&ChangeSet, ChangeListError> {
        self.ensure_can_add(&change_set)?;
        self.change_sets.push(change_set);
        Ok(&self.change_sets[self.change_sets.len() - 1])
    }

    /// Applies the change set to `tree` and records it.
    pub fn apply_and_add(
        &mut self,
        tree: &mut RootEntry,
        mut change_set: ChangeSet,
    ) -> Result<&ChangeSet, ChangeListError> {
        self.ensure_can_add(&change_set)?;
        change_set.apply_to(tree).context(ApplyChangeSetSnafu)?;
        self.add_change_set(change_set)
    }

    /// Newest first.
    pub fn change_sets(&self) -> impl DoubleEndedIterator<Item = &ChangeSet> {
        self.change_sets.iter().rev()
    }

    /// Every recorded change, oldest first.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.change_sets.iter().flat_map(|set| set.changes())
    }

    pub fn len(&self) -> usize {
        self.change_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_sets.is_empty()
    }

    pub fn latest_timestamp(&self) -> Option<i64> {
        self.change_sets.last().map(ChangeSet::timestamp)
    }

    /// Tells whether `after` depends on `before` through a chain of changes
    /// touching the same entries.
    ///
    /// Starting from `before`, every later change linked to the chain joins
    /// it. `after` belongs to the chain when it joined it or when it is
    /// linked to any member, so a later move can pull an earlier change into
    /// the chain of its destination directory.
    pub fn is_in_the_chain(&self, before: &Change, after: &Change) -> Result<bool, ChangeListError> {
        let changes = self.changes().collect::<Vec<_>>();
        let start = Self::position_in(&changes, before)?;
        let end = Self::position_in(&changes, after)?;
        if end < start {
            return Ok(false);
        }

        let mut chain = vec![before];
        for &change in &changes[start + 1..] {
            if chain.iter().any(|linked| change.affects_same_as(linked)) {
                chain.push(change);
            }
        }

        Ok(chain.iter().any(|linked| ptr::eq(*linked, after))
            || chain.iter().any(|linked| after.affects_same_as(linked)))
    }

    /// Reverts changes on `tree` from the newest one back to `target`.
    ///
    /// `target` itself is reverted only when `include_target` is set. The
    /// tree is expected to reflect the state after the newest change.
    pub fn revert_up_to(
        &self,
        tree: &mut RootEntry,
        target: &Change,
        include_target: bool,
    ) -> Result<(), ChangeListError> {
        if self.is_empty() {
            return Ok(());
        }
        Self::position_in(&self.changes().collect::<Vec<_>>(), target)?;

        for change_set in self.change_sets() {
            for change in change_set.changes().iter().rev() {
                let is_target = ptr::eq(change, target);
                if is_target && !include_target {
                    return Ok(());
                }
                change.revert_on(tree).context(RevertChangesSnafu)?;
                if is_target {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Drops the oldest change sets stamped strictly before `timestamp`.
    ///
    /// Scanning stops at the first set that is not older than the threshold.
    /// Returns the contents the dropped sets were keeping alive, oldest set
    /// first and in apply order within a set.
    pub fn purge_up_to(&mut self, timestamp: i64) -> Vec<Content> {
        let count = self
            .change_sets
            .iter()
            .take_while(|change_set| change_set.timestamp() < timestamp)
            .count();

        let contents = self
            .change_sets
            .drain(..count)
            .flat_map(|change_set| change_set.contents_to_purge())
            .collect::<Vec<_>>();

        debug!(
            "Purged {} change sets older than {}, {} contents reclaimable",
            count,
            timestamp,
            contents.len()
        );
        contents
    }

    /// Change sets that affected the entry at `path`, newest first, down to
    /// the one that created it.
    ///
    /// The entry is followed by id on a reverted copy of `tree`, so renames
    /// and moves do not break its history.
    pub fn change_sets_for(
        &self,
        tree: &RootEntry,
        path: &str,
    ) -> Result<Vec<&ChangeSet>, ChangeListError> {
        let mut copy = tree.copy();
        let id = copy.id_path(path).context(EntryLookupSnafu)?.leaf();

        let mut result = Vec::new();
        for change_set in self.change_sets() {
            let entry = copy.id_path_of(id).context(LostEntrySnafu { id })?;
            if change_set.affects(&entry) {
                result.push(change_set);
            }
            if change_set.is_creational_for(id) {
                break;
            }
            change_set
                .revert_on(&mut copy)
                .context(RevertChangesSnafu)?;
        }
        Ok(result)
    }

    fn ensure_can_add(&self, change_set: &ChangeSet) -> Result<(), ChangeListError> {
        ensure!(!change_set.changes().is_empty(), EmptyChangeSetSnafu);
        if let Some(latest) = self.latest_timestamp() {
            ensure!(
                change_set.timestamp() >= latest,
                NonMonotonicTimestampSnafu {
                    timestamp: change_set.timestamp(),
                    latest
                }
            );
        }
        Ok(())
    }

    fn position_in(changes: &[&Change], change: &Change) -> Result<usize, ChangeListError> {
        changes
            .iter()
            .position(|candidate| ptr::eq(*candidate, change))
            .context(UnknownChangeSnafu {
                change: change.to_string(),
            })
    }
}

#[derive(Debug, Snafu)]
pub enum ChangeListError {
    #[snafu(display("A change set needs at least one change"))]
    EmptyChangeSetError,
    #[snafu(display(
        "Change set stamped {} is older than the latest recorded one ({})",
        timestamp,
        latest
    ))]
    NonMonotonicTimestampError { timestamp: i64, latest: i64 },
    #[snafu(display("Change '{}' is not recorded in this list", change))]
    UnknownChangeError { change: String },
    #[snafu(display("Failed to apply change set"))]
    ApplyChangeSetError { source: ChangeError },
    #[snafu(display("Failed to revert recorded changes"))]
    RevertChangesError { source: ChangeError },
    #[snafu(display("Failed to look up entry"))]
    EntryLookupError { source: TreeError },
    #[snafu(display("Entry {} disappeared while walking its history", id))]
    LostEntryError { id: EntryId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::{
        ChangeFileContentChange, CreateDirectoryChange, CreateFileChange, DeleteChange,
        MoveChange, PutEntryLabelChange, RenameChange,
    };
    use rstest::*;

    fn c(text: &str) -> Content {
        Content::of(text.as_bytes())
    }

    struct History {
        tree: RootEntry,
        list: ChangeList,
    }

    impl History {
        fn new() -> Self {
            History {
                tree: RootEntry::new(),
                list: ChangeList::new(),
            }
        }

        fn add(&mut self, timestamp: i64, changes: Vec<Change>) {
            self.list
                .apply_and_add(&mut self.tree, ChangeSet::new(timestamp, changes))
                .unwrap();
        }

        fn change(&self, index: usize) -> &Change {
            self.list.changes().nth(index).unwrap()
        }

        fn timestamps(&self) -> Vec<i64> {
            self.list.change_sets().map(ChangeSet::timestamp).collect()
        }
    }

    #[test]
    fn creation_and_content_change_are_chained() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "file", c("one"), 1).into()]);
        h.add(2, vec![ChangeFileContentChange::new("file", c("two"), 2).into()]);

        assert!(h.list.is_in_the_chain(h.change(0), h.change(1)).unwrap());
    }

    #[test]
    fn chain_only_runs_forward_in_time() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "file", c("one"), 1).into()]);
        h.add(2, vec![ChangeFileContentChange::new("file", c("two"), 2).into()]);

        assert!(!h.list.is_in_the_chain(h.change(1), h.change(0)).unwrap());
    }

    #[test]
    fn independent_files_are_not_chained() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "f1", c("one"), 1).into()]);
        h.add(2, vec![CreateFileChange::new(EntryId(2), "f2", c("two"), 2).into()]);

        assert!(!h.list.is_in_the_chain(h.change(0), h.change(1)).unwrap());
    }

    #[test]
    fn move_links_destination_directory_to_file() {
        let mut h = History::new();
        h.add(1, vec![CreateDirectoryChange::new(EntryId(1), "dir1").into()]);
        h.add(2, vec![CreateDirectoryChange::new(EntryId(2), "dir2").into()]);
        h.add(3, vec![CreateFileChange::new(EntryId(3), "dir1/file", c("x"), 3).into()]);

        assert!(h.list.is_in_the_chain(h.change(0), h.change(2)).unwrap());
        assert!(!h.list.is_in_the_chain(h.change(1), h.change(2)).unwrap());

        h.add(4, vec![MoveChange::new("dir1/file", "dir2").into()]);

        assert!(h.list.is_in_the_chain(h.change(0), h.change(2)).unwrap());
        assert!(h.list.is_in_the_chain(h.change(1), h.change(2)).unwrap());
    }

    #[test]
    fn labels_do_not_link_chains() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "f1", c("one"), 1).into()]);
        h.add(2, vec![PutEntryLabelChange::new(2, "f1", "label", false).into()]);

        assert!(!h.list.is_in_the_chain(h.change(0), h.change(1)).unwrap());
    }

    #[test]
    fn chain_query_with_foreign_change_fails() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "f1", c("one"), 1).into()]);
        let foreign: Change = CreateFileChange::new(EntryId(1), "f1", c("one"), 1).into();

        assert!(matches!(
            h.list.is_in_the_chain(h.change(0), &foreign),
            Err(ChangeListError::UnknownChangeError { .. })
        ));
    }

    #[rstest]
    #[case(3, vec![4, 3])]
    #[case(1, vec![4, 3, 2, 1])]
    #[case(5, vec![])]
    fn purge_removes_oldest_prefix(#[case] threshold: i64, #[case] remaining: Vec<i64>) {
        let mut h = History::new();
        for (timestamp, name) in [(1, "f1"), (2, "f2"), (3, "f3"), (4, "f4")] {
            h.add(
                timestamp,
                vec![CreateFileChange::new(EntryId(timestamp as i32), name, c(name), timestamp).into()],
            );
        }

        h.list.purge_up_to(threshold);

        assert_eq!(h.timestamps(), remaining);
    }

    #[test]
    fn purge_keeps_nearest_newer_set_across_gap() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "f1", c("one"), 1).into()]);
        h.add(5, vec![CreateFileChange::new(EntryId(2), "f2", c("two"), 5).into()]);

        h.list.purge_up_to(3);

        assert_eq!(h.timestamps(), vec![5]);
    }

    #[test]
    fn purge_returns_superseded_contents_in_order() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "file", c("one"), 1).into()]);
        h.add(2, vec![ChangeFileContentChange::new("file", c("two"), 2).into()]);
        h.add(3, vec![ChangeFileContentChange::new("file", c("three"), 3).into()]);
        h.add(
            4,
            vec![
                ChangeFileContentChange::new("file", c("four"), 4).into(),
                ChangeFileContentChange::new("file", c("five"), 4).into(),
            ],
        );

        let contents = h.list.purge_up_to(5);

        assert_eq!(contents, vec![c("one"), c("two"), c("three"), c("four")]);
        assert!(h.list.is_empty());
    }

    #[test]
    fn purge_returns_contents_of_deleted_subtree() {
        let mut h = History::new();
        h.add(
            1,
            vec![
                CreateDirectoryChange::new(EntryId(1), "dir").into(),
                CreateFileChange::new(EntryId(2), "dir/file", c("one"), 1).into(),
            ],
        );
        h.add(2, vec![DeleteChange::new("dir").into()]);

        assert_eq!(h.list.purge_up_to(3), vec![c("one")]);
    }

    #[test]
    fn purge_and_revert_on_empty_list_are_noops() {
        let mut list = ChangeList::new();
        let mut tree = RootEntry::new();
        let change: Change = CreateDirectoryChange::new(EntryId(1), "dir").into();

        assert!(list.purge_up_to(100).is_empty());
        list.revert_up_to(&mut tree, &change, true).unwrap();
        assert_eq!(tree, RootEntry::new());
    }

    #[test]
    fn revert_up_to_first_creation_including_it() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "f1", c("one"), 1).into()]);
        h.add(2, vec![CreateFileChange::new(EntryId(2), "f2", c("two"), 2).into()]);

        let mut copy = h.tree.copy();
        h.list.revert_up_to(&mut copy, h.change(0), true).unwrap();

        assert!(!copy.has_entry("f1"));
        assert!(!copy.has_entry("f2"));
    }

    #[test]
    fn revert_up_to_first_creation_excluding_it() {
        let mut h = History::new();
        h.add(1, vec![CreateFileChange::new(EntryId(1), "f1", c("one"), 1).into()]);
        h.add(2, vec![CreateFileChange::new(EntryId(2), "f2", c("two"), 2).into()]);

        let mut copy = h.tree.copy();
        h.list.revert_up_to(&mut copy, h.change(0), false).unwrap();

        assert!(copy.has_entry("f1"));
        assert!(!copy.has_entry("f2"));
        assert!(h.tree.has_entry("f2"));
    }

    #[test]
    fn revert_inside_a_change_set_goes_backwards() {
        let mut h = History::new();
        h.add(
            1,
            vec![
                CreateDirectoryChange::new(EntryId(1), "dir").into(),
                CreateFileChange::new(EntryId(2), "dir/file", c("one"), 1).into(),
                RenameChange::new("dir/file", "renamed").into(),
            ],
        );

        let mut copy = h.tree.copy();
        h.list.revert_up_to(&mut copy, h.change(1), false).unwrap();

        assert!(copy.has_entry("dir/file"));
        assert!(!copy.has_entry("dir/renamed"));
    }

    #[test]
    fn adding_older_change_set_is_rejected() {
        let mut h = History::new();
        h.add(5, vec![CreateFileChange::new(EntryId(1), "f1", c("one"), 5).into()]);

        let result = h.list.apply_and_add(
            &mut h.tree,
            ChangeSet::new(4, vec![CreateFileChange::new(EntryId(2), "f2", c("two"), 4).into()]),
        );

        assert!(matches!(
            result,
            Err(ChangeListError::NonMonotonicTimestampError {
                timestamp: 4,
                latest: 5
            })
        ));
        assert!(!h.tree.has_entry("f2"));
    }

    #[test]
    fn empty_change_set_is_rejected() {
        let mut list = ChangeList::new();
        assert!(matches!(
            list.add_change_set(ChangeSet::new(1, Vec::new())),
            Err(ChangeListError::EmptyChangeSetError)
        ));
    }

    #[test]
    fn history_of_entry_follows_renames_and_stops_at_creation() {
        let mut h = History::new();
        h.add(1, vec![CreateDirectoryChange::new(EntryId(1), "dir").into()]);
        h.add(2, vec![CreateFileChange::new(EntryId(2), "dir/file", c("one"), 2).into()]);
        h.add(3, vec![RenameChange::new("dir/file", "renamed").into()]);
        h.add(4, vec![CreateFileChange::new(EntryId(3), "other", c("x"), 4).into()]);
        h.add(5, vec![ChangeFileContentChange::new("dir/renamed", c("two"), 5).into()]);

        let file_history = h
            .list
            .change_sets_for(&h.tree, "dir/renamed")
            .unwrap()
            .into_iter()
            .map(ChangeSet::timestamp)
            .collect::<Vec<_>>();
        assert_eq!(file_history, vec![5, 3, 2]);

        let dir_history = h
            .list
            .change_sets_for(&h.tree, "dir")
            .unwrap()
            .into_iter()
            .map(ChangeSet::timestamp)
            .collect::<Vec<_>>();
        assert_eq!(dir_history, vec![5, 3, 2, 1]);
    }

    #[test]
    fn history_of_moved_entry_survives_move() {
        let mut h = History::new();
        h.add(
            1,
            vec![
                CreateDirectoryChange::new(EntryId(1), "dir1").into(),
                CreateDirectoryChange::new(EntryId(2), "dir2").into(),
            ],
        );
        h.add(2, vec![CreateFileChange::new(EntryId(3), "dir1/file", c("one"), 2).into()]);
        h.add(3, vec![MoveChange::new("dir1/file", "dir2").into()]);

        let history = h.list.change_sets_for(&h.tree, "dir2/file").unwrap();
        assert_eq!(history.len(), 2);

        let dir1_history = h
            .list
            .change_sets_for(&h.tree, "dir1")
            .unwrap()
            .into_iter()
            .map(ChangeSet::timestamp)
            .collect::<Vec<_>>();
        assert_eq!(dir1_history, vec![3, 2, 1]);
    }

    #[test]
    fn history_of_missing_entry_fails() {
        let h = History::new();
        assert!(matches!(
            h.list.change_sets_for(&h.tree, "missing"),
            Err(ChangeListError::EntryLookupError { .. })
        ));
    }
}
