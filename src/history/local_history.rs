use bincode::{Decode, Encode};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::changes::{ChangeError, ChangeList, ChangeListError, ChangeSet};
use crate::content::{ContentStore, ContentStoreError};
use crate::history::{IdAllocator, IdAllocatorError, Operation};
use crate::tree::{EntryId, RootEntry, TreeError};

/// The local history of one project.
///
/// Owns the current tree, the log of change sets that produced it, the
/// bytes of every content still referenced, and the id allocator. All
/// mutations go through [`LocalHistory::record`], which either commits a
/// whole change set or leaves everything untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct LocalHistory {
    tree: RootEntry,
    change_list: ChangeList,
    contents: ContentStore,
    ids: IdAllocator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeSummary {
    pub change_sets: usize,
    pub freed_contents: usize,
}

impl LocalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &RootEntry {
        &self.tree
    }

    pub fn change_list(&self) -> &ChangeList {
        &self.change_list
    }

    pub fn contents(&self) -> &ContentStore {
        &self.contents
    }

    /// Applies the operations as one change set stamped with `timestamp`.
    pub fn record(
        &mut self,
        name: Option<&str>,
        timestamp: i64,
        operations: Vec<Operation>,
    ) -> Result<&ChangeSet, HistoryError> {
        ensure!(!operations.is_empty(), EmptyRecordSnafu);
        if let Some(latest) = self.change_list.latest_timestamp() {
            ensure!(
                timestamp >= latest,
                OutdatedTimestampSnafu { timestamp, latest }
            );
        }

        let mut ids = self.ids.clone();
        let mut blobs = Vec::new();
        let changes = operations
            .into_iter()
            .map(|operation| operation.into_change(&mut ids, timestamp, &mut blobs))
            .collect::<Result<Vec<_>, _>>()
            .context(IdAllocationSnafu)?;
        let mut change_set = ChangeSet::new(timestamp, changes);
        if let Some(name) = name {
            change_set = change_set.with_name(name);
        }

        let mut tree = self.tree.copy();
        change_set.apply_to(&mut tree).context(ApplySnafu)?;
        debug!(
            "Applied {} changes stamped {}",
            change_set.changes().len(),
            timestamp
        );

        let recorded = self
            .change_list
            .add_change_set(change_set)
            .context(RecordSnafu)?;
        self.tree = tree;
        self.ids = ids;
        for blob in &blobs {
            self.contents.store(blob);
        }
        info!(
            "Recorded change set '{}' at {}",
            recorded.name().unwrap_or("unnamed"),
            timestamp
        );
        Ok(recorded)
    }

    pub fn create_directory(&mut self, path: &str, timestamp: i64) -> Result<EntryId, HistoryError> {
        let id = self.ids.peek();
        self.record(None, timestamp, vec![Operation::create_directory(path)])?;
        Ok(id)
    }

    pub fn create_file(
        &mut self,
        path: &str,
        content: &[u8],
        timestamp: i64,
    ) -> Result<EntryId, HistoryError> {
        let id = self.ids.peek();
        self.record(None, timestamp, vec![Operation::create_file(path, content)])?;
        Ok(id)
    }

    pub fn change_file_content(
        &mut self,
        path: &str,
        content: &[u8],
        timestamp: i64,
    ) -> Result<(), HistoryError> {
        self.record(
            None,
            timestamp,
            vec![Operation::change_file_content(path, content)],
        )?;
        Ok(())
    }

    pub fn rename(&mut self, path: &str, new_name: &str, timestamp: i64) -> Result<(), HistoryError> {
        self.record(None, timestamp, vec![Operation::rename(path, new_name)])?;
        Ok(())
    }

    pub fn move_entry(
        &mut self,
        path: &str,
        new_parent_path: &str,
        timestamp: i64,
    ) -> Result<(), HistoryError> {
        self.record(None, timestamp, vec![Operation::move_to(path, new_parent_path)])?;
        Ok(())
    }

    pub fn delete(&mut self, path: &str, timestamp: i64) -> Result<(), HistoryError> {
        self.record(None, timestamp, vec![Operation::delete(path)])?;
        Ok(())
    }

    pub fn put_label(&mut self, label: &str, timestamp: i64) -> Result<(), HistoryError> {
        self.record(None, timestamp, vec![Operation::label(label, true)])?;
        Ok(())
    }

    pub fn put_entry_label(
        &mut self,
        path: &str,
        label: &str,
        timestamp: i64,
    ) -> Result<(), HistoryError> {
        self.record(
            None,
            timestamp,
            vec![Operation::entry_label(path, label, false)],
        )?;
        Ok(())
    }

    /// Current bytes of the file at `path`.
    pub fn content_of(&self, path: &str) -> Result<&[u8], HistoryError> {
        let entry = self.tree.get_entry(path).context(LookupSnafu)?;
        let content = entry.content().context(NotAFileSnafu { path })?;
        self.contents.get(content).context(ContentSnafu)
    }

    /// Change sets that touched the entry at `path`, newest first.
    pub fn history_for(&self, path: &str) -> Result<Vec<&ChangeSet>, HistoryError> {
        self.change_list
            .change_sets_for(&self.tree, path)
            .context(HistoryWalkSnafu)
    }

    /// Tree as it was right before the change set at `index` (newest first)
    /// was recorded.
    pub fn tree_before(&self, index: usize) -> Result<RootEntry, HistoryError> {
        let first_change = self
            .change_list
            .change_sets()
            .nth(index)
            .and_then(|change_set| change_set.changes().first())
            .context(NoSuchChangeSetSnafu { index })?;

        let mut copy = self.tree.copy();
        self.change_list
            .revert_up_to(&mut copy, first_change, true)
            .context(HistoryWalkSnafu)?;
        Ok(copy)
    }

    /// Forgets change sets older than `timestamp` and drops the contents only
    /// they were keeping alive.
    pub fn purge_up_to(&mut self, timestamp: i64) -> PurgeSummary {
        let before = self.change_list.len();
        let contents = self.change_list.purge_up_to(timestamp);
        let freed_contents = self.contents.release(&contents);
        let summary = PurgeSummary {
            change_sets: before - self.change_list.len(),
            freed_contents,
        };
        info!(
            "Purged {} change sets and {} contents older than {}",
            summary.change_sets, summary.freed_contents, timestamp
        );
        summary
    }
}

#[derive(Debug, Snafu)]
pub enum HistoryError {
    #[snafu(display("Nothing to record"))]
    EmptyRecordError,
    #[snafu(display(
        "Timestamp {} is older than the latest recorded change set ({})",
        timestamp,
        latest
    ))]
    OutdatedTimestampError { timestamp: i64, latest: i64 },
    #[snafu(display("Failed to allocate ids for new entries"))]
    IdAllocationError { source: IdAllocatorError },
    #[snafu(display("Failed to apply the recorded changes"))]
    ApplyError { source: ChangeError },
    #[snafu(display("Failed to add the change set to the history"))]
    RecordError { source: ChangeListError },
    #[snafu(display("Failed to walk the recorded history"))]
    HistoryWalkError { source: ChangeListError },
    #[snafu(display("Failed to look up entry"))]
    LookupError { source: TreeError },
    #[snafu(display("Entry '{}' is not a file", path))]
    NotAFileError { path: String },
    #[snafu(display("Failed to read content"))]
    ContentError { source: ContentStoreError },
    #[snafu(display("There is no change set at position {}", index))]
    NoSuchChangeSetError { index: usize },
}
