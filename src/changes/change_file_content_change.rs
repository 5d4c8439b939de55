use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::changes::change::{ApplySnafu, NotAppliedSnafu, RevertSnafu};
use crate::changes::{BaseChange, ChangeError, ChangeTrait};
use crate::content::Content;
use crate::tree::{IdPath, RootEntry};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ChangeFileContentChange {
    base: BaseChange,
    new_content: Content,
    new_timestamp: i64,
    /// Content and timestamp the file had before the change.
    previous: Option<(Content, i64)>,
}

impl ChangeFileContentChange {
    pub fn new(path: impl Into<String>, new_content: Content, new_timestamp: i64) -> Self {
        ChangeFileContentChange {
            base: BaseChange::new(path),
            new_content,
            new_timestamp,
            previous: None,
        }
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn new_content(&self) -> Content {
        self.new_content
    }

    pub fn previous_content(&self) -> Option<Content> {
        self.previous.map(|(content, _)| content)
    }
}

impl ChangeTrait for ChangeFileContentChange {
    fn apply_to(&mut self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let path = self.base.path();
        let previous = tree
            .change_file_content(path, self.new_content, self.new_timestamp)
            .context(ApplySnafu { path })?;
        let id_path = tree.id_path(path).context(ApplySnafu { path })?;

        self.previous = Some(previous);
        self.base.record(vec![id_path]);
        Ok(())
    }

    fn revert_on(&self, tree: &mut RootEntry) -> Result<(), ChangeError> {
        let path = self.base.path();
        let (content, timestamp) = self.previous.context(NotAppliedSnafu { path })?;
        tree.change_file_content(path, content, timestamp)
            .context(RevertSnafu { path })?;
        Ok(())
    }

    fn affected_id_paths(&self) -> &[IdPath] {
        self.base.affected_id_paths()
    }

    fn contents_to_purge(&self) -> Vec<Content> {
        self.previous_content().into_iter().collect()
    }
}
