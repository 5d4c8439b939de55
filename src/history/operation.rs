use crate::changes::{
    Change, ChangeFileContentChange, CreateDirectoryChange, CreateFileChange, DeleteChange,
    MoveChange, PutEntryLabelChange, PutLabelChange, RenameChange,
};
use crate::content::Content;
use crate::history::{IdAllocator, IdAllocatorError};

/// A requested mutation, before ids and contents are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateDirectory { path: String },
    CreateFile { path: String, content: Vec<u8> },
    ChangeFileContent { path: String, content: Vec<u8> },
    Rename { path: String, new_name: String },
    Move { path: String, new_parent_path: String },
    Delete { path: String },
    PutLabel { label: String, is_global: bool },
    PutEntryLabel { path: String, label: String, is_global: bool },
}

impl Operation {
    pub fn create_directory(path: impl Into<String>) -> Self {
        Operation::CreateDirectory { path: path.into() }
    }

    pub fn create_file(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Operation::CreateFile {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn change_file_content(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Operation::ChangeFileContent {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn rename(path: impl Into<String>, new_name: impl Into<String>) -> Self {
        Operation::Rename {
            path: path.into(),
            new_name: new_name.into(),
        }
    }

    pub fn move_to(path: impl Into<String>, new_parent_path: impl Into<String>) -> Self {
        Operation::Move {
            path: path.into(),
            new_parent_path: new_parent_path.into(),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Operation::Delete { path: path.into() }
    }

    pub fn label(label: impl Into<String>, is_global: bool) -> Self {
        Operation::PutLabel {
            label: label.into(),
            is_global,
        }
    }

    pub fn entry_label(path: impl Into<String>, label: impl Into<String>, is_global: bool) -> Self {
        Operation::PutEntryLabel {
            path: path.into(),
            label: label.into(),
            is_global,
        }
    }

    /// Builds the change for this operation. Creations take a fresh id and
    /// new file bytes are pushed to `blobs` for the caller to store.
    /// Fails only when the allocator has no ids left.
    pub(crate) fn into_change(
        self,
        ids: &mut IdAllocator,
        timestamp: i64,
        blobs: &mut Vec<Vec<u8>>,
    ) -> Result<Change, IdAllocatorError> {
        let change: Change = match self {
            Operation::CreateDirectory { path } => {
                CreateDirectoryChange::new(ids.next_id()?, path).into()
            }
            Operation::CreateFile { path, content } => {
                let handle = Content::of(&content);
                blobs.push(content);
                CreateFileChange::new(ids.next_id()?, path, handle, timestamp).into()
            }
            Operation::ChangeFileContent { path, content } => {
                let handle = Content::of(&content);
                blobs.push(content);
                ChangeFileContentChange::new(path, handle, timestamp).into()
            }
            Operation::Rename { path, new_name } => RenameChange::new(path, new_name).into(),
            Operation::Move {
                path,
                new_parent_path,
            } => MoveChange::new(path, new_parent_path).into(),
            Operation::Delete { path } => DeleteChange::new(path).into(),
            Operation::PutLabel { label, is_global } => {
                PutLabelChange::new(timestamp, label, is_global).into()
            }
            Operation::PutEntryLabel {
                path,
                label,
                is_global,
            } => PutEntryLabelChange::new(timestamp, path, label, is_global).into(),
        };
        Ok(change)
    }
}
