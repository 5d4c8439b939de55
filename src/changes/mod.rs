//! Structural changes of the versioned tree and the log that records them.

mod base_change;
mod change;
mod change_file_content_change;
mod change_list;
mod change_set;
mod create_directory_change;
mod create_file_change;
mod delete_change;
mod label_change;
mod move_change;
mod rename_change;

pub use base_change::BaseChange;
pub use change::{Change, ChangeError, ChangeTrait};
pub use change_file_content_change::ChangeFileContentChange;
pub use change_list::{ChangeList, ChangeListError};
pub use change_set::ChangeSet;
pub use create_directory_change::CreateDirectoryChange;
pub use create_file_change::CreateFileChange;
pub use delete_change::DeleteChange;
pub use label_change::{PutEntryLabelChange, PutLabelChange};
pub use move_change::MoveChange;
pub use rename_change::RenameChange;
