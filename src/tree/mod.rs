//! Versioned filesystem tree the change model operates on.
//!
//! Entries are identified by a stable [`EntryId`] and addressed by
//! slash-separated paths relative to the root. The whole tree can be
//! snapshotted with [`RootEntry::copy`].

mod entry;
mod id_path;
pub mod paths;
mod root_entry;

pub use entry::{Entry, EntryId, EntryKind};
pub use id_path::IdPath;
pub use root_entry::{ROOT_ID, RootEntry, TreeError};
