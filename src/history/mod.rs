//! Session-level history: the tree, its change log and the content store
//! kept consistent together.

mod id_allocator;
mod local_history;
mod operation;

pub use id_allocator::{IdAllocator, IdAllocatorError};
pub use local_history::{HistoryError, LocalHistory, PurgeSummary};
pub use operation::Operation;
