//! On-disk persistence of a [`LocalHistory`](crate::history::LocalHistory).

mod history_storage;

pub use history_storage::{DEFAULT_STORAGE_PATH, HistoryStorage, StorageError};
