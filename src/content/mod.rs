//! File contents referenced by entries and changes.

mod content;
mod content_store;

pub use content::Content;
pub use content_store::{ContentStore, ContentStoreError};
