use std::collections::HashMap;

use bincode::{Decode, Encode};
use snafu::prelude::*;
use tracing::debug;

use crate::content::Content;

/// Content-addressed, reference-counted blob storage.
///
/// Every [`ContentStore::store`] call takes one reference; every content
/// handed back by a purge gives one back through [`ContentStore::release`].
/// A blob is dropped once nothing refers to it anymore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct ContentStore {
    blobs: HashMap<Content, StoredBlob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
struct StoredBlob {
    bytes: Vec<u8>,
    references: u32,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, bytes: &[u8]) -> Content {
        let content = Content::of(bytes);
        self.blobs
            .entry(content)
            .or_insert_with(|| StoredBlob {
                bytes: bytes.to_vec(),
                references: 0,
            })
            .references += 1;
        content
    }

    pub fn get(&self, content: Content) -> Result<&[u8], ContentStoreError> {
        self.blobs
            .get(&content)
            .map(|blob| blob.bytes.as_slice())
            .context(MissingContentSnafu { content })
    }

    pub fn contains(&self, content: Content) -> bool {
        self.blobs.contains_key(&content)
    }

    /// Drops one reference per content and returns how many blobs were freed.
    pub fn release(&mut self, contents: &[Content]) -> usize {
        let mut freed = 0;
        for content in contents {
            let Some(blob) = self.blobs.get_mut(content) else {
                debug!("Released content {} is not stored", content);
                continue;
            };
            blob.references = blob.references.saturating_sub(1);
            if blob.references == 0 {
                self.blobs.remove(content);
                freed += 1;
            }
        }
        freed
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[derive(Debug, Snafu)]
pub enum ContentStoreError {
    #[snafu(display("Content {} is not in the store", content))]
    MissingContentError { content: Content },
}
