use bincode::{Decode, Encode};
use snafu::prelude::*;

use crate::tree::EntryId;

/// Hands out entry ids for creations, never reusing one.
///
/// Ids are non-negative, so none of them can collide with the root id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct IdAllocator {
    next: i32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: i32) -> Self {
        IdAllocator { next }
    }

    pub fn next_id(&mut self) -> Result<EntryId, IdAllocatorError> {
        ensure!(self.next >= 0, InvalidIdSnafu { id: self.next });
        let following = self.next.checked_add(1).context(IdsExhaustedSnafu)?;
        let id = EntryId(self.next);
        self.next = following;
        Ok(id)
    }

    /// The id the next call to `next_id` returns.
    pub fn peek(&self) -> EntryId {
        EntryId(self.next)
    }
}

#[derive(Debug, Snafu)]
pub enum IdAllocatorError {
    #[snafu(display("No entry ids are left to allocate"))]
    IdsExhaustedError,
    #[snafu(display("Entry id {} is reserved", id))]
    InvalidIdError { id: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let mut ids = IdAllocator::starting_at(7);
        assert_eq!(ids.next_id().unwrap(), EntryId(7));
        assert_eq!(ids.next_id().unwrap(), EntryId(8));
        assert_eq!(ids.peek(), EntryId(9));
    }

    #[test]
    fn exhausted_allocator_fails_without_wrapping() {
        let mut ids = IdAllocator::starting_at(i32::MAX - 1);
        assert_eq!(ids.next_id().unwrap(), EntryId(i32::MAX - 1));

        assert!(matches!(
            ids.next_id(),
            Err(IdAllocatorError::IdsExhaustedError)
        ));
        assert_eq!(ids.peek(), EntryId(i32::MAX));
    }

    #[test]
    fn negative_ids_are_never_handed_out() {
        let mut ids = IdAllocator::starting_at(-1);
        assert!(matches!(
            ids.next_id(),
            Err(IdAllocatorError::InvalidIdError { id: -1 })
        ));
    }
}
