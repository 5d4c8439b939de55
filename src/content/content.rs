use std::fmt;
use std::hash::Hasher;

use bincode::{Decode, Encode};
use metrohash::MetroHash64;

/// Opaque handle for a blob of file bytes.
///
/// Two contents are equal when their bytes hash to the same digest and have
/// the same length. The bytes themselves live in a
/// [`ContentStore`](crate::content::ContentStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Content {
    digest: u64,
    length: u64,
}

impl Content {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = MetroHash64::default();
        hasher.write(bytes);
        Content {
            digest: hasher.finish(),
            length: bytes.len() as u64,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(digest: u64, length: u64) -> Self {
        Content { digest, length }
    }

    pub fn digest(&self) -> u64 {
        self.digest
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x} ({} bytes)", self.digest, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn same_bytes_same_content() {
        assert_eq!(Content::of(b"hello"), Content::of(b"hello"));
    }

    #[rstest]
    #[case(b"hello", b"world")]
    #[case(b"", b"x")]
    #[case(b"abc", b"abcd")]
    fn different_bytes_different_content(#[case] left: &[u8], #[case] right: &[u8]) {
        assert_ne!(Content::of(left), Content::of(right));
    }

    #[test]
    fn length_is_tracked() {
        assert_eq!(Content::of(b"four").len(), 4);
        assert!(Content::of(b"").is_empty());
    }
}
