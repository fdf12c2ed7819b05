//! # Entry Cursor
//!
//! `EntryCursor` walks the entry chain in offset order, from the first entry
//! (immediately after the header) to the logical end of the region.
//!
//! ```text
//! offset = BAG_HEADER_SIZE
//! while offset < len:
//!     entry = Entry::decode(bytes, offset)?     // bounds + size checks
//!     yield entry
//!     offset += entry.size
//! ```
//!
//! Because every decoded entry is checked to end at or before the logical
//! end, the walk either lands exactly on the end or reports `CorruptArena`.
//! After yielding an error the cursor is exhausted.
//!
//! The cursor borrows the region bytes immutably, so it is restartable
//! (create a new one) and cannot outlive a `grow()`.

use eyre::Result;

use super::entry::Entry;
use crate::config::BAG_HEADER_SIZE;

#[derive(Debug, Clone)]
pub struct EntryCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> EntryCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: BAG_HEADER_SIZE,
            done: bytes.len() <= BAG_HEADER_SIZE,
        }
    }

    /// Iterates allocated entries only, yielding their key bytes.
    pub fn keys(self) -> impl Iterator<Item = Result<&'a [u8]>> {
        let bytes = self.bytes;
        self.filter_map(move |entry| match entry {
            Ok(entry) if entry.is_allocated() => Some(entry.key(bytes)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
    }
}

impl Iterator for EntryCursor<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match Entry::decode(self.bytes, self.offset) {
            Ok(entry) => {
                self.offset = entry.end();
                self.done = self.offset == self.bytes.len();
                Some(Ok(entry))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for EntryCursor<'_> {}
