//! # Removal and Coalescing
//!
//! Removing a key frees its entry and merges it with any free neighbor, so
//! two free entries are never left adjacent by a removal.
//!
//! ```text
//! prev      target     next             result
//! --------  ---------  ---------        ------------------------------
//! alloc     T          alloc            free(T) at target
//! alloc     T          free(N)          free(T + N) at target
//! free(P)   T          alloc            free(P + T) at prev
//! free(P)   T          free(N)          free(P + T + N) at prev
//! ```
//!
//! All sizes are read before the first descriptor is written. The forward
//! merge is written first; the backward merge then overwrites the previous
//! descriptor so the absorbed target descriptor simply becomes payload.

use eyre::{bail, Result};
use tracing::debug;

use super::Bag;
use crate::error::BagError;
use crate::storage::{Entry, EntryCursor, EntryHeader, Region};

impl<R: Region> Bag<R> {
    /// Removes `key` from the bag and coalesces the freed space.
    ///
    /// Fails with `NotFound` without mutating the region if `key` is absent.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.ensure_usable()?;
        let result = self.remove_unchecked(key);
        self.poison_on_corruption(result)
    }

    fn remove_unchecked(&mut self, key: &str) -> Result<()> {
        let Some((prev, target, next)) = self.locate(key)? else {
            bail!(BagError::NotFound {
                key: key.to_string()
            });
        };

        let mut freed = target.size();
        if let Some(next) = next.filter(|n| !n.is_allocated()) {
            freed += next.size();
        }

        let merged_prev = prev
            .filter(|p| !p.is_allocated())
            .map(|p| (p.offset(), p.size() + freed));

        EntryHeader::free(freed).write_to(&mut self.region, target.offset())?;

        if let Some((offset, size)) = merged_prev {
            EntryHeader::free(size).write_to(&mut self.region, offset)?;
            debug!(offset, size, "removed key, merged with previous entry");
        } else {
            debug!(offset = target.offset(), size = freed, "removed key");
        }

        Ok(())
    }

    /// Finds the entry holding `key` together with its neighbors.
    fn locate(&self, key: &str) -> Result<Option<(Option<Entry>, Entry, Option<Entry>)>> {
        let bytes = self.region.as_bytes();
        let mut cursor = EntryCursor::new(bytes);
        let mut prev: Option<Entry> = None;

        while let Some(entry) = cursor.next() {
            let entry = entry?;
            if entry.is_allocated() && entry.key(bytes)? == key.as_bytes() {
                let next = cursor.next().transpose()?;
                return Ok(Some((prev, entry, next)));
            }
            prev = Some(entry);
        }

        Ok(None)
    }
}
