//! # Insertion (Best-Fit Allocation)
//!
//! Inserting a key runs in two independent passes over the entry chain,
//! followed by a split:
//!
//! ```text
//! 1. duplicate scan   any allocated entry == key  -> DuplicateKey, no mutation
//! 2. best-fit scan    smallest free entry with size >= needed,
//!                     lowest offset on ties
//!    none found       grow() once, rescan         (needed > increment or
//!                                                  cap reached
//!                                                  -> InsufficientSpace)
//! 3. split
//! ```
//!
//! where `needed = ENTRY_HEADER_SIZE + key.len() + 1`.
//!
//! The duplicate scan always finishes before best-fit bookkeeping starts, so
//! a duplicate can never leave a half-chosen candidate behind.
//!
//! ## Split
//!
//! ```text
//! before:  | free, size = S                                 |
//! after:   | alloc, size = needed | free, size = S - needed |
//! ```
//!
//! If `S - needed` is smaller than a descriptor, the whole entry is taken and
//! the slack becomes internal fragmentation.

use eyre::{bail, eyre, Result};
use tracing::debug;

use super::Bag;
use crate::config::ENTRY_HEADER_SIZE;
use crate::config::PAYLOAD_TERMINATOR;
use crate::error::BagError;
use crate::storage::{required_size, write_key, Entry, EntryCursor, EntryHeader, Region};

impl<R: Region> Bag<R> {
    /// Stores `key` in the bag.
    ///
    /// Fails with `DuplicateKey` if it is already present, `InvalidKey` if
    /// it contains a NUL byte, and `InsufficientSpace` if no free entry fits
    /// and growth cannot provide one. None of these mutate the region.
    pub fn insert(&mut self, key: &str) -> Result<()> {
        self.ensure_usable()?;

        if key.as_bytes().contains(&PAYLOAD_TERMINATOR) {
            bail!(BagError::InvalidKey {
                reason: "key contains a NUL byte"
            });
        }

        let result = self.insert_unchecked(key);
        self.poison_on_corruption(result)
    }

    fn insert_unchecked(&mut self, key: &str) -> Result<()> {
        if self.find(key)?.is_some() {
            bail!(BagError::DuplicateKey {
                key: key.to_string()
            });
        }

        let needed = required_size(key);

        let candidate = match self.best_fit(needed)? {
            Some(entry) => entry,
            None => {
                let increment = self.config.growth_increment();
                if needed > increment {
                    bail!(BagError::InsufficientSpace {
                        needed,
                        available: increment,
                    });
                }

                if increment > self.growth_headroom() {
                    bail!(BagError::InsufficientSpace {
                        needed,
                        available: self.collect_stats()?.largest_free,
                    });
                }

                self.grow()?;
                self.best_fit(needed)?
                    .ok_or_else(|| eyre!("no free entry of {} bytes after growth", needed))?
            }
        };

        self.split(candidate, needed, key)
    }

    /// Smallest free entry of at least `needed` bytes, lowest offset first.
    fn best_fit(&self, needed: usize) -> Result<Option<Entry>> {
        let mut best: Option<Entry> = None;

        for entry in EntryCursor::new(self.region.as_bytes()) {
            let entry = entry?;
            if entry.is_allocated() || entry.size() < needed {
                continue;
            }
            if best.map_or(true, |b| entry.size() < b.size()) {
                best = Some(entry);
            }
        }

        Ok(best)
    }

    fn split(&mut self, candidate: Entry, needed: usize, key: &str) -> Result<()> {
        let offset = candidate.offset();
        let mut size = needed;
        let mut leftover = candidate.size() - needed;

        if leftover < ENTRY_HEADER_SIZE {
            size = candidate.size();
            leftover = 0;
        }

        EntryHeader::allocated(size).write_to(&mut self.region, offset)?;
        write_key(&mut self.region, offset, key)?;

        if leftover > 0 {
            EntryHeader::free(leftover).write_to(&mut self.region, offset + size)?;
        }

        debug!(offset, size, leftover, "inserted key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BagConfig;
    use crate::storage::MemRegion;

    fn in_memory() -> Bag<MemRegion> {
        Bag::from_region(MemRegion::new(), BagConfig::default()).unwrap()
    }

    fn layout<R: Region>(bag: &Bag<R>) -> Vec<(usize, bool, usize)> {
        bag.entries()
            .map(|e| e.map(|e| (e.offset(), e.is_allocated(), e.size())))
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn insert_splits_the_free_entry() {
        let mut bag = in_memory();

        bag.insert("alpha").unwrap();

        assert_eq!(layout(&bag), vec![(8, true, 14), (22, false, 65514)]);

        bag.insert("beta").unwrap();

        assert_eq!(
            layout(&bag),
            vec![(8, true, 14), (22, true, 13), (35, false, 65501)]
        );
        assert_eq!(bag.list().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn duplicate_leaves_region_untouched() {
        let mut bag = in_memory();
        bag.insert("alpha").unwrap();
        let before = bag.region().as_bytes().to_vec();

        let err = bag.insert("alpha").unwrap_err();

        assert_eq!(
            BagError::of(&err),
            Some(&BagError::DuplicateKey {
                key: "alpha".to_string()
            })
        );
        assert_eq!(bag.region().as_bytes(), &before[..]);
    }

    #[test]
    fn nul_byte_is_rejected() {
        let mut bag = in_memory();

        let err = bag.insert("al\0pha").unwrap_err();

        assert!(matches!(
            BagError::of(&err),
            Some(BagError::InvalidKey { .. })
        ));
        assert!(bag.is_empty().unwrap());
    }

    #[test]
    fn empty_key_is_a_valid_member() {
        let mut bag = in_memory();

        bag.insert("").unwrap();

        assert_eq!(bag.list().unwrap(), vec![""]);
        assert_eq!(layout(&bag)[0], (8, true, 9));
    }

    #[test]
    fn small_leftover_is_absorbed() {
        let config = BagConfig::new(8 + 20, 1 << 20).unwrap();
        let mut bag = Bag::from_region(MemRegion::new(), config).unwrap();

        // The single free entry is 20 bytes; "abcdefgh" needs 17, leaving 3.
        bag.insert("abcdefgh").unwrap();

        assert_eq!(layout(&bag), vec![(8, true, 20)]);
        assert_eq!(bag.list().unwrap(), vec!["abcdefgh"]);
    }

    #[test]
    fn leftover_of_exactly_one_descriptor_is_kept() {
        let config = BagConfig::new(8 + 25, 1 << 20).unwrap();
        let mut bag = Bag::from_region(MemRegion::new(), config).unwrap();

        bag.insert("abcdefgh").unwrap();

        assert_eq!(layout(&bag), vec![(8, true, 17), (25, false, 8)]);
    }

    #[test]
    fn best_fit_prefers_smallest_then_lowest_offset() {
        let mut bag = in_memory();
        for key in ["aaaaaaaaaa", "x1", "bbbbbb", "x2", "cccccc", "x3"] {
            bag.insert(key).unwrap();
        }
        bag.remove("aaaaaaaaaa").unwrap();
        bag.remove("bbbbbb").unwrap();
        bag.remove("cccccc").unwrap();

        // Free holes: 19 bytes at 8, 15 at 38, 15 at 64, then the tail.
        bag.insert("dddddd").unwrap();

        let entries = layout(&bag);
        assert!(entries.contains(&(38, true, 15)));
        assert!(entries.contains(&(64, false, 15)));
        assert!(entries.contains(&(8, false, 19)));
    }

    #[test]
    fn key_larger_than_increment_is_refused() {
        let config = BagConfig::new(64, 1 << 20).unwrap();
        let mut bag = Bag::from_region(MemRegion::new(), config).unwrap();
        let before = bag.region().as_bytes().to_vec();

        let err = bag.insert(&"z".repeat(60)).unwrap_err();

        assert_eq!(
            BagError::of(&err),
            Some(&BagError::InsufficientSpace {
                needed: 69,
                available: 64
            })
        );
        assert_eq!(bag.region().as_bytes(), &before[..]);
    }
}
