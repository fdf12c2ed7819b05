//! # Region Growth
//!
//! Growth is the only way a bag gains capacity. Each call extends the region
//! by exactly one growth increment and appends one free entry spanning the
//! new bytes:
//!
//! ```text
//! before:  | header | ... | last entry |
//!                                      ^ old len
//! after:   | header | ... | last entry | free, size = increment |
//!                                                               ^ new len
//! ```
//!
//! Existing entries are never touched, even when the last one is free, so
//! a free tail and the appended entry can sit side by side until a later
//! removal coalesces around them.
//!
//! Growth that would take the region past `max_region_size` fails with
//! `InsufficientSpace` before the region is resized. `needed` is the
//! increment and `available` is what the cap still allows.

use eyre::{bail, ensure, Result, WrapErr};
use tracing::debug;

use super::Bag;
use crate::error::BagError;
use crate::storage::{EntryHeader, Region};

impl<R: Region> Bag<R> {
    /// Extends the region by one increment and returns the offset of the
    /// appended free entry.
    pub fn grow(&mut self) -> Result<usize> {
        self.ensure_usable()?;

        let increment = self.config.growth_increment();
        let old_len = self.region.len();
        let new_len = old_len.saturating_add(increment);

        if increment > self.growth_headroom() {
            bail!(BagError::InsufficientSpace {
                needed: increment,
                available: self.growth_headroom(),
            });
        }

        self.region
            .grow(increment)
            .wrap_err_with(|| format!("failed to grow bag region to {} bytes", new_len))?;

        // Offsets survive growth; the length must be re-read.
        let len = self.region.len();
        ensure!(
            len == new_len,
            "region grew to {} bytes, expected {}",
            len,
            new_len
        );

        EntryHeader::free(increment).write_to(&mut self.region, old_len)?;

        debug!(offset = old_len, size = increment, len, "grew bag region");
        Ok(old_len)
    }

    /// Bytes the region may still grow by before reaching the size cap.
    pub(super) fn growth_headroom(&self) -> usize {
        self.config.max_region_size().saturating_sub(self.region.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BagConfig, GROWTH_INCREMENT};
    use crate::storage::MemRegion;

    fn layout<R: Region>(bag: &Bag<R>) -> Vec<(usize, bool, usize)> {
        bag.entries()
            .map(|e| e.map(|e| (e.offset(), e.is_allocated(), e.size())))
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn grow_appends_one_free_entry() {
        let mut bag = Bag::from_region(MemRegion::new(), BagConfig::default()).unwrap();
        bag.insert("alpha").unwrap();

        let offset = bag.grow().unwrap();

        assert_eq!(offset, GROWTH_INCREMENT);
        assert_eq!(bag.region().len(), 2 * GROWTH_INCREMENT);
        assert_eq!(
            layout(&bag),
            vec![
                (8, true, 14),
                (22, false, 65514),
                (GROWTH_INCREMENT, false, GROWTH_INCREMENT)
            ]
        );
        bag.check().unwrap();
    }

    #[test]
    fn repeated_growth_keeps_the_chain_valid() {
        let mut bag = Bag::from_region(MemRegion::new(), BagConfig::new(64, 1024).unwrap()).unwrap();

        for _ in 0..3 {
            bag.grow().unwrap();
        }

        assert_eq!(bag.region().len(), 256);
        assert_eq!(layout(&bag).len(), 4);
        bag.check().unwrap();
    }

    #[test]
    fn insert_triggers_growth_when_nothing_fits() {
        let mut bag = Bag::from_region(MemRegion::new(), BagConfig::new(64, 1024).unwrap()).unwrap();
        bag.insert(&"a".repeat(40)).unwrap();
        assert_eq!(bag.region().len(), 64);

        // The first increment is used up by the absorbed split; this needs 39.
        bag.insert(&"b".repeat(30)).unwrap();

        assert_eq!(bag.region().len(), 128);
        assert_eq!(
            layout(&bag),
            vec![(8, true, 56), (64, true, 39), (103, false, 25)]
        );
        assert_eq!(bag.list().unwrap(), vec!["a".repeat(40), "b".repeat(30)]);
    }

    #[test]
    fn growth_stops_at_the_size_cap() {
        let mut bag = Bag::from_region(MemRegion::new(), BagConfig::new(64, 128).unwrap()).unwrap();
        bag.grow().unwrap();

        let err = bag.grow().unwrap_err();

        assert_eq!(
            BagError::of(&err),
            Some(&BagError::InsufficientSpace {
                needed: 64,
                available: 0
            })
        );
        assert_eq!(bag.region().len(), 128);
    }

    #[test]
    fn insert_reports_the_size_cap() {
        let mut bag = Bag::from_region(MemRegion::new(), BagConfig::new(64, 64).unwrap()).unwrap();
        bag.insert(&"a".repeat(40)).unwrap();

        let before = bag.region().as_bytes().to_vec();

        let err = bag.insert(&"b".repeat(30)).unwrap_err();

        assert_eq!(
            BagError::of(&err),
            Some(&BagError::InsufficientSpace {
                needed: 39,
                available: 0
            })
        );
        assert_eq!(bag.region().as_bytes(), &before[..]);
        assert_eq!(bag.list().unwrap(), vec!["a".repeat(40)]);
    }
}
