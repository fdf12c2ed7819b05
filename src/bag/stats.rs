//! # Space Accounting
//!
//! `BagStats` is a single-pass summary of the entry chain. Because entries
//! tile the region, `allocated_bytes + free_bytes` always equals
//! `region_len - BAG_HEADER_SIZE`.

use eyre::Result;

use super::Bag;
use crate::config::BAG_HEADER_SIZE;
use crate::storage::{EntryCursor, Region};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BagStats {
    pub region_len: usize,
    pub entry_count: usize,
    pub allocated_count: usize,
    pub free_count: usize,
    pub allocated_bytes: usize,
    pub free_bytes: usize,
    pub largest_free: usize,
}

impl BagStats {
    /// Bytes covered by entries, i.e. everything after the header.
    pub fn arena_bytes(&self) -> usize {
        self.allocated_bytes + self.free_bytes
    }

    pub fn utilization_percent(&self) -> f64 {
        let arena = self.arena_bytes();
        if arena == 0 {
            return 0.0;
        }
        (self.allocated_bytes as f64 / arena as f64) * 100.0
    }
}

impl std::fmt::Display for BagStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "len:{},entries:{},allocated:{}/{}B,free:{}/{}B,largest_free:{}B",
            self.region_len,
            self.entry_count,
            self.allocated_count,
            self.allocated_bytes,
            self.free_count,
            self.free_bytes,
            self.largest_free
        )
    }
}

impl<R: Region> Bag<R> {
    pub fn stats(&self) -> Result<BagStats> {
        self.ensure_usable()?;
        let result = self.collect_stats();
        self.poison_on_corruption(result)
    }

    pub(super) fn collect_stats(&self) -> Result<BagStats> {
        let mut stats = BagStats {
            region_len: self.region.len(),
            ..BagStats::default()
        };

        for entry in EntryCursor::new(self.region.as_bytes()) {
            let entry = entry?;
            stats.entry_count += 1;

            if entry.is_allocated() {
                stats.allocated_count += 1;
                stats.allocated_bytes += entry.size();
            } else {
                stats.free_count += 1;
                stats.free_bytes += entry.size();
                stats.largest_free = stats.largest_free.max(entry.size());
            }
        }

        debug_assert_eq!(
            stats.arena_bytes(),
            stats.region_len.saturating_sub(BAG_HEADER_SIZE)
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BagConfig;
    use crate::storage::MemRegion;

    #[test]
    fn stats_of_fresh_bag() {
        let bag = Bag::from_region(MemRegion::new(), BagConfig::default()).unwrap();

        let stats = bag.stats().unwrap();

        assert_eq!(
            stats,
            BagStats {
                region_len: 65536,
                entry_count: 1,
                allocated_count: 0,
                free_count: 1,
                allocated_bytes: 0,
                free_bytes: 65528,
                largest_free: 65528,
            }
        );
        assert_eq!(stats.utilization_percent(), 0.0);
    }

    #[test]
    fn stats_track_inserts_and_removes() {
        let mut bag = Bag::from_region(MemRegion::new(), BagConfig::default()).unwrap();
        bag.insert("alpha").unwrap();
        bag.insert("beta").unwrap();
        bag.insert("gamma").unwrap();
        bag.remove("beta").unwrap();

        let stats = bag.stats().unwrap();

        assert_eq!(stats.allocated_count, 2);
        assert_eq!(stats.allocated_bytes, 28);
        assert_eq!(stats.free_count, 2);
        assert_eq!(stats.free_bytes, 65528 - 28);
        assert_eq!(stats.largest_free, 65528 - 28 - 13);
        assert_eq!(stats.arena_bytes(), 65528);
        assert_eq!(bag.len().unwrap(), 2);
    }

    #[test]
    fn display_is_compact() {
        let bag = Bag::from_region(MemRegion::new(), BagConfig::default()).unwrap();

        assert_eq!(
            bag.stats().unwrap().to_string(),
            "len:65536,entries:1,allocated:0/0B,free:1/65528B,largest_free:65528B"
        );
    }
}
