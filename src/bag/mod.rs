//! # Bag
//!
//! `Bag` is the public face of bagdb: a set of unique strings stored as
//! entries inside one growable [`Region`].
//!
//! ## Operations
//!
//! | Operation  | Module     | Mutates | Outcomes besides success          |
//! |------------|------------|---------|-----------------------------------|
//! | `insert`   | `insert`   | yes     | DuplicateKey, InsufficientSpace   |
//! | `remove`   | `remove`   | yes     | NotFound                          |
//! | `grow`     | `growth`   | yes     | InsufficientSpace (cap reached)   |
//! | `list`     | here       | no      |                                   |
//! | `contains` | here       | no      |                                   |
//! | `stats`    | `stats`    | no      |                                   |
//! | `check`    | here       | no      |                                   |
//!
//! Any operation may also report `CorruptArena`.
//!
//! ## Exclusive Access
//!
//! The bag owns its region. Mutating operations take `&mut self` and run to
//! completion before returning, so no two operations ever see the entry chain
//! at the same time. Sharing a bag file between processes needs external
//! serialization.
//!
//! ## Corruption Is Fatal
//!
//! The first `CorruptArena` reported by any operation poisons the bag. Every
//! later operation fails with that same error without reading or writing the
//! region.
//!
//! ## Opening
//!
//! ```ignore
//! let mut bag = Bag::builder()
//!     .path("./words.bag")
//!     .open()?;
//!
//! bag.insert("alpha")?;
//! assert_eq!(bag.list()?, vec!["alpha"]);
//! ```

mod builder;
mod growth;
mod insert;
mod remove;
mod stats;

pub use builder::BagBuilder;
pub use stats::BagStats;

use std::cell::OnceCell;
use std::path::Path;

use eyre::{bail, Result};
use hashbrown::HashSet;
use tracing::{info, warn};

use crate::config::{BagConfig, BAG_HEADER_SIZE};
use crate::error::BagError;
use crate::storage::{AnyRegion, BagHeader, Entry, EntryCursor, Region};

#[derive(Debug)]
pub struct Bag<R: Region = AnyRegion> {
    region: R,
    config: BagConfig,
    poison: OnceCell<BagError>,
}

impl Bag<AnyRegion> {
    pub fn builder() -> BagBuilder {
        BagBuilder::new()
    }

    /// Opens the bag file at `path` with default settings, creating it if
    /// it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        BagBuilder::new().path(path).open()
    }

    pub fn in_memory() -> Result<Self> {
        BagBuilder::new().open_in_memory()
    }
}

impl<R: Region> Bag<R> {
    /// Wraps `region` as a bag.
    ///
    /// An empty region is initialized with a header and one free entry of
    /// one growth increment. A non-empty region must carry a valid header
    /// and a well-formed entry chain.
    pub fn from_region(mut region: R, config: BagConfig) -> Result<Self> {
        if region.is_empty() {
            BagHeader::initialize(&mut region, config.growth_increment())?;
            info!(len = region.len(), "initialized new bag region");
        } else {
            BagHeader::validate(&region)
                .inspect_err(|e| warn!(error = %e, "rejected bag region"))?;
        }

        let bag = Self {
            region,
            config,
            poison: OnceCell::new(),
        };

        bag.check()
            .inspect_err(|e| warn!(error = %e, "bag failed integrity check on open"))?;

        info!(len = bag.region.len(), "opened bag");
        Ok(bag)
    }

    /// Returns the stored strings in ascending offset order.
    pub fn list(&self) -> Result<Vec<String>> {
        self.ensure_usable()?;

        let keys = EntryCursor::new(self.region.as_bytes())
            .keys()
            .map(|key| key.map(|k| String::from_utf8_lossy(k).into_owned()))
            .collect::<Result<Vec<_>>>();

        self.poison_on_corruption(keys)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.ensure_usable()?;
        let found = self.find(key);
        self.poison_on_corruption(found).map(|entry| entry.is_some())
    }

    /// Number of stored strings.
    pub fn len(&self) -> Result<usize> {
        self.stats().map(|stats| stats.allocated_count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Raw cursor over every entry, free and allocated.
    pub fn entries(&self) -> EntryCursor<'_> {
        EntryCursor::new(self.region.as_bytes())
    }

    /// Audits the whole region.
    ///
    /// Verifies that the entries tile the region exactly (the sum of their
    /// sizes equals the region length minus the header) and that no string
    /// is stored twice.
    pub fn check(&self) -> Result<()> {
        self.ensure_usable()?;
        let result = self.audit();
        self.poison_on_corruption(result)
    }

    fn audit(&self) -> Result<()> {
        let bytes = self.region.as_bytes();
        let mut total = 0usize;
        let mut seen: HashSet<&[u8]> = HashSet::new();

        for entry in EntryCursor::new(bytes) {
            let entry = entry?;
            total += entry.size();

            if entry.is_allocated() && !seen.insert(entry.key(bytes)?) {
                bail!(BagError::corrupt(entry.offset(), "key is stored twice"));
            }
        }

        let expected = bytes.len().saturating_sub(BAG_HEADER_SIZE);
        if total != expected {
            bail!(BagError::corrupt(
                BAG_HEADER_SIZE,
                format!(
                    "entries span {} bytes but the region holds {} after the header",
                    total, expected
                )
            ));
        }

        Ok(())
    }

    pub fn sync(&self) -> Result<()> {
        self.region.sync()
    }

    pub fn config(&self) -> &BagConfig {
        &self.config
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    pub fn into_region(self) -> R {
        self.region
    }

    #[cfg(test)]
    pub(crate) fn region_mut(&mut self) -> &mut R {
        &mut self.region
    }

    pub fn is_poisoned(&self) -> bool {
        self.poison.get().is_some()
    }

    /// Finds the allocated entry holding `key`.
    fn find(&self, key: &str) -> Result<Option<Entry>> {
        let bytes = self.region.as_bytes();

        for entry in EntryCursor::new(bytes) {
            let entry = entry?;
            if entry.is_allocated() && entry.key(bytes)? == key.as_bytes() {
                return Ok(Some(entry));
            }
        }

        Ok(None)
    }

    fn ensure_usable(&self) -> Result<()> {
        match self.poison.get() {
            Some(err) => bail!(err.clone()),
            None => Ok(()),
        }
    }

    fn poison_on_corruption<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if let Some(err @ BagError::CorruptArena { .. }) = BagError::of(e) {
                warn!(error = %err, "bag poisoned by corruption");
                let _ = self.poison.set(err.clone());
            }
        }
        result
    }
}
