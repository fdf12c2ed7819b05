//! # Bag Builder
//!
//! `BagBuilder` configures and opens a bag. Settings are chained before
//! calling `open()` (file-backed) or `open_in_memory()`.
//!
//! ## Configuration Options
//!
//! | Option            | Default  | Description                                  |
//! |-------------------|----------|----------------------------------------------|
//! | path              | none     | Bag file; required by `open()`               |
//! | transient         | false    | Work on a private in-memory copy of the file |
//! | growth_increment  | 64 KiB   | Initial region length and growth step        |
//! | max_region_size   | 1 GiB    | Growth beyond this is `InsufficientSpace`    |
//!
//! ## Usage Examples
//!
//! ```ignore
//! let bag = Bag::builder()
//!     .path("./words.bag")
//!     .open()?;
//!
//! // Inspect a bag without ever writing to it.
//! let bag = Bag::builder()
//!     .path("./words.bag")
//!     .transient(true)
//!     .open()?;
//! ```
//!
//! A transient bag loads the file once. Nothing is written back, and a
//! missing file is not created.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use tracing::debug;

use super::Bag;
use crate::config::{BagConfig, DEFAULT_MAX_REGION_SIZE, GROWTH_INCREMENT};
use crate::storage::{AnyRegion, MemRegion, MmapRegion};

#[derive(Debug, Clone, Default)]
pub struct BagBuilder {
    path: Option<PathBuf>,
    transient: bool,
    growth_increment: Option<usize>,
    max_region_size: Option<usize>,
}

impl BagBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bag file. It is created on `open()` if it does not exist.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// When enabled, `open()` reads the file into memory instead of mapping
    /// it, so no change ever reaches the file.
    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// Sets the initial region length and the amount added by each growth.
    ///
    /// Existing files keep their length; only future growth uses this value.
    pub fn growth_increment(mut self, bytes: usize) -> Self {
        self.growth_increment = Some(bytes);
        self
    }

    pub fn max_region_size(mut self, bytes: usize) -> Self {
        self.max_region_size = Some(bytes);
        self
    }

    /// Opens or creates the bag file with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No path was specified
    /// - The growth settings are invalid
    /// - The file cannot be opened, mapped, or read
    /// - The file is not a bag or its entry chain is corrupt
    pub fn open(self) -> Result<Bag> {
        let config = self.config()?;
        let path = self
            .get_path()
            .ok_or_else(|| eyre::eyre!("bag path not specified: call .path() first"))?;

        let region = if self.is_transient() {
            AnyRegion::Memory(MemRegion::load(path)?)
        } else {
            AnyRegion::Mmap(MmapRegion::open(path)?)
        };
        debug!(path = %path.display(), mmap = region.is_mmap(), "opening bag");

        Bag::from_region(region, config)
            .wrap_err_with(|| format!("failed to open bag '{}'", path.display()))
    }

    /// Creates an empty bag backed by memory only. Any configured path is
    /// ignored.
    pub fn open_in_memory(self) -> Result<Bag> {
        let config = self.config()?;
        Bag::from_region(AnyRegion::Memory(MemRegion::new()), config)
    }

    fn config(&self) -> Result<BagConfig> {
        BagConfig::new(
            self.growth_increment.unwrap_or(GROWTH_INCREMENT),
            self.max_region_size.unwrap_or(DEFAULT_MAX_REGION_SIZE),
        )
    }

    pub fn get_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }
}
