//! # Bag File Header
//!
//! Every bag region begins with an 8-byte header identifying it as a bag.
//!
//! ## Header Layout
//!
//! ```text
//! Offset  Size  Field     Description
//! ------  ----  --------  ----------------------------------------
//! 0       4     magic     0x0000B055, little-endian
//! 4       4     reserved  Zero; reserved for future metadata
//! ```
//!
//! The entry chain starts at offset 8, immediately after the header.
//!
//! ## Lifecycle
//!
//! - `initialize()` runs exactly once, when a region is brand new (length 0).
//!   It grows the region by one increment, writes the header and a single
//!   free entry spanning the rest of the region.
//! - `validate()` runs every time an existing, non-empty region is opened.
//!
//! ## Zerocopy Safety
//!
//! `BagHeader` derives the zerocopy traits and is `Unaligned`, so it can be
//! viewed in place at offset 0 of any mapping.

use eyre::{bail, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::entry::EntryHeader;
use super::Region;
use crate::config::{BAG_HEADER_SIZE, BAG_MAGIC};
use crate::error::BagError;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct BagHeader {
    magic: U32,
    reserved: [u8; 4],
}

const _: () = assert!(std::mem::size_of::<BagHeader>() == BAG_HEADER_SIZE);

impl BagHeader {
    pub fn new() -> Self {
        Self {
            magic: U32::new(BAG_MAGIC),
            reserved: [0u8; 4],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        if bytes.len() < BAG_HEADER_SIZE {
            bail!(BagError::corrupt(
                0,
                format!(
                    "region of {} bytes is too small for a header ({} bytes)",
                    bytes.len(),
                    BAG_HEADER_SIZE
                )
            ));
        }

        let header = Self::ref_from_bytes(&bytes[..BAG_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse BagHeader: {:?}", e))?;

        if header.magic() != BAG_MAGIC {
            bail!(BagError::corrupt(
                0,
                format!(
                    "invalid magic 0x{:08X} (expected 0x{:08X})",
                    header.magic(),
                    BAG_MAGIC
                )
            ));
        }

        Ok(header)
    }

    pub fn magic(&self) -> u32 {
        self.magic.get()
    }

    /// Writes a fresh header and one free entry spanning a new region.
    ///
    /// The region must be empty; it is grown by `initial_len` bytes first.
    pub fn initialize<R: Region + ?Sized>(region: &mut R, initial_len: usize) -> Result<()> {
        eyre::ensure!(
            region.is_empty(),
            "cannot initialize a region that already holds {} bytes",
            region.len()
        );

        region.grow(initial_len)?;

        region
            .slice_mut(0, BAG_HEADER_SIZE)?
            .copy_from_slice(Self::new().as_bytes());

        let first = EntryHeader::free(initial_len - BAG_HEADER_SIZE);
        first.write_to(region, BAG_HEADER_SIZE)?;

        Ok(())
    }

    /// Fails with `CorruptArena` unless the region starts with a valid header.
    pub fn validate<R: Region + ?Sized>(region: &R) -> Result<()> {
        Self::from_bytes(region.as_bytes()).map(|_| ())
    }
}

impl Default for BagHeader {
    fn default() -> Self {
        Self::new()
    }
}
