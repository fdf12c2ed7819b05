//! # Entry Codec
//!
//! An entry is the unit of allocation inside a bag region: an 8-byte
//! descriptor followed by its payload.
//!
//! ## Descriptor Layout (8 bytes)
//!
//! ```text
//! Offset  Size  Field      Description
//! ------  ----  ---------  ----------------------------------------
//! 0       1     allocated  0 = free, 1 = allocated, anything else is corrupt
//! 1       3     reserved   Zero
//! 4       4     size       Total bytes of descriptor + payload, little-endian
//! ```
//!
//! The flag is a whole byte next to the size field rather than a bit packed
//! into it, so the layout does not depend on compiler bitfield ordering.
//!
//! ## Payload
//!
//! ```text
//! +------------+----------------------------+
//! | descriptor | key bytes ... 0x00 [slack] |
//! +------------+----------------------------+
//! |<------------------ size --------------->|
//! ```
//!
//! An allocated payload is the key followed by a NUL terminator; any slack
//! after the terminator is internal fragmentation. A free payload is
//! unspecified filler.
//!
//! ## Decoding
//!
//! `Entry::decode` is the single point where raw bytes become an entry. It
//! checks that the descriptor fits, that the flag is 0 or 1, that `size`
//! covers at least the descriptor, and that the entry ends inside the region.
//! Any failure is `CorruptArena` at the entry's offset.

use eyre::{bail, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::Region;
use crate::config::{ENTRY_HEADER_SIZE, PAYLOAD_TERMINATOR};
use crate::error::BagError;

const FLAG_FREE: u8 = 0;
const FLAG_ALLOCATED: u8 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct EntryHeader {
    allocated: u8,
    reserved: [u8; 3],
    size: U32,
}

const _: () = assert!(std::mem::size_of::<EntryHeader>() == ENTRY_HEADER_SIZE);

impl EntryHeader {
    pub fn free(size: usize) -> Self {
        Self::with_flag(FLAG_FREE, size)
    }

    pub fn allocated(size: usize) -> Self {
        Self::with_flag(FLAG_ALLOCATED, size)
    }

    fn with_flag(allocated: u8, size: usize) -> Self {
        debug_assert!(size >= ENTRY_HEADER_SIZE && size <= u32::MAX as usize);
        Self {
            allocated,
            reserved: [0u8; 3],
            size: U32::new(size as u32),
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated == FLAG_ALLOCATED
    }

    pub fn size(&self) -> usize {
        self.size.get() as usize
    }

    pub fn write_to<R: Region + ?Sized>(&self, region: &mut R, offset: usize) -> Result<()> {
        region
            .slice_mut(offset, ENTRY_HEADER_SIZE)?
            .copy_from_slice(self.as_bytes());
        Ok(())
    }
}

/// A validated descriptor together with its position in the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    offset: usize,
    allocated: bool,
    size: usize,
}

impl Entry {
    /// Decodes and validates the entry starting at `offset` of `bytes`.
    pub fn decode(bytes: &[u8], offset: usize) -> Result<Self> {
        let end = bytes.len();

        let Some(raw) = offset
            .checked_add(ENTRY_HEADER_SIZE)
            .filter(|&descriptor_end| descriptor_end <= end)
            .map(|descriptor_end| &bytes[offset..descriptor_end])
        else {
            bail!(BagError::corrupt(
                offset,
                format!(
                    "descriptor runs past the logical end ({} bytes left, {} needed)",
                    end.saturating_sub(offset),
                    ENTRY_HEADER_SIZE
                )
            ));
        };

        let header = EntryHeader::ref_from_bytes(raw)
            .map_err(|e| eyre::eyre!("failed to read EntryHeader at {}: {:?}", offset, e))?;

        let allocated = match header.allocated {
            FLAG_FREE => false,
            FLAG_ALLOCATED => true,
            other => bail!(BagError::corrupt(
                offset,
                format!("invalid allocated flag 0x{:02X}", other)
            )),
        };

        let size = header.size();

        if size < ENTRY_HEADER_SIZE {
            bail!(BagError::corrupt(
                offset,
                format!(
                    "entry size {} is smaller than its descriptor ({} bytes)",
                    size, ENTRY_HEADER_SIZE
                )
            ));
        }

        if size > end - offset {
            bail!(BagError::corrupt(
                offset,
                format!(
                    "entry size {} runs past the logical end of the region ({} bytes left)",
                    size,
                    end - offset
                )
            ));
        }

        Ok(Self {
            offset,
            allocated,
            size,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Offset of the first byte after this entry.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    /// Returns the key bytes of an allocated entry, without the terminator.
    pub fn key<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8]> {
        let payload = &bytes[self.offset + ENTRY_HEADER_SIZE..self.end()];

        match payload.iter().position(|&b| b == PAYLOAD_TERMINATOR) {
            Some(len) => Ok(&payload[..len]),
            None => bail!(BagError::corrupt(
                self.offset,
                "allocated payload is not NUL-terminated"
            )),
        }
    }
}

/// Total entry size needed to store `key` with its terminator.
pub fn required_size(key: &str) -> usize {
    ENTRY_HEADER_SIZE + key.len() + 1
}

/// Writes `key` and its terminator into the payload of the entry at `offset`.
pub fn write_key<R: Region + ?Sized>(region: &mut R, offset: usize, key: &str) -> Result<()> {
    let payload = region.slice_mut(offset + ENTRY_HEADER_SIZE, key.len() + 1)?;
    payload[..key.len()].copy_from_slice(key.as_bytes());
    payload[key.len()] = PAYLOAD_TERMINATOR;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemRegion;

    fn region_with(entries: &[(usize, EntryHeader)], len: usize) -> MemRegion {
        let mut region = MemRegion::with_len(len);
        for (offset, header) in entries {
            header.write_to(&mut region, *offset).unwrap();
        }
        region
    }

    #[test]
    fn descriptor_layout_is_flag_then_size() {
        let header = EntryHeader::allocated(14);

        assert_eq!(header.as_bytes(), &[1, 0, 0, 0, 14, 0, 0, 0]);
        assert_eq!(EntryHeader::free(65528).as_bytes(), &[0, 0, 0, 0, 0xF8, 0xFF, 0, 0]);
    }

    #[test]
    fn decode_reads_written_descriptor() {
        let region = region_with(&[(8, EntryHeader::allocated(24))], 64);

        let entry = Entry::decode(region.as_bytes(), 8).unwrap();

        assert_eq!(entry.offset(), 8);
        assert!(entry.is_allocated());
        assert_eq!(entry.size(), 24);
        assert_eq!(entry.end(), 32);
    }

    #[test]
    fn decode_rejects_size_below_descriptor() {
        let mut region = MemRegion::with_len(32);
        region.as_bytes_mut()[8..16].copy_from_slice(&[0, 0, 0, 0, 7, 0, 0, 0]);

        let err = Entry::decode(region.as_bytes(), 8).unwrap_err();

        assert_eq!(
            BagError::of(&err),
            Some(&BagError::corrupt(
                8,
                "entry size 7 is smaller than its descriptor (8 bytes)"
            ))
        );
    }

    #[test]
    fn decode_rejects_entry_past_end() {
        let region = region_with(&[(8, EntryHeader::free(32))], 32);

        let err = Entry::decode(region.as_bytes(), 8).unwrap_err();

        assert!(BagError::is_corrupt(&err));
        assert!(err.to_string().contains("past the logical end"));
    }

    #[test]
    fn decode_rejects_truncated_descriptor() {
        let region = MemRegion::with_len(12);

        let err = Entry::decode(region.as_bytes(), 8).unwrap_err();

        assert!(BagError::is_corrupt(&err));
    }

    #[test]
    fn decode_rejects_unknown_flag() {
        let mut region = region_with(&[(8, EntryHeader::free(16))], 24);
        region.as_bytes_mut()[8] = 0x80;

        let err = Entry::decode(region.as_bytes(), 8).unwrap_err();

        assert!(err.to_string().contains("invalid allocated flag 0x80"));
    }

    #[test]
    fn key_stops_at_terminator() {
        let mut region = region_with(&[(8, EntryHeader::allocated(24))], 32);
        write_key(&mut region, 8, "alpha").unwrap();

        let entry = Entry::decode(region.as_bytes(), 8).unwrap();

        assert_eq!(entry.key(region.as_bytes()).unwrap(), b"alpha");
    }

    #[test]
    fn key_without_terminator_is_corrupt() {
        let mut region = region_with(&[(8, EntryHeader::allocated(12))], 20);
        region.as_bytes_mut()[16..20].copy_from_slice(b"abcd");

        let entry = Entry::decode(region.as_bytes(), 8).unwrap();
        let err = entry.key(region.as_bytes()).unwrap_err();

        assert!(BagError::is_corrupt(&err));
    }

    #[test]
    fn required_size_counts_descriptor_and_terminator() {
        assert_eq!(required_size("alpha"), 14);
        assert_eq!(required_size("beta"), 13);
        assert_eq!(required_size(""), 9);
    }
}
