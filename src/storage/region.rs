//! # Region Abstraction
//!
//! A `Region` is a contiguous, growable byte buffer with a known logical
//! length. The bag allocator is written entirely against this trait, so the
//! same code runs over a memory-mapped file (`MmapRegion`) or a plain heap
//! buffer (`MemRegion`).
//!
//! ## Contract
//!
//! ```text
//! len()            logical length, queried fresh after every grow()
//! as_bytes()       exactly len() bytes
//! as_bytes_mut()   exactly len() bytes, exclusive
//! grow(n)          len() increases by exactly n; existing bytes unchanged
//! sync()           flush to durable storage, if the backend has any
//! ```
//!
//! `grow()` takes `&mut self`, so the borrow checker rules out any slice
//! obtained before the call being used after it. Offsets stay valid across
//! growth because growth only appends.
//!
//! ## Bounds Checking
//!
//! `slice()` and `slice_mut()` are the only accessors the allocator uses for
//! descriptor and payload access. They fail instead of panicking when a
//! range runs past the logical end.

use eyre::{ensure, Result};

use super::{MemRegion, MmapRegion};

pub trait Region {
    fn len(&self) -> usize;

    fn as_bytes(&self) -> &[u8];

    fn as_bytes_mut(&mut self) -> &mut [u8];

    /// Extends the logical length by `additional` bytes.
    ///
    /// New bytes are zeroed for both provided backends, but callers must not
    /// rely on their content.
    fn grow(&mut self, additional: usize) -> Result<()>;

    fn sync(&self) -> Result<()> {
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = checked_end(offset, len, self.len())?;
        Ok(&self.as_bytes()[offset..end])
    }

    fn slice_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let end = checked_end(offset, len, self.len())?;
        Ok(&mut self.as_bytes_mut()[offset..end])
    }
}

fn checked_end(offset: usize, len: usize, region_len: usize) -> Result<usize> {
    let end = offset.checked_add(len);
    ensure!(
        matches!(end, Some(end) if end <= region_len),
        "range {}+{} out of bounds (region length={})",
        offset,
        len,
        region_len
    );
    Ok(offset + len)
}

/// Region backend chosen at open time.
///
/// Lets `Bag` be opened from a file or from memory without making every
/// caller generic over the backend.
#[derive(Debug)]
pub enum AnyRegion {
    Mmap(MmapRegion),
    Memory(MemRegion),
}

impl AnyRegion {
    pub fn is_mmap(&self) -> bool {
        matches!(self, AnyRegion::Mmap(_))
    }

}

impl Region for AnyRegion {
    fn len(&self) -> usize {
        match self {
            AnyRegion::Mmap(r) => r.len(),
            AnyRegion::Memory(r) => r.len(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            AnyRegion::Mmap(r) => r.as_bytes(),
            AnyRegion::Memory(r) => r.as_bytes(),
        }
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            AnyRegion::Mmap(r) => r.as_bytes_mut(),
            AnyRegion::Memory(r) => r.as_bytes_mut(),
        }
    }

    fn grow(&mut self, additional: usize) -> Result<()> {
        match self {
            AnyRegion::Mmap(r) => r.grow(additional),
            AnyRegion::Memory(r) => r.grow(additional),
        }
    }

    fn sync(&self) -> Result<()> {
        match self {
            AnyRegion::Mmap(r) => r.sync(),
            AnyRegion::Memory(r) => r.sync(),
        }
    }
}
