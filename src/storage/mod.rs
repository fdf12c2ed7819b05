//! # Storage Module
//!
//! This module provides the byte-level layer of a bag: the growable region
//! that holds it, the file header, the entry codec, and the cursor that walks
//! the entry chain.
//!
//! ## Region Layout
//!
//! ```text
//! 0        8                                                      len
//! +--------+-----------+---------------+-----------+ ... +--------+
//! | header | entry 0   | entry 1       | entry 2   |     | entry N|
//! | magic  | desc|data | desc|data     | desc|data |     |        |
//! +--------+-----------+---------------+-----------+ ... +--------+
//! ```
//!
//! Entries tile the region from offset 8 to the logical end with no gaps and
//! no overlaps, so the sum of all entry sizes is always `len - 8`.
//!
//! ## Backends
//!
//! | Backend      | Backing            | Sync   | Used by                      |
//! |--------------|--------------------|--------|------------------------------|
//! | `MmapRegion` | shared file mmap   | msync  | persistent bags              |
//! | `MemRegion`  | `Vec<u8>`          | no-op  | in-memory and transient bags |
//!
//! Both implement [`Region`]. The allocator only ever reaches the bytes
//! through `Region::slice`/`slice_mut` and `Entry::decode`, which
//! bounds-check every access.
//!
//! ## Module Organization
//!
//! - `region`: the `Region` trait
//! - `memory`: `MemRegion`
//! - `mmap`: `MmapRegion`
//! - `headers`: `BagHeader` (magic, initialize, validate)
//! - `entry`: `EntryHeader` descriptor codec and the validated `Entry`
//! - `cursor`: `EntryCursor` over the entry chain

mod cursor;
mod entry;
mod headers;
mod memory;
mod mmap;
mod region;

pub use cursor::EntryCursor;
pub use entry::{required_size, write_key, Entry, EntryHeader};
pub use headers::BagHeader;
pub use memory::MemRegion;
pub use mmap::MmapRegion;
pub use region::{AnyRegion, Region};
