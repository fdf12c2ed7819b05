//! # bagdb - A Persistent Bag of Strings
//!
//! bagdb stores a set of unique strings inside a single growable region,
//! usually a memory-mapped file. The region carries its own allocator:
//!
//! - **Best-fit allocation**: the smallest free entry that fits is split
//! - **Coalescing**: a freed entry merges with free neighbors on both sides
//! - **Growth**: when nothing fits, the region grows by a fixed increment
//!
//! ## Quick Start
//!
//! ```ignore
//! use bagdb::Bag;
//!
//! let mut bag = Bag::builder()
//!     .path("./words.bag")
//!     .open()?;
//!
//! bag.insert("alpha")?;
//! bag.insert("beta")?;
//! bag.remove("alpha")?;
//!
//! assert_eq!(bag.list()?, vec!["beta"]);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        CLI (REPL / batch)           │
//! ├─────────────────────────────────────┤
//! │   Bag: insert / remove / list       │
//! │   best-fit, split, coalesce, grow   │
//! ├─────────────────────────────────────┤
//! │   Entry codec + cursor + header     │
//! ├─────────────────────────────────────┤
//! │   Region: MmapRegion | MemRegion    │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## File Layout
//!
//! ```text
//! offset 0   header   magic 0xB055 + reserved
//! offset 8   entry    allocated flag, size, NUL-terminated payload
//! ...        entry    entries tile the rest of the file exactly
//! ```
//!
//! ## Module Overview
//!
//! - [`bag`]: the `Bag` facade and its allocator
//! - [`storage`]: regions, header, entry codec, cursor
//! - [`config`]: format constants and growth policy
//! - [`error`]: typed error kinds
//! - [`cli`]: command protocol, REPL and batch sessions

pub mod bag;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;

pub use bag::{Bag, BagBuilder, BagStats};
pub use config::BagConfig;
pub use error::BagError;
pub use storage::{AnyRegion, MemRegion, MmapRegion, Region};
