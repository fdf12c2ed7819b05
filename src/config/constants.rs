//! # bagdb Configuration Constants
//!
//! This module centralizes the numeric constants that define the on-disk
//! format of a bag file and its default growth policy. The format constants
//! are part of the persisted layout: changing any of them makes existing bag
//! files unreadable.
//!
//! ## Dependency Graph
//!
//! ```text
//! GROWTH_INCREMENT (65536 bytes)
//!       │
//!       ├─> initial region length (first initialize)
//!       │
//!       ├─> every grow() appends exactly one increment as one free entry
//!       │
//!       └─> must be > BAG_HEADER_SIZE + ENTRY_HEADER_SIZE so the
//!           first free entry can hold at least its own descriptor
//!
//! ENTRY_HEADER_SIZE (8 bytes)
//!       │
//!       └─> smallest legal entry size; split leftovers below this are
//!           absorbed into the allocation (internal fragmentation)
//!
//! DEFAULT_MAX_REGION_SIZE (1 GiB)
//!       │
//!       └─> growth beyond this is refused with InsufficientSpace
//! ```
//!
//! ## Critical Invariants
//!
//! Enforced by compile-time assertions below:
//!
//! 1. `GROWTH_INCREMENT > BAG_HEADER_SIZE + ENTRY_HEADER_SIZE`
//! 2. `GROWTH_INCREMENT` fits in the u32 `size` field of an entry
//! 3. `DEFAULT_MAX_REGION_SIZE` is a whole number of increments

// ============================================================================
// PERSISTED LAYOUT
// ============================================================================

/// Sentinel stored in the first four bytes of every bag file.
pub const BAG_MAGIC: u32 = 0xB055;

/// Size of the file header: magic (4) + reserved (4).
pub const BAG_HEADER_SIZE: usize = 8;

/// Size of an entry descriptor: allocated (1) + reserved (3) + size (4).
pub const ENTRY_HEADER_SIZE: usize = 8;

/// Payload terminator for allocated entries.
pub const PAYLOAD_TERMINATOR: u8 = 0;

// ============================================================================
// GROWTH POLICY
// ============================================================================

/// Initial region length, and the amount every growth step appends.
pub const GROWTH_INCREMENT: usize = 64 * 1024;

/// Default cap on the logical region length.
pub const DEFAULT_MAX_REGION_SIZE: usize = 1024 * 1024 * 1024;

/// Smallest growth increment a `BagConfig` accepts.
pub const MIN_GROWTH_INCREMENT: usize = BAG_HEADER_SIZE + ENTRY_HEADER_SIZE + 1;

const _: () = assert!(
    GROWTH_INCREMENT > BAG_HEADER_SIZE + ENTRY_HEADER_SIZE,
    "GROWTH_INCREMENT must leave room for the header and one descriptor"
);

const _: () = assert!(
    GROWTH_INCREMENT <= u32::MAX as usize,
    "GROWTH_INCREMENT must fit in an entry size field"
);

const _: () = assert!(
    DEFAULT_MAX_REGION_SIZE % GROWTH_INCREMENT == 0,
    "DEFAULT_MAX_REGION_SIZE must be a whole number of increments"
);

// ============================================================================
// CLI
// ============================================================================

/// Environment variable that overrides the REPL history file location.
pub const HISTORY_ENV_VAR: &str = "BAGDB_HISTORY";

/// History file name, relative to `$HOME`.
pub const DEFAULT_HISTORY_FILE: &str = ".bagdb_history";

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV_VAR: &str = "BAGDB_LOG";

/// Filter used when `BAGDB_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";
