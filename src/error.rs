//! # Bag Error Kinds
//!
//! Every fallible bagdb function returns `eyre::Result`. Outcomes that a
//! caller is expected to branch on are raised as a typed [`BagError`] inside
//! the report, so they can be recovered with [`BagError::of`]:
//!
//! ```ignore
//! match bag.insert("alpha") {
//!     Ok(()) => {}
//!     Err(e) if matches!(BagError::of(&e), Some(BagError::DuplicateKey { .. })) => {}
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! I/O failures from the region (mmap, set_len, msync) are plain eyre reports
//! with context and carry no `BagError`.
//!
//! | Kind                | Mutation? | Fatal? |
//! |---------------------|-----------|--------|
//! | `CorruptArena`      | no        | yes, the bag is poisoned |
//! | `DuplicateKey`      | no        | no     |
//! | `NotFound`          | no        | no     |
//! | `InsufficientSpace` | no        | no     |
//! | `InvalidKey`        | no        | no     |

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BagError {
    /// The header magic is wrong or the entry chain does not tile the region.
    CorruptArena { offset: usize, reason: String },
    DuplicateKey { key: String },
    NotFound { key: String },
    /// A key or a growth step needs `needed` bytes of room and at most
    /// `available` can be had.
    InsufficientSpace { needed: usize, available: usize },
    /// The key cannot be stored without being truncated.
    InvalidKey { reason: &'static str },
}

impl BagError {
    pub fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        BagError::CorruptArena {
            offset,
            reason: reason.into(),
        }
    }

    /// Returns the typed kind carried by `report`, if any.
    pub fn of(report: &eyre::Report) -> Option<&BagError> {
        report.downcast_ref::<BagError>()
    }

    pub fn is_corrupt(report: &eyre::Report) -> bool {
        matches!(Self::of(report), Some(BagError::CorruptArena { .. }))
    }
}

impl fmt::Display for BagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BagError::CorruptArena { offset, reason } => {
                write!(f, "corrupt arena at offset {}: {}", offset, reason)
            }
            BagError::DuplicateKey { key } => write!(f, "duplicate key '{}'", key),
            BagError::NotFound { key } => write!(f, "key '{}' not found", key),
            BagError::InsufficientSpace { needed, available } => write!(
                f,
                "insufficient space: {} bytes needed but at most {} available",
                needed, available
            ),
            BagError::InvalidKey { reason } => write!(f, "invalid key: {}", reason),
        }
    }
}

impl std::error::Error for BagError {}
