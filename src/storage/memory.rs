//! # In-Memory Region
//!
//! `MemRegion` backs a bag with an owned `Vec<u8>`. It is used for in-memory
//! bags, for transient sessions that must not write back to their file, and
//! throughout the test suite.

use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};

use super::Region;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemRegion {
    bytes: Vec<u8>,
}

impl MemRegion {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Loads a private copy of the file at `path`. A missing file yields an
    /// empty region; the file is never created or written.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::new());
        }

        let bytes = fs::read(path)
            .wrap_err_with(|| format!("failed to read bag file '{}'", path.display()))?;

        Ok(Self { bytes })
    }
}

impl Region for MemRegion {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn grow(&mut self, additional: usize) -> Result<()> {
        self.bytes.resize(self.bytes.len() + additional, 0);
        Ok(())
    }
}
