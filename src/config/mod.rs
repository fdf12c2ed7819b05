//! # bagdb Configuration Module
//!
//! Format constants and default policies live in [`constants`]. The runtime
//! knobs a caller may change per bag are collected in [`BagConfig`].

pub mod constants;
pub use constants::*;

use eyre::{ensure, Result};

/// Growth policy for a single bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagConfig {
    growth_increment: usize,
    max_region_size: usize,
}

impl BagConfig {
    pub fn new(growth_increment: usize, max_region_size: usize) -> Result<Self> {
        ensure!(
            growth_increment >= MIN_GROWTH_INCREMENT,
            "growth increment {} is smaller than the minimum {}",
            growth_increment,
            MIN_GROWTH_INCREMENT
        );
        ensure!(
            growth_increment <= u32::MAX as usize,
            "growth increment {} does not fit in an entry size field",
            growth_increment
        );
        ensure!(
            max_region_size >= growth_increment,
            "max region size {} is smaller than one growth increment {}",
            max_region_size,
            growth_increment
        );
        ensure!(
            max_region_size <= u32::MAX as usize,
            "max region size {} exceeds the largest addressable entry span",
            max_region_size
        );

        Ok(Self {
            growth_increment,
            max_region_size,
        })
    }

    pub fn growth_increment(&self) -> usize {
        self.growth_increment
    }

    pub fn max_region_size(&self) -> usize {
        self.max_region_size
    }
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            growth_increment: GROWTH_INCREMENT,
            max_region_size: DEFAULT_MAX_REGION_SIZE,
        }
    }
}
