//! Cache sizing
//!
//! The total budget is split between the two partitions by a fraction, and
//! each partition's item capacity is its share divided by its chunk size.

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkClass;
use crate::error::{Error, Result};

/// Size units per megabyte (budgets are counted in kilobytes)
pub const UNITS_PER_MB: u64 = 1024;

/// Construction parameters for a [`HybridCache`](crate::HybridCache)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Total budget in size units
    pub total_units: u64,

    /// Portion of the budget reserved for small chunks, in `[0, 1]`
    pub small_fraction: f64,
}

/// Item capacities derived from a [`CacheConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    /// Max entries in the small partition
    pub small: usize,
    /// Max entries in the large partition
    pub large: usize,
}

impl Capacities {
    /// Capacity of the partition serving `class`
    pub fn of(&self, class: ChunkClass) -> usize {
        match class {
            ChunkClass::Small => self.small,
            ChunkClass::Large => self.large,
        }
    }
}

impl CacheConfig {
    /// Budget given directly in size units
    pub fn new(total_units: u64, small_fraction: f64) -> Self {
        Self {
            total_units,
            small_fraction,
        }
    }

    /// Budget given in megabytes
    pub fn from_megabytes(megabytes: u64, small_fraction: f64) -> Self {
        Self::new(megabytes.saturating_mul(UNITS_PER_MB), small_fraction)
    }

    /// Budget (in size units) assigned to `class`
    pub fn budget(&self, class: ChunkClass) -> u64 {
        let share = match class {
            ChunkClass::Small => self.small_fraction,
            ChunkClass::Large => 1.0 - self.small_fraction,
        };
        (self.total_units as f64 * share).floor() as u64
    }

    /// Validate the split and compute per-partition capacities
    pub fn capacities(&self) -> Result<Capacities> {
        if !(0.0..=1.0).contains(&self.small_fraction) {
            return Err(Error::InvalidSplit(self.small_fraction));
        }

        let capacity = |class: ChunkClass| -> Result<usize> {
            let budget = self.budget(class);
            let items = budget / u64::from(class.size());
            if items == 0 {
                return Err(Error::ZeroCapacity {
                    chunk_size: class.size(),
                    budget,
                });
            }
            Ok(usize::try_from(items).unwrap_or(usize::MAX))
        };

        Ok(Capacities {
            small: capacity(ChunkClass::Small)?,
            large: capacity(ChunkClass::Large)?,
        })
    }

    /// Check the config without keeping the result
    pub fn validate(&self) -> Result<()> {
        self.capacities().map(|_| ())
    }
}
