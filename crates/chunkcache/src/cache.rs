//! HybridCache: routes chunks to the partition of their class

use std::hash::Hash;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::chunk::ChunkClass;
use crate::config::{Capacities, CacheConfig};
use crate::error::{Error, Result};
use crate::hybrid::HybridPartition;
use crate::lru::LruPartition;
use crate::partition::{Partition, PutOutcome};
use crate::stats::{CacheStats, StatsSnapshot};

/// Two-partition chunk cache
///
/// Small chunks live in an LRU partition, large chunks in a hybrid
/// LRU/LFU partition. Each partition sits behind its own lock, so the
/// cache can be shared across threads and the two classes never contend.
pub struct HybridCache<K, V> {
    /// LRU partition for small chunks
    small: Mutex<LruPartition<K, V>>,

    /// Hybrid partition for large chunks
    large: Mutex<HybridPartition<K, V>>,

    small_stats: CacheStats,
    large_stats: CacheStats,

    capacities: Capacities,
}

impl<K, V> HybridCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache sized from a total budget and split fraction
    ///
    /// # Arguments
    /// * `config` - Budget in size units and the small-chunk share
    ///
    /// # Returns
    /// * `Result<HybridCache>` - Fails if either partition would be empty
    pub fn new(config: CacheConfig) -> Result<Self> {
        let capacities = config.capacities()?;
        debug!(
            total_units = config.total_units,
            small_fraction = config.small_fraction,
            small = capacities.small,
            large = capacities.large,
            "sized hybrid cache"
        );
        Ok(Self::from_capacities(capacities))
    }

    /// Create a cache with explicit item capacities
    pub fn with_capacities(small: usize, large: usize) -> Result<Self> {
        for (class, items) in [(ChunkClass::Small, small), (ChunkClass::Large, large)] {
            if items == 0 {
                return Err(Error::ZeroCapacity {
                    chunk_size: class.size(),
                    budget: 0,
                });
            }
        }
        Ok(Self::from_capacities(Capacities { small, large }))
    }

    fn from_capacities(capacities: Capacities) -> Self {
        Self {
            small: Mutex::new(LruPartition::new(capacities.small)),
            large: Mutex::new(HybridPartition::new(capacities.large)),
            small_stats: CacheStats::new(),
            large_stats: CacheStats::new(),
            capacities,
        }
    }

    /// Look up `key` in the partition of `class`
    ///
    /// A hit refreshes that partition's recency and frequency; a miss
    /// changes nothing.
    pub fn get(&self, class: ChunkClass, key: &K) -> Option<V> {
        self.with_partition(class, |partition, stats| match partition.get(key) {
            Some(value) => {
                stats.record_hit();
                trace!(%class, "cache hit");
                Some(value.clone())
            }
            None => {
                stats.record_miss();
                trace!(%class, "cache miss");
                None
            }
        })
    }

    /// Store `value` under `key` in the partition of `class`
    ///
    /// An existing key is updated in place: occupancy stays the same and
    /// the entry is refreshed as if newly inserted.
    pub fn put(&self, class: ChunkClass, key: K, value: V) {
        self.with_partition(class, |partition, stats| match partition.put(key, value) {
            PutOutcome::Inserted => stats.record_insert(),
            PutOutcome::Updated(_) => {
                stats.record_update();
                trace!(%class, "updated entry in place");
            }
            PutOutcome::Evicted(..) => {
                stats.record_insert();
                stats.record_eviction();
            }
        })
    }

    /// [`get`](Self::get) keyed by raw chunk size
    pub fn get_sized(&self, chunk_size: u32, key: &K) -> Result<Option<V>> {
        let class = ChunkClass::from_size(chunk_size)?;
        Ok(self.get(class, key))
    }

    /// [`put`](Self::put) keyed by raw chunk size
    pub fn put_sized(&self, chunk_size: u32, key: K, value: V) -> Result<()> {
        let class = ChunkClass::from_size(chunk_size)?;
        self.put(class, key, value);
        Ok(())
    }

    /// Check for `key` without touching recency or frequency
    pub fn contains(&self, class: ChunkClass, key: &K) -> bool {
        self.with_partition(class, |partition, _| partition.contains(key))
    }

    /// Access count of `key`, if present
    pub fn frequency(&self, class: ChunkClass, key: &K) -> Option<u64> {
        self.with_partition(class, |partition, _| partition.frequency(key))
    }

    /// Current number of entries in the partition of `class`
    pub fn len(&self, class: ChunkClass) -> usize {
        self.with_partition(class, |partition, _| partition.len())
    }

    /// Check if both partitions are empty
    pub fn is_empty(&self) -> bool {
        ChunkClass::ALL.into_iter().all(|class| self.len(class) == 0)
    }

    /// Item capacity of the partition of `class`
    pub fn capacity(&self, class: ChunkClass) -> usize {
        self.capacities.of(class)
    }

    /// Capacities of both partitions
    pub fn capacities(&self) -> Capacities {
        self.capacities
    }

    /// Statistics of the partition of `class`
    pub fn stats(&self, class: ChunkClass) -> &CacheStats {
        match class {
            ChunkClass::Small => &self.small_stats,
            ChunkClass::Large => &self.large_stats,
        }
    }

    /// Snapshot of the statistics of the partition of `class`
    pub fn snapshot(&self, class: ChunkClass) -> StatsSnapshot {
        self.stats(class).snapshot()
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        for class in ChunkClass::ALL {
            self.with_partition(class, |partition, stats| {
                partition.clear();
                stats.reset();
            });
        }
    }

    fn with_partition<R, F>(&self, class: ChunkClass, f: F) -> R
    where
        F: FnOnce(&mut dyn Partition<K, V>, &CacheStats) -> R,
    {
        match class {
            ChunkClass::Small => f(&mut *self.small.lock(), &self.small_stats),
            ChunkClass::Large => f(&mut *self.large.lock(), &self.large_stats),
        }
    }
}
