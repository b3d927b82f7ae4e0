//! # chunkcache
//!
//! Fixed-capacity in-memory cache for chunks read from a slow backing store.
//!
//! ## Architecture
//! - **Small partition**: 8-unit chunks, pure LRU eviction
//! - **Large partition**: 64-unit chunks, hybrid LRU/LFU eviction
//! - **Recency list**: slab-backed doubly-linked list, one per partition (O(1) touch)
//! - **Routing**: every request names its [`ChunkClass`]; partitions share no state
//!
//! The cache never performs I/O. Callers fetch from the backing store and
//! hand the result to [`HybridCache::put`].

#![warn(missing_docs)]

mod cache;
mod chunk;
mod config;
mod error;
mod frequency;
mod hybrid;
mod lru;
mod partition;
mod recency;
mod stats;

pub use cache::HybridCache;
pub use chunk::{ChunkClass, LARGE_CHUNK_SIZE, SMALL_CHUNK_SIZE};
pub use config::{CacheConfig, Capacities, UNITS_PER_MB};
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use hybrid::HybridPartition;
pub use lru::LruPartition;
pub use partition::{Partition, PutOutcome};
pub use recency::{Iter as RecencyIter, RecencyList};
pub use stats::{CacheStats, StatsSnapshot};
