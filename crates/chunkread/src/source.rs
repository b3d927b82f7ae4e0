//! Backing store the reader fetches chunks from

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chunkcache::ChunkClass;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// Slow key-value fetch of one chunk
#[async_trait]
pub trait ChunkSource: Send + Sync + 'static {
    /// Fetch the chunk of `class` starting at `offset`
    async fn read(&self, offset: u64, class: ChunkClass) -> Result<Bytes>;
}

/// In-memory stand-in for a disk or database: every read sleeps for a fixed
/// latency and returns a payload naming the chunk.
pub struct SimulatedStore {
    latency: Duration,
    reads: AtomicU64,
    failing: HashSet<u64>,
}

impl SimulatedStore {
    /// Create a store where every read takes `latency`
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            reads: AtomicU64::new(0),
            failing: HashSet::new(),
        }
    }

    /// Make every read of `offset` fail
    pub fn with_failing_offset(mut self, offset: u64) -> Self {
        self.failing.insert(offset);
        self
    }

    /// Number of reads served so far, failed ones included
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Payload the store returns for a chunk
    pub fn payload(offset: u64, class: ChunkClass) -> Bytes {
        Bytes::from(format!("offset{}_{}kb", offset, class.size()))
    }
}

#[async_trait]
impl ChunkSource for SimulatedStore {
    async fn read(&self, offset: u64, class: ChunkClass) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        info!("Reading from store: offset {} size {}", offset, class.size());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.failing.contains(&offset) {
            bail!("read failed at offset {}", offset);
        }

        Ok(Self::payload(offset, class))
    }
}
