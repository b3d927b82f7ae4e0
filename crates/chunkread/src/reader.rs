//! Chunk reader: cache-first reads with delayed backfill of large chunks

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use chunkcache::{ChunkClass, HybridCache};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::source::ChunkSource;

/// Cache keyed by chunk offset
pub type ChunkCache = HybridCache<u64, Bytes>;

/// Reads chunks through the cache, falling back to a [`ChunkSource`]
pub struct ChunkReader<S> {
    cache: Arc<ChunkCache>,
    source: Arc<S>,
    backfill_delay: Duration,
    /// Offsets with a large-chunk backfill scheduled or running
    in_flight: Arc<Mutex<HashMap<u64, AbortHandle>>>,
    backfills: JoinSet<Result<u64>>,
}

impl<S: ChunkSource> ChunkReader<S> {
    /// Create a reader; large-chunk backfills start after `backfill_delay`
    pub fn new(cache: Arc<ChunkCache>, source: Arc<S>, backfill_delay: Duration) -> Self {
        Self {
            cache,
            source,
            backfill_delay,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            backfills: JoinSet::new(),
        }
    }

    /// Cache shared with the backfill tasks
    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Read the small chunk at `offset`
    ///
    /// A missing small chunk is fetched and cached on the spot. A missing
    /// large chunk for the same offset is fetched later in the background,
    /// anticipating a large read of the same region.
    pub async fn read_small(&mut self, offset: u64) -> Result<Bytes> {
        let small = self.cache.get(ChunkClass::Small, &offset);
        let large_cached = self.cache.get(ChunkClass::Large, &offset).is_some();

        if let (Some(chunk), true) = (&small, large_cached) {
            return Ok(chunk.clone());
        }

        let chunk = match small {
            Some(chunk) => chunk,
            None => self.fetch(offset, ChunkClass::Small).await?,
        };

        if !large_cached {
            self.schedule_backfill(offset);
        }

        Ok(chunk)
    }

    /// Read the large chunk at `offset`, fetching it on a miss
    ///
    /// A pending backfill for the same offset is cancelled so the chunk is
    /// read from the store only once.
    pub async fn read_large(&mut self, offset: u64) -> Result<Bytes> {
        if let Some(chunk) = self.cache.get(ChunkClass::Large, &offset) {
            return Ok(chunk);
        }

        if let Some(handle) = self.in_flight.lock().remove(&offset) {
            debug!("Cancelling backfill for offset {}, reading it now", offset);
            handle.abort();
        }

        self.fetch(offset, ChunkClass::Large).await
    }

    async fn fetch(&self, offset: u64, class: ChunkClass) -> Result<Bytes> {
        let chunk = self
            .source
            .read(offset, class)
            .await
            .with_context(|| format!("failed to read {} chunk at offset {}", class, offset))?;
        self.cache.put(class, offset, chunk.clone());
        Ok(chunk)
    }

    /// Queue a delayed fetch of the large chunk at `offset`.
    /// Returns false if one is already pending for that offset.
    pub fn schedule_backfill(&mut self, offset: u64) -> bool {
        // Held across the spawn so the task cannot finish before it is registered
        let mut in_flight = self.in_flight.lock();
        if in_flight.contains_key(&offset) {
            debug!("Backfill for offset {} already pending", offset);
            return false;
        }

        info!("No large chunk cached for offset {}, scheduling backfill", offset);

        let cache = Arc::clone(&self.cache);
        let source = Arc::clone(&self.source);
        let pending = Arc::clone(&self.in_flight);
        let delay = self.backfill_delay;

        let handle = self.backfills.spawn(async move {
            tokio::time::sleep(delay).await;
            let result = source.read(offset, ChunkClass::Large).await;

            // A chunk cached meanwhile keeps its recency and frequency
            if let Ok(chunk) = &result {
                if cache.contains(ChunkClass::Large, &offset) {
                    debug!("Large chunk at offset {} already cached, dropping backfill", offset);
                } else {
                    cache.put(ChunkClass::Large, offset, chunk.clone());
                }
            }
            pending.lock().remove(&offset);

            result.with_context(|| format!("backfill of large chunk at offset {} failed", offset))?;
            Ok(offset)
        });
        in_flight.insert(offset, handle);

        true
    }

    /// Number of backfills not yet collected by [`drain_backfills`](Self::drain_backfills)
    pub fn pending_backfills(&self) -> usize {
        self.backfills.len()
    }

    /// Wait for every scheduled backfill and return the failures.
    /// Cancelled backfills are not failures.
    pub async fn drain_backfills(&mut self) -> Vec<anyhow::Error> {
        let mut failures = Vec::new();

        while let Some(joined) = self.backfills.join_next().await {
            match joined {
                Ok(Ok(offset)) => debug!("Backfilled large chunk at offset {}", offset),
                Ok(Err(e)) => {
                    warn!("{:#}", e);
                    failures.push(e);
                }
                Err(e) if e.is_cancelled() => debug!("Backfill cancelled"),
                Err(e) => {
                    warn!("Backfill task aborted: {}", e);
                    failures.push(anyhow!(e));
                }
            }
        }

        failures
    }
}
