//! Hybrid LRU/LFU partition for large chunks
//!
//! Victims are chosen by access count first, but only from the older half
//! of this partition's own recency list, so a heavily reused entry is not
//! dropped for being old and a fresh entry is not dropped for being rarely
//! used yet.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use ahash::RandomState;
use tracing::debug;

use crate::partition::{put_with, Entries, Partition, PutOutcome};

/// Partition evicting the least frequently used entry among the older half
pub struct HybridPartition<K, V> {
    entries: Entries<K, V>,
}

impl<K, V> HybridPartition<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new hybrid partition with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Entries::new(capacity),
        }
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.recency.iter()
    }

    /// Key that would be evicted to make room for `incoming`
    pub fn victim(&self, incoming: Option<&K>) -> Option<K> {
        select_victim(&self.entries, incoming)
    }
}

/// Walk keys by ascending count (older first on ties) and take the first
/// one in the older half of the recency list. Falls back to the overall
/// least used key.
fn select_victim<K, V>(entries: &Entries<K, V>, incoming: Option<&K>) -> Option<K>
where
    K: Hash + Eq + Clone,
{
    let ranks: HashMap<&K, usize, RandomState> = entries
        .recency
        .iter()
        .enumerate()
        .map(|(rank, key)| (key, rank))
        .collect();

    let ranked = entries
        .frequency
        .ranked_by(|key| ranks.get(key).copied().unwrap_or(usize::MAX));

    let mut candidates = ranked
        .iter()
        .map(|&(key, _)| key)
        .filter(|&key| Some(key) != incoming);

    let older: HashSet<&K, RandomState> = entries.recency.older_half().collect();

    if let Some(key) = candidates.clone().find(|&key| older.contains(key)) {
        return Some(key.clone());
    }

    let fallback = candidates.next().cloned();
    if fallback.is_some() {
        debug!("hybrid partition found no old low-frequency entry, using global minimum");
    }
    fallback
}

impl<K, V> Partition<K, V> for HybridPartition<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        self.entries.touch(key)
    }

    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        let outcome = put_with(&mut self.entries, key, value, |entries, incoming| {
            select_victim(entries, Some(incoming))
        });
        if let PutOutcome::Evicted(..) = outcome {
            debug!(capacity = self.entries.capacity(), "hybrid partition evicted entry");
        }
        outcome
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let victim = self.victim(None)?;
        self.entries.take(&victim)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.entries.values.get(key)
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.frequency.get(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
