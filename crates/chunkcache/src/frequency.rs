//! Per-key access counters

use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

/// Access counts keyed by cache key
pub struct FrequencyTable<K> {
    counts: HashMap<K, u64, RandomState>,
}

impl<K> FrequencyTable<K>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty table sized for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Start counting `key` at 1, replacing any previous count
    pub fn reset(&mut self, key: K) {
        self.counts.insert(key, 1);
    }

    /// Bump the count for `key` and return the new value
    pub fn increment(&mut self, key: &K) -> u64 {
        match self.counts.get_mut(key) {
            Some(count) => {
                *count = count.saturating_add(1);
                *count
            }
            None => {
                self.counts.insert(key.clone(), 1);
                1
            }
        }
    }

    /// Current count for `key`
    pub fn get(&self, key: &K) -> Option<u64> {
        self.counts.get(key).copied()
    }

    /// Stop counting `key`
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        self.counts.remove(key)
    }

    /// Number of counted keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no key is counted
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Forget every count
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Keys sorted by ascending count. `tie_rank` orders keys with equal
    /// counts (lower ranks first).
    pub fn ranked_by<F>(&self, mut tie_rank: F) -> Vec<(&K, u64)>
    where
        F: FnMut(&K) -> usize,
    {
        let mut ranked: Vec<(usize, &K, u64)> = self
            .counts
            .iter()
            .map(|(key, &count)| (tie_rank(key), key, count))
            .collect();
        ranked.sort_unstable_by_key(|&(tie, _, count)| (count, tie));
        ranked.into_iter().map(|(_, key, count)| (key, count)).collect()
    }
}
