//! LRU (Least Recently Used) partition for small chunks
//!
//! Evicts the oldest entry of the recency list. Access counts are kept
//! alongside but never consulted for eviction.

use std::hash::Hash;
use tracing::debug;

use crate::partition::{put_with, Entries, Partition, PutOutcome};

/// Pure LRU partition with fixed capacity
pub struct LruPartition<K, V> {
    entries: Entries<K, V>,
}

impl<K, V> LruPartition<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU partition with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Entries::new(capacity),
        }
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.recency.iter()
    }
}

impl<K, V> Partition<K, V> for LruPartition<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        self.entries.touch(key)
    }

    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        let outcome = put_with(&mut self.entries, key, value, |entries, _| {
            entries.recency.front().cloned()
        });
        if let PutOutcome::Evicted(..) = outcome {
            debug!(capacity = self.entries.capacity(), "lru partition evicted oldest entry");
        }
        outcome
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let victim = self.entries.recency.front().cloned()?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_basic() {
        let mut cache = LruPartition::new(2);

        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = LruPartition::new(2);

        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.put(3, "c"), PutOutcome::Evicted(1, "a"));

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.get(&3), Some(&"c"));
    }

    #[test]
    fn test_lru_get_protects_from_eviction() {
        let mut cache = LruPartition::new(2);

        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");
        cache.put("c", 3); // Should evict "b"

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn test_lru_first_inserted_evicted() {
        let mut cache = LruPartition::new(3);
        for k in 0..4 {
            cache.put(k, k * 10);
        }

        assert!(!cache.contains(&0));
        let keys: Vec<i32> = cache.keys_by_recency().copied().collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_lru_overwrite() {
        let mut cache = LruPartition::new(2);

        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);
        assert_eq!(cache.put(1, "z"), PutOutcome::Updated("a"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.frequency(&1), Some(1));
        assert_eq!(cache.peek(&1), Some(&"z"));

        // No duplicate recency entries after repeated puts
        cache.put(1, "y");
        cache.put(1, "x");
        let keys: Vec<i32> = cache.keys_by_recency().copied().collect();
        assert_eq!(keys, vec![2, 1]);

        // 2 is now the oldest
        cache.put(3, "c");
        assert!(!cache.contains(&2));
        assert!(cache.contains(&1));
        cache.entries.assert_consistent();
    }

    #[test]
    fn test_lru_frequency_counts_hits() {
        let mut cache = LruPartition::new(2);
        cache.put("a", 1);
        for _ in 0..3 {
            assert_eq!(cache.get(&"a"), Some(&1));
        }
        assert_eq!(cache.frequency(&"a"), Some(4));

        // Miss leaves everything alone
        assert_eq!(cache.get(&"zz"), None);
        assert_eq!(cache.frequency(&"zz"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_evict_and_remove() {
        let mut cache = LruPartition::new(3);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");

        assert_eq!(cache.remove(&2), Some("b"));
        assert_eq!(cache.evict(), Some((1, "a")));
        assert_eq!(cache.len(), 1);
        cache.entries.assert_consistent();

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.evict(), None);
    }

    #[test]
    fn test_lru_capacity_invariant() {
        let mut cache = LruPartition::new(5);
        for i in 0..200u32 {
            cache.put(i % 17, i);
            if i % 3 == 0 {
                cache.get(&(i % 7));
            }
            assert!(cache.len() <= cache.capacity());
        }
        cache.entries.assert_consistent();
    }
}
