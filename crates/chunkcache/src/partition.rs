//! Partition abstraction
//!
//! A partition is a capacity-limited sub-cache with one eviction policy.
//! [`Entries`] holds the bookkeeping both policies share: storage, recency
//! order and access counts, kept in lockstep.

use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

use crate::frequency::FrequencyTable;
use crate::recency::RecencyList;

/// What a [`Partition::put`] did to the partition
#[derive(Debug, PartialEq, Eq)]
pub enum PutOutcome<K, V> {
    /// New key stored without eviction
    Inserted,
    /// Existing key overwritten; carries the previous value
    Updated(V),
    /// New key stored after evicting this entry
    Evicted(K, V),
}

/// Sub-cache with a fixed item capacity and its own eviction policy
pub trait Partition<K, V> {
    /// Look up `key`, refreshing its recency and frequency on a hit
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Insert or update `key`, evicting first if a new key would overflow
    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V>;

    /// Evict the entry this policy considers least valuable
    fn evict(&mut self) -> Option<(K, V)>;

    /// Remove `key` explicitly
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Look up `key` without touching bookkeeping
    fn peek(&self, key: &K) -> Option<&V>;

    /// Access count of `key`
    fn frequency(&self, key: &K) -> Option<u64>;

    /// Number of stored entries
    fn len(&self) -> usize;

    /// Maximum number of entries
    fn capacity(&self) -> usize;

    /// Drop every entry
    fn clear(&mut self);

    /// Check whether `key` is stored
    fn contains(&self, key: &K) -> bool {
        self.peek(key).is_some()
    }

    /// Check if the partition is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Upper bound on slots reserved up front; larger partitions grow on demand
pub(crate) const PREALLOC_LIMIT: usize = 1024;

/// Storage plus recency and frequency bookkeeping for one partition
pub(crate) struct Entries<K, V> {
    pub(crate) values: HashMap<K, V, RandomState>,
    pub(crate) recency: RecencyList<K>,
    pub(crate) frequency: FrequencyTable<K>,
    capacity: usize,
}

impl<K, V> Entries<K, V>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");

        let reserve = capacity.min(PREALLOC_LIMIT);
        Self {
            values: HashMap::with_capacity_and_hasher(reserve, RandomState::new()),
            recency: RecencyList::with_capacity(reserve),
            frequency: FrequencyTable::with_capacity(reserve),
            capacity,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// True when inserting `key` requires an eviction first
    pub(crate) fn needs_eviction(&self, key: &K) -> bool {
        self.values.len() >= self.capacity && !self.values.contains_key(key)
    }

    /// Hit path: bump recency and count
    pub(crate) fn touch(&mut self, key: &K) -> Option<&V> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.recency.touch(key);
        self.frequency.increment(key);
        self.values.get(key)
    }

    /// Store `key` as most recently used with a fresh count of 1.
    /// Returns the previous value when the key was already present.
    pub(crate) fn store(&mut self, key: K, value: V) -> Option<V> {
        self.recency.push_back(key.clone());
        self.frequency.reset(key.clone());
        self.values.insert(key, value)
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.values.remove(key)?;
        self.recency.remove(key);
        self.frequency.remove(key);
        Some(value)
    }

    /// Remove `key` and hand back the owned pair
    pub(crate) fn take(&mut self, key: &K) -> Option<(K, V)> {
        let (key, value) = self.values.remove_entry(key)?;
        self.recency.remove(&key);
        self.frequency.remove(&key);
        Some((key, value))
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
        self.recency.clear();
        self.frequency.clear();
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert!(self.values.len() <= self.capacity);
        assert_eq!(self.values.len(), self.recency.len());
        assert_eq!(self.values.len(), self.frequency.len());
        for key in self.values.keys() {
            assert!(self.recency.contains(key));
            assert!(self.frequency.get(key).is_some());
        }
    }
}

/// Shared put flow: evict via `pick_victim` if needed, then store
pub(crate) fn put_with<K, V, F>(
    entries: &mut Entries<K, V>,
    key: K,
    value: V,
    pick_victim: F,
) -> PutOutcome<K, V>
where
    K: Hash + Eq + Clone,
    F: FnOnce(&Entries<K, V>, &K) -> Option<K>,
{
    let evicted = if entries.needs_eviction(&key) {
        pick_victim(entries, &key).and_then(|victim| entries.take(&victim))
    } else {
        None
    };

    match (entries.store(key, value), evicted) {
        (Some(previous), _) => PutOutcome::Updated(previous),
        (None, Some((k, v))) => PutOutcome::Evicted(k, v),
        (None, None) => PutOutcome::Inserted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_store_and_touch() {
        let mut entries = Entries::new(2);
        assert_eq!(entries.store("a", 1), None);
        assert_eq!(entries.touch(&"a"), Some(&1));
        assert_eq!(entries.frequency.get(&"a"), Some(2));

        // Re-store restarts the count
        assert_eq!(entries.store("a", 5), Some(1));
        assert_eq!(entries.frequency.get(&"a"), Some(1));
        assert_eq!(entries.len(), 1);
        entries.assert_consistent();
    }

    #[test]
    fn test_entries_miss_does_not_mutate() {
        let mut entries: Entries<&str, i32> = Entries::new(2);
        assert_eq!(entries.touch(&"nope"), None);
        assert!(entries.frequency.is_empty());
        assert!(entries.recency.is_empty());
    }

    #[test]
    fn test_needs_eviction() {
        let mut entries = Entries::new(1);
        assert!(!entries.needs_eviction(&"a"));
        entries.store("a", 1);
        assert!(!entries.needs_eviction(&"a"));
        assert!(entries.needs_eviction(&"b"));
    }

    #[test]
    fn test_take_removes_everywhere() {
        let mut entries = Entries::new(2);
        entries.store("a", 1);
        entries.store("b", 2);

        assert_eq!(entries.take(&"a"), Some(("a", 1)));
        assert_eq!(entries.remove(&"a"), None);
        entries.assert_consistent();
        assert_eq!(entries.recency.front(), Some(&"b"));
    }

    #[test]
    fn test_huge_capacity_reserves_lazily() {
        let mut entries = Entries::new(usize::MAX / 2);
        assert_eq!(entries.capacity(), usize::MAX / 2);
        assert!(entries.values.capacity() < 4 * PREALLOC_LIMIT);

        entries.store(1u64, 1u64);
        assert!(!entries.needs_eviction(&2));
        entries.assert_consistent();
    }

    #[test]
    #[should_panic(expected = "Capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        let _entries: Entries<u32, u32> = Entries::new(0);
    }
}
