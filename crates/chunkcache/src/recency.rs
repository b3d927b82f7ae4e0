//! Recency order shared by both partition policies
//!
//! Keys live in a slab-backed doubly-linked list, oldest at the head and
//! most recently used at the tail. A key-to-slot map gives O(1) touch and
//! removal and makes duplicate entries impossible.

use std::collections::HashMap;
use std::hash::Hash;
use ahash::RandomState;

/// Slot in the recency list
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Oldest-to-newest ordering of keys
pub struct RecencyList<K> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
}

impl<K> RecencyList<K>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty list sized for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
        }
    }

    /// Append `key` as most recently used, or move it there if present
    pub fn push_back(&mut self, key: K) {
        if let Some(&idx) = self.map.get(&key) {
            self.move_to_back(idx);
            return;
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            prev: self.tail,
            next: None,
        });

        if let Some(tail_idx) = self.tail {
            if let Some(tail) = &mut self.nodes[tail_idx] {
                tail.next = Some(idx);
            }
        }

        self.tail = Some(idx);
        if self.head.is_none() {
            self.head = Some(idx);
        }

        self.map.insert(key, idx);
    }

    /// Mark `key` as most recently used. Returns false if absent.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.map.get(key) {
            Some(&idx) => {
                self.move_to_back(idx);
                true
            }
            None => false,
        }
    }

    /// Drop `key` from the order. Returns false if absent.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.map.remove(key) {
            Some(idx) => {
                self.unlink(idx);
                self.nodes[idx] = None;
                self.free_list.push(idx);
                true
            }
            None => false,
        }
    }

    /// Remove and return the least recently used key
    pub fn pop_front(&mut self) -> Option<K> {
        let head_idx = self.head?;
        let key = self.nodes[head_idx].as_ref().map(|node| node.key.clone())?;
        self.remove(&key);
        Some(key)
    }

    /// Least recently used key
    pub fn front(&self) -> Option<&K> {
        self.head
            .and_then(|idx| self.nodes[idx].as_ref())
            .map(|node| &node.key)
    }

    /// Keys in the older half of the order. With an odd length the middle
    /// key counts as old.
    pub fn older_half(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().take(self.len().div_ceil(2))
    }

    /// Iterate keys oldest first
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Check whether `key` is tracked
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Forget every key
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    fn move_to_back(&mut self, idx: usize) {
        if self.tail == Some(idx) {
            return;
        }

        self.unlink(idx);

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = self.tail;
            node.next = None;
        }

        if let Some(tail_idx) = self.tail {
            if let Some(tail) = &mut self.nodes[tail_idx] {
                tail.next = Some(idx);
            }
        }

        self.tail = Some(idx);
        if self.head.is_none() {
            self.head = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = if let Some(node) = &self.nodes[idx] {
            (node.prev, node.next)
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }
}

/// Oldest-first iterator over a [`RecencyList`]
pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    cursor: Option<usize>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.nodes[self.cursor?].as_ref()?;
        self.cursor = node.next;
        Some(&node.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &RecencyList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_push_and_order() {
        let mut list = RecencyList::with_capacity(4);
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);

        assert_eq!(keys(&list), vec![1, 2, 3]);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_push_existing_moves_without_duplicate() {
        let mut list = RecencyList::with_capacity(4);
        list.push_back(1);
        list.push_back(2);
        list.push_back(1);

        assert_eq!(keys(&list), vec![2, 1]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_touch() {
        let mut list = RecencyList::with_capacity(4);
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);

        assert!(list.touch(&1));
        assert_eq!(keys(&list), vec![2, 3, 1]);

        // Touching the tail is a no-op
        assert!(list.touch(&1));
        assert_eq!(keys(&list), vec![2, 3, 1]);

        assert!(!list.touch(&9));
    }

    #[test]
    fn test_remove_middle_and_reuse_slot() {
        let mut list = RecencyList::with_capacity(4);
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);

        assert!(list.remove(&2));
        assert!(!list.remove(&2));
        assert_eq!(keys(&list), vec![1, 3]);

        list.push_back(4);
        assert_eq!(keys(&list), vec![1, 3, 4]);
        assert_eq!(list.nodes.len(), 3);
    }

    #[test]
    fn test_pop_front() {
        let mut list = RecencyList::with_capacity(2);
        list.push_back(1);
        list.push_back(2);

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
    }

    #[test]
    fn test_older_half() {
        let mut list = RecencyList::with_capacity(5);
        for k in 1..=5 {
            list.push_back(k);
        }
        list.touch(&1);

        assert_eq!(list.front(), Some(&2));

        let old: Vec<u32> = list.older_half().copied().collect();
        assert_eq!(old, vec![2, 3, 4]);
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::with_capacity(2);
        list.push_back(1);
        list.push_back(2);
        list.clear();

        assert!(list.is_empty());
        assert!(!list.contains(&1));
        list.push_back(3);
        assert_eq!(keys(&list), vec![3]);
    }
}
