//! Bounded least-recently-used map used by the plan factory.

use alloc::collections::VecDeque;
use core::hash::Hash;

use hashbrown::HashMap;

/// LRU map with a fixed capacity. Capacity `0` never stores anything.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    /// Least recently used key at the front.
    order: VecDeque<K>,
}

impl<K: Copy + Eq + Hash, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up `key` and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.map.contains_key(key) {
            self.touch(*key);
        }
        self.map.get(key)
    }

    /// Insert `value`, evicting the least recently used entry when full.
    ///
    /// Returns the evicted key, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<K> {
        if self.capacity == 0 {
            return None;
        }
        let mut evicted = None;
        if !self.map.contains_key(&key) && self.map.len() == self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
                evicted = Some(old);
            }
        }
        self.map.insert(key, value);
        self.touch(key);
        evicted
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    fn touch(&mut self, key: K) {
        self.order.retain(|k| *k != key);
        self.order.push_back(key);
    }
}
