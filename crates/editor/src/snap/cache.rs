//! Bounded memo table for snap results.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Entries kept before the oldest is evicted
pub const DEFAULT_SNAP_CACHE_CAPACITY: usize = 1000;

/// Exact-match key over the bit patterns of a snap call's inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapKey {
    Grid {
        position: [u64; 3],
        size: u64,
        divisions: u32,
    },
    Rotation {
        rotation: [u64; 3],
        angle: u64,
    },
}

/// Bit pattern with `-0.0` folded onto `0.0`
fn key_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl SnapKey {
    pub fn grid(position: [f64; 3], size: f64, divisions: u32) -> Self {
        SnapKey::Grid {
            position: position.map(key_bits),
            size: key_bits(size),
            divisions,
        }
    }

    pub fn rotation(rotation: [f64; 3], angle_degrees: f64) -> Self {
        SnapKey::Rotation {
            rotation: rotation.map(key_bits),
            angle: key_bits(angle_degrees),
        }
    }
}

/// FIFO-bounded cache. Eviction follows insertion order, not access order.
#[derive(Debug)]
pub struct SnapCache {
    entries: HashMap<SnapKey, Arc<[f64; 3]>>,
    order: VecDeque<SnapKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for SnapCache {
    fn default() -> Self {
        Self::new(DEFAULT_SNAP_CACHE_CAPACITY)
    }
}

impl SnapCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached value for `key`, computing and storing it on a miss.
    ///
    /// A hit returns the same allocation as the original insert, so
    /// `Arc::ptr_eq` tells a consumer nothing changed.
    pub fn get_or_insert_with(
        &mut self,
        key: SnapKey,
        compute: impl FnOnce() -> [f64; 3],
    ) -> Arc<[f64; 3]> {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(value);
        }

        self.misses += 1;
        let value = Arc::new(compute());
        self.entries.insert(key, Arc::clone(&value));
        self.order.push_back(key);

        if self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        value
    }

    pub fn contains(&self, key: &SnapKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(hits, misses)` since creation or the last clear
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
