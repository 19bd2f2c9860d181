/*
    vector_clock.rs - Vector clock for causal bookkeeping

    Tracks, per device, how many operations of that device a replica has
    seen. Used to compute deltas during anti-entropy exchange and to
    detect concurrent histories.
*/

use crate::core_store::model::DeviceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vector clock keyed by device id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock {
    clock: BTreeMap<DeviceId, u64>,
}

impl VectorClock {
    /// Create a new empty vector clock
    pub fn new() -> Self {
        VectorClock { clock: BTreeMap::new() }
    }

    /// Advance the clock for a device by one, returning the new value
    pub fn increment(&mut self, device: &DeviceId) -> u64 {
        let counter = self.clock.entry(device.clone()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Get the counter for a device (0 when never seen)
    pub fn get(&self, device: &DeviceId) -> u64 {
        self.clock.get(device).copied().unwrap_or(0)
    }

    /// Set the counter for a device
    pub fn set(&mut self, device: &DeviceId, counter: u64) {
        self.clock.insert(device.clone(), counter);
    }

    /// Merge another clock into this one, taking the maximum per device
    pub fn merge(&mut self, other: &VectorClock) {
        for (device, &counter) in &other.clock {
            let current = self.clock.entry(device.clone()).or_insert(0);
            *current = (*current).max(counter);
        }
    }

    /// True if every entry of self is <= other and at least one is strictly less
    pub fn happened_before(&self, other: &VectorClock) -> bool {
        let mut strictly_less = false;

        for (device, &self_count) in &self.clock {
            let other_count = other.get(device);
            if self_count > other_count {
                return false;
            }
            if self_count < other_count {
                strictly_less = true;
            }
        }

        for (device, &other_count) in &other.clock {
            if !self.clock.contains_key(device) && other_count > 0 {
                strictly_less = true;
            }
        }

        strictly_less
    }

    /// True when neither clock happened before the other and they differ
    pub fn is_concurrent(&self, other: &VectorClock) -> bool {
        !self.happened_before(other) && !other.happened_before(self) && self != other
    }

    /// All devices this clock has seen
    pub fn devices(&self) -> impl Iterator<Item = &DeviceId> {
        self.clock.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.clock.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clock.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> DeviceId {
        DeviceId::new(name)
    }

    #[test]
    fn test_new_clock_is_empty() {
        let clock = VectorClock::new();
        assert!(clock.is_empty());
        assert_eq!(clock.get(&device("a")), 0);
    }

    #[test]
    fn test_increment() {
        let mut clock = VectorClock::new();
        assert_eq!(clock.increment(&device("a")), 1);
        assert_eq!(clock.increment(&device("a")), 2);
        assert_eq!(clock.get(&device("a")), 2);
        assert_eq!(clock.len(), 1);
    }

    #[test]
    fn test_merge_takes_maximum() {
        let mut left = VectorClock::new();
        left.set(&device("a"), 3);
        left.set(&device("b"), 1);

        let mut right = VectorClock::new();
        right.set(&device("a"), 2);
        right.set(&device("c"), 5);

        left.merge(&right);
        assert_eq!(left.get(&device("a")), 3);
        assert_eq!(left.get(&device("b")), 1);
        assert_eq!(left.get(&device("c")), 5);
        assert_eq!(left.devices().count(), 3);
    }

    #[test]
    fn test_happened_before() {
        let mut earlier = VectorClock::new();
        earlier.set(&device("a"), 1);

        let mut later = VectorClock::new();
        later.set(&device("a"), 2);
        later.set(&device("b"), 1);

        assert!(earlier.happened_before(&later));
        assert!(!later.happened_before(&earlier));
    }

    #[test]
    fn test_concurrent_clocks() {
        let mut left = VectorClock::new();
        left.set(&device("a"), 1);

        let mut right = VectorClock::new();
        right.set(&device("b"), 1);

        assert!(left.is_concurrent(&right));
        assert!(right.is_concurrent(&left));
        assert!(!left.is_concurrent(&left.clone()));
    }

    #[test]
    fn test_equal_clocks_are_not_ordered() {
        let mut left = VectorClock::new();
        left.set(&device("a"), 2);
        let right = left.clone();

        assert!(!left.happened_before(&right));
        assert!(!right.happened_before(&left));
        assert!(!left.is_concurrent(&right));
    }
}
