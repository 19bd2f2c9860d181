/*
    oplog.rs - Append-only operation log

    The source of truth for a replica. Entries are stamped locally with a
    timestamp that is pushed past everything the replica has already seen,
    so the canonical replay order (timestamp, device, seq) always extends
    the local commit order. Merging two logs is a union: duplicates are
    dropped by (device, seq), the rest is re-sorted into canonical order.
    Folding the merged log therefore yields the same state on every
    replica, whichever direction the entries traveled.
*/

use super::metadata::OperationMetadata;
use super::store_op::StoreOp;
use super::vector_clock::VectorClock;
use crate::core_store::model::{DeviceId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A stamped operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpLogEntry {
    /// The operation itself
    pub op: StoreOp,

    /// Stamp: device, sequence, timestamp, vector clock
    pub metadata: OperationMetadata,
}

/// Append-only operation log, kept in canonical replay order
#[derive(Debug, Clone, Default)]
pub struct OpLog {
    entries: Vec<OpLogEntry>,

    /// Counters of operations seen per device
    clock: VectorClock,

    /// Highest timestamp seen, local or remote
    max_timestamp: u64,
}

impl OpLog {
    /// Create a new empty operation log
    pub fn new() -> Self {
        OpLog::default()
    }

    /// Stamp a local operation and append it.
    ///
    /// The timestamp is wall time, advanced past the newest entry already
    /// in the log, so the new entry sorts after everything this replica
    /// has observed.
    pub fn stamp(&mut self, device: &DeviceId, op: StoreOp) -> OpLogEntry {
        let seq = self.clock.increment(device);
        let timestamp = Timestamp::now().as_millis().max(self.max_timestamp + 1);
        self.max_timestamp = timestamp;

        let metadata = OperationMetadata::new(device.clone(), seq, timestamp, self.clock.clone());
        let entry = OpLogEntry { op, metadata };
        self.entries.push(entry.clone());
        entry
    }

    /// Stamp a batch of local operations without appending them.
    ///
    /// Lets a caller make the batch durable first and only then merge it;
    /// when persisting fails, the log is left exactly as it was.
    pub fn prepare(&self, device: &DeviceId, ops: Vec<StoreOp>) -> Vec<OpLogEntry> {
        let mut clock = self.clock.clone();
        let mut max_timestamp = self.max_timestamp;

        ops.into_iter()
            .map(|op| {
                let seq = clock.increment(device);
                let timestamp = Timestamp::now().as_millis().max(max_timestamp + 1);
                max_timestamp = timestamp;

                let metadata =
                    OperationMetadata::new(device.clone(), seq, timestamp, clock.clone());
                OpLogEntry { op, metadata }
            })
            .collect()
    }

    /// Merge a batch of entries from a peer (or from the durable log).
    ///
    /// Entries already present are dropped by (device, seq). Returns the
    /// entries that were actually new, in the order they were accepted.
    pub fn merge(&mut self, incoming: Vec<OpLogEntry>) -> Vec<OpLogEntry> {
        let mut seen: HashSet<(DeviceId, u64)> = self
            .entries
            .iter()
            .map(|e| (e.metadata.device.clone(), e.metadata.seq))
            .collect();

        let mut fresh = Vec::new();
        for entry in incoming {
            let id = (entry.metadata.device.clone(), entry.metadata.seq);
            if seen.insert(id) {
                let device = entry.metadata.device.clone();
                let seq = entry.metadata.seq;
                if self.clock.get(&device) < seq {
                    self.clock.set(&device, seq);
                }
                self.max_timestamp = self.max_timestamp.max(entry.metadata.timestamp);
                self.entries.push(entry.clone());
                fresh.push(entry);
            }
        }

        if !fresh.is_empty() {
            self.canonical_sort();
        }
        fresh
    }

    /// Entries a peer with the given clock has not seen yet
    pub fn entries_since(&self, peer: &VectorClock) -> Vec<OpLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.metadata.seq > peer.get(&e.metadata.device))
            .cloned()
            .collect()
    }

    /// All entries, in canonical replay order
    pub fn entries(&self) -> &[OpLogEntry] {
        &self.entries
    }

    /// The replica's view of every device's progress
    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn canonical_sort(&mut self) {
        self.entries.sort_by(|a, b| {
            (a.metadata.timestamp, &a.metadata.device, a.metadata.seq)
                .cmp(&(b.metadata.timestamp, &b.metadata.device, b.metadata.seq))
        });
    }
}
