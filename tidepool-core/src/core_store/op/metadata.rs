/*
    metadata.rs - Stamp attached to every logged operation

    The (device, seq) pair identifies an operation globally; the timestamp
    orders operations across devices during replay, with the device id as
    deterministic tiebreaker.
*/

use super::vector_clock::VectorClock;
use crate::core_store::model::DeviceId;
use serde::{Deserialize, Serialize};

/// Metadata attached to every logged operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// Device that created this operation
    pub device: DeviceId,

    /// Per-device sequence number, starting at 1
    pub seq: u64,

    /// Milliseconds since epoch, advanced past everything the device had
    /// seen at stamping time so replay order extends local commit order
    pub timestamp: u64,

    /// The device's vector clock after stamping
    pub vector_clock: VectorClock,
}

impl OperationMetadata {
    pub fn new(device: DeviceId, seq: u64, timestamp: u64, vector_clock: VectorClock) -> Self {
        OperationMetadata { device, seq, timestamp, vector_clock }
    }
}
