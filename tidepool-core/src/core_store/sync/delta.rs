/*
    delta.rs - Anti-entropy delta exchange

    A peer advertises its vector clock; the responder answers with the
    entries the peer is missing. Both messages are plain serde values so
    any transport can carry them.
*/

use super::replica::Replica;
use crate::core_store::op::{OpLogEntry, VectorClock};
use crate::core_store::store::StoreResult;
use serde::{Deserialize, Serialize};

/// "Here is how far I have seen"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub clock: VectorClock,
}

/// "Here is what you are missing"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub entries: Vec<OpLogEntry>,
}

/// Build the request a replica would send to any peer
pub fn request_for(replica: &Replica) -> StoreResult<SyncRequest> {
    Ok(SyncRequest { clock: replica.clock()? })
}

/// Answer a peer's request from this replica's log
pub fn respond(replica: &Replica, request: &SyncRequest) -> StoreResult<SyncResponse> {
    Ok(SyncResponse { entries: replica.delta_since(&request.clock)? })
}

/// One bidirectional anti-entropy round between two replicas.
///
/// Returns how many entries each side accepted (a's count first).
pub async fn exchange(a: &Replica, b: &Replica) -> StoreResult<(usize, usize)> {
    let to_a = respond(b, &request_for(a)?)?;
    let accepted_a = a.merge_remote(to_a.entries).await?;

    let to_b = respond(a, &request_for(b)?)?;
    let accepted_b = b.merge_remote(to_b.entries).await?;

    Ok((accepted_a, accepted_b))
}
