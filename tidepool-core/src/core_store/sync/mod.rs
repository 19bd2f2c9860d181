/*
    Sync subsystem - Replica handle and delta exchange

    The replica applies local transactions and ingests remote entries.
    Delta exchange computes what a peer is missing from vector clocks;
    transport is left to the caller.
*/

pub mod delta;
pub mod replica;

pub use delta::{exchange, request_for, respond, SyncRequest, SyncResponse};
pub use replica::Replica;
