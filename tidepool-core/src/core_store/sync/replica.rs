/*
    replica.rs - Device-local replica handle

    Owns the table state, the operation log and (optionally) the durable
    commit log of one device. All mutations funnel through
    run_in_transaction: the body collects ops against a working copy,
    then the replica stamps them, persists them and folds them into the
    live state as one unit. Remote entries enter through merge_remote,
    which unions the logs and rebuilds the state from the merged log.
*/

use crate::config::StoreConfig;
use crate::core_store::model::DeviceId;
use crate::core_store::op::{OpLog, OpLogEntry, StoreOp, VectorClock};
use crate::core_store::store::{
    CommitLog, Database, StoreError, StoreResult, TableLocks, TableRef, Transaction,
    TransactionMode,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Helper to convert poison errors into StoreError
fn handle_poison<T>(_err: PoisonError<T>) -> StoreError {
    StoreError::Storage("Lock poisoned: a thread panicked while holding the lock".to_string())
}

struct ReplicaInner {
    device: DeviceId,
    locks: TableLocks,
    db: RwLock<Database>,
    oplog: Mutex<OpLog>,
    commit_log: Option<Mutex<CommitLog>>,
}

/// Handle to one device's replica of the store
#[derive(Clone)]
pub struct Replica {
    inner: Arc<ReplicaInner>,
}

impl Replica {
    /// Create an ephemeral replica with no durable log
    pub fn in_memory(device: DeviceId) -> Self {
        Replica {
            inner: Arc::new(ReplicaInner {
                device,
                locks: TableLocks::new(),
                db: RwLock::new(Database::new()),
                oplog: Mutex::new(OpLog::new()),
                commit_log: None,
            }),
        }
    }

    /// Open a durable replica, replaying the on-disk log into state
    pub fn open(config: &StoreConfig, device: DeviceId) -> StoreResult<Self> {
        if !config.durable {
            return Ok(Self::in_memory(device));
        }

        let path = config.data_dir.join(format!("{}.oplog", device));
        let commit_log = CommitLog::open(path)?;

        // One frame per committed transaction or merged batch
        let mut entries = Vec::new();
        for frame in commit_log.read_all()? {
            entries.extend(bincode::deserialize::<Vec<OpLogEntry>>(&frame.data)?);
        }

        let mut oplog = OpLog::new();
        let replayed = oplog.merge(entries);
        let db = Database::replay(oplog.entries());

        tracing::info!(
            device = %device,
            entries = replayed.len(),
            "replica rehydrated from durable log"
        );

        Ok(Replica {
            inner: Arc::new(ReplicaInner {
                device,
                locks: TableLocks::new(),
                db: RwLock::new(db),
                oplog: Mutex::new(oplog),
                commit_log: Some(Mutex::new(commit_log)),
            }),
        })
    }

    /// The device this replica belongs to
    pub fn device(&self) -> &DeviceId {
        &self.inner.device
    }

    /// Run a transaction over the declared tables.
    ///
    /// Bodies of transactions that declare overlapping tables are
    /// serialized; disjoint transactions may interleave across await
    /// points. The body's mutations commit all-or-nothing.
    pub async fn run_in_transaction<T, F>(
        &self,
        mode: TransactionMode,
        tables: &[TableRef],
        body: F,
    ) -> StoreResult<T>
    where
        F: FnOnce(&mut Transaction) -> StoreResult<T>,
    {
        let scope: BTreeSet<TableRef> = tables.iter().copied().collect();
        tracing::debug!(?mode, tables = ?scope, "transaction begin");

        let _guards = self.inner.locks.acquire(&scope).await;

        let work = self.inner.db.read().map_err(handle_poison)?.clone();
        let mut tx = Transaction::new(scope, work);

        let out = body(&mut tx)?;
        let pending = tx.into_pending();

        tracing::debug!(ops = pending.len(), "transaction commit");
        self.commit(pending)?;
        Ok(out)
    }

    /// Stamp, persist and fold a committed batch.
    ///
    /// The batch becomes durable as a single frame before any in-memory
    /// state moves, so an I/O failure aborts the whole transaction and a
    /// torn frame is dropped wholesale on the next open.
    fn commit(&self, pending: Vec<StoreOp>) -> StoreResult<()> {
        if pending.is_empty() {
            return Ok(());
        }

        let mut oplog = self.inner.oplog.lock().map_err(handle_poison)?;
        let mut db = self.inner.db.write().map_err(handle_poison)?;

        let entries = oplog.prepare(&self.inner.device, pending);
        self.persist_batch(&entries)?;

        oplog.merge(entries.clone());
        for entry in &entries {
            db.apply(&entry.op);
        }

        Ok(())
    }

    fn persist_batch(&self, entries: &[OpLogEntry]) -> StoreResult<()> {
        if let Some(commit_log) = &self.inner.commit_log {
            let payload = bincode::serialize(entries)?;
            commit_log.lock().map_err(handle_poison)?.append(&payload)?;
        }
        Ok(())
    }

    /// Read from a consistent snapshot of the live state
    pub fn read<T>(&self, f: impl FnOnce(&Database) -> T) -> StoreResult<T> {
        let db = self.inner.db.read().map_err(handle_poison)?;
        Ok(f(&db))
    }

    /// This replica's view of every device's progress
    pub fn clock(&self) -> StoreResult<VectorClock> {
        Ok(self.inner.oplog.lock().map_err(handle_poison)?.clock().clone())
    }

    /// Entries a peer with the given clock has not seen yet
    pub fn delta_since(&self, peer: &VectorClock) -> StoreResult<Vec<OpLogEntry>> {
        Ok(self.inner.oplog.lock().map_err(handle_poison)?.entries_since(peer))
    }

    /// Ingest entries received from a peer.
    ///
    /// Duplicates are dropped, fresh entries are persisted, and the table
    /// state is rebuilt as the fold of the merged log. Returns how many
    /// entries were new. Conflicting histories never error: the canonical
    /// replay order decides, identically on every replica.
    pub async fn merge_remote(&self, entries: Vec<OpLogEntry>) -> StoreResult<usize> {
        let scope: BTreeSet<TableRef> = TableRef::ALL.into_iter().collect();
        let _guards = self.inner.locks.acquire(&scope).await;

        let mut oplog = self.inner.oplog.lock().map_err(handle_poison)?;
        let fresh = oplog.merge(entries);
        if fresh.is_empty() {
            return Ok(0);
        }

        self.persist_batch(&fresh)?;

        let rebuilt = Database::replay(oplog.entries());
        *self.inner.db.write().map_err(handle_poison)? = rebuilt;

        metrics::counter!("tidepool_sync_entries_merged").increment(fresh.len() as u64);
        tracing::debug!(device = %self.inner.device, entries = fresh.len(), "merged remote entries");

        Ok(fresh.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_store::model::{TodoList, UserId};
    use crate::core_store::op::TableOp;

    fn put_list_op(title: &str) -> (StoreOp, crate::core_store::model::ListId) {
        let list = TodoList::new_private(title, UserId::new("user-t"));
        let id = list.id.clone();
        (StoreOp::TodoLists(TableOp::Put { record: list }), id)
    }

    #[tokio::test]
    async fn test_transaction_commits_to_live_state() {
        let replica = Replica::in_memory(DeviceId::new("laptop"));
        let (op, id) = put_list_op("Errands");

        replica
            .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], |tx| {
                tx.apply(op)
            })
            .await
            .unwrap();

        let present = replica.read(|db| db.lists.get(&id).is_some()).unwrap();
        assert!(present);
        assert_eq!(replica.clock().unwrap().get(replica.device()), 1);
    }

    #[tokio::test]
    async fn test_failed_body_rolls_back() {
        let replica = Replica::in_memory(DeviceId::new("laptop"));
        let (op, _) = put_list_op("Errands");

        let result: StoreResult<()> = replica
            .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], |tx| {
                tx.apply(op)?;
                Err(StoreError::InvalidOperation("boom".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(replica.read(|db| db.lists.len()).unwrap(), 0);
        assert!(replica.clock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_remote_is_idempotent() {
        let a = Replica::in_memory(DeviceId::new("a"));
        let b = Replica::in_memory(DeviceId::new("b"));
        let (op, _) = put_list_op("Errands");

        a.run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], |tx| {
            tx.apply(op)
        })
        .await
        .unwrap();

        let delta = a.delta_since(&b.clock().unwrap()).unwrap();
        assert_eq!(b.merge_remote(delta.clone()).await.unwrap(), 1);
        assert_eq!(b.merge_remote(delta).await.unwrap(), 0);

        let (a_state, b_state) =
            (a.read(|db| db.clone()).unwrap(), b.read(|db| db.clone()).unwrap());
        assert_eq!(a_state, b_state);
    }
}
