/*
    Transaction tests - Atomicity, isolation, scope enforcement

    The coordinator's contract: bodies over overlapping tables are
    serialized, commits are all-or-nothing, and a body can only touch
    the tables it declared.
*/

use super::manager_for;
use crate::core_realm::ListManager;
use crate::core_store::model::{DeviceId, TodoItem, TodoList, UserId};
use crate::core_store::op::{StoreOp, TableOp};
use crate::core_store::store::{StoreError, TableRef, TransactionError, TransactionMode};
use crate::core_store::sync::Replica;
use futures::future::join_all;

#[tokio::test]
async fn test_body_error_rolls_back_every_op() {
    let mgr = manager_for("ada@example.com", "laptop");
    let list = mgr.create_list("Groceries").await.unwrap();

    let ops_before = mgr.replica().clock().unwrap().get(mgr.replica().device());

    // Two ops succeed inside the body, then it fails
    let result: Result<(), StoreError> = mgr
        .replica()
        .run_in_transaction(
            TransactionMode::ReadWrite,
            &[TableRef::TodoLists, TableRef::TodoItems],
            |tx| {
                let stored = tx.lists()?.get(&list.id).cloned().unwrap();
                tx.apply(StoreOp::TodoItems(TableOp::Put {
                    record: TodoItem::new(&stored, "First"),
                }))?;
                tx.apply(StoreOp::TodoItems(TableOp::Put {
                    record: TodoItem::new(&stored, "Second"),
                }))?;
                Err(StoreError::InvalidOperation("storage gave out".to_string()))
            },
        )
        .await;

    assert!(result.is_err());

    // Nothing committed, nothing logged
    assert_eq!(mgr.replica().read(|db| db.todo_items.len()).unwrap(), 0);
    let ops_after = mgr.replica().clock().unwrap().get(mgr.replica().device());
    assert_eq!(ops_before, ops_after);
}

#[tokio::test]
async fn test_undeclared_table_is_rejected() {
    let replica = Replica::in_memory(DeviceId::new("laptop"));

    let err = replica
        .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], |tx| {
            // Scope only names todoLists; members is off-limits
            tx.members().map(|_| ())
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Transaction(TransactionError::TableNotDeclared { table: TableRef::Members })
    ));
}

#[tokio::test]
async fn test_reads_inside_body_observe_own_writes() {
    let replica = Replica::in_memory(DeviceId::new("laptop"));
    let list = TodoList::new_private("Groceries", UserId::new("ada@example.com"));
    let id = list.id.clone();

    let seen = replica
        .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], |tx| {
            tx.apply(StoreOp::TodoLists(TableOp::Put { record: list }))?;
            Ok(tx.lists()?.get(&id).is_some())
        })
        .await
        .unwrap();

    assert!(seen);
}

#[tokio::test]
async fn test_overlapping_transactions_are_serialized() {
    let replica = Replica::in_memory(DeviceId::new("laptop"));
    let owner = UserId::new("ada@example.com");
    let list = TodoList::new_private("Groceries", owner);
    let list_for_items = list.clone();

    replica
        .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], move |tx| {
            tx.apply(StoreOp::TodoLists(TableOp::Put { record: list }))
        })
        .await
        .unwrap();

    // Each task reads the current item count and derives its item title
    // from it. Serialized bodies make the counts distinct; a lost update
    // would produce duplicates.
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let replica = replica.clone();
            let list = list_for_items.clone();
            tokio::spawn(async move {
                replica
                    .run_in_transaction(
                        TransactionMode::ReadWrite,
                        &[TableRef::TodoItems],
                        move |tx| {
                            let n = tx.todo_items()?.len();
                            tx.apply(StoreOp::TodoItems(TableOp::Put {
                                record: TodoItem::new(&list, format!("item #{}", n)),
                            }))
                        },
                    )
                    .await
            })
        })
        .collect();

    for joined in join_all(tasks).await {
        joined.unwrap().unwrap();
    }

    let titles = replica
        .read(|db| db.todo_items.iter().map(|i| i.title.clone()).collect::<Vec<_>>())
        .unwrap();
    assert_eq!(titles.len(), 8);

    let mut unique = titles.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 8, "serialized bodies must never read a stale count");
}

#[tokio::test]
async fn test_empty_transaction_commits_nothing() {
    let replica = Replica::in_memory(DeviceId::new("laptop"));

    replica
        .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], |tx| {
            Ok(tx.lists()?.len())
        })
        .await
        .unwrap();

    assert!(replica.clock().unwrap().is_empty());
}
