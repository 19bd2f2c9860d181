/*
    Convergence tests - Multi-device scenarios

    Two replicas mutate the same list offline, then sync. Whatever the
    interleaving, both must converge to the same state, with no lost
    items and a single realm record per tied realm.
*/

use super::device_pair;
use crate::core_realm::{is_sharable, tied_realm_id, ListManager, SharingManager};
use crate::core_store::model::{DeviceId, ItemMutation, TodoList, UserId};
use crate::core_store::op::{OpLog, StoreOp, TableOp};
use crate::core_store::store::{Database, TableRef, TransactionMode};
use crate::core_store::sync::exchange;
use proptest::prelude::*;

#[tokio::test]
async fn test_offline_make_sharable_on_both_devices_converges() {
    let (laptop, phone) = device_pair("ada@example.com");

    // The list exists on both devices before they go offline
    let list = laptop.create_list("Groceries").await.unwrap();
    laptop.add_item(&list.id, "Milk").await.unwrap();
    exchange(laptop.replica(), phone.replica()).await.unwrap();

    // Offline: divergent edits, then both devices convert the list
    laptop.add_item(&list.id, "Bread").await.unwrap();
    phone.add_item(&list.id, "Coffee").await.unwrap();
    let realm_a = laptop.make_sharable(&list.id).await.unwrap();
    let realm_b = phone.make_sharable(&list.id).await.unwrap();

    // Deterministic derivation made both pick the same realm id
    assert_eq!(realm_a, realm_b);
    assert_eq!(realm_a, tied_realm_id(&list.id));

    exchange(laptop.replica(), phone.replica()).await.unwrap();

    let a = laptop.replica().read(|db| db.clone()).unwrap();
    let b = phone.replica().read(|db| db.clone()).unwrap();
    assert_eq!(a, b);

    // Exactly one realm record despite two independent creations
    assert_eq!(a.realms.len(), 1);
    assert!(a.realms.get(&realm_a).is_some());

    // No item was lost and every one is scoped to the merged realm
    assert_eq!(a.todo_items.len(), 3);
    assert!(a.todo_items.iter().all(|item| item.realm_id == realm_a));
    assert!(is_sharable(a.lists.get(&list.id).unwrap()));
}

#[tokio::test]
async fn test_concurrent_share_with_converges_on_single_owner_row() {
    let (laptop, phone) = device_pair("ada@example.com");

    let list = laptop.create_list("Groceries").await.unwrap();
    exchange(laptop.replica(), phone.replica()).await.unwrap();

    // Offline: each device invites someone
    laptop.share_with(&list.id, "Robin", "robin@example.com", true).await.unwrap();
    phone.share_with(&list.id, "Sam", "sam@example.com", true).await.unwrap();

    exchange(laptop.replica(), phone.replica()).await.unwrap();

    let a = laptop.replica().read(|db| db.clone()).unwrap();
    let b = phone.replica().read(|db| db.clone()).unwrap();
    assert_eq!(a, b);

    // One owner row (deterministic id), two invitees
    assert_eq!(a.members.len(), 3);
    let owners: Vec<_> =
        a.members.iter().filter(|m| m.email == "ada@example.com").collect();
    assert_eq!(owners.len(), 1);
}

#[tokio::test]
async fn test_disjoint_field_edits_both_survive_merge() {
    let (laptop, phone) = device_pair("ada@example.com");

    let list = laptop.create_list("Groceries").await.unwrap();
    let item = laptop.add_item(&list.id, "Milk").await.unwrap();
    exchange(laptop.replica(), phone.replica()).await.unwrap();

    // Offline: laptop renames the item while the phone ticks it off and
    // converts the list
    laptop
        .replica()
        .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoItems], |tx| {
            tx.apply(StoreOp::TodoItems(TableOp::Update {
                key: item.id.clone(),
                mutation: ItemMutation::SetTitle { title: "Oat milk".to_string() },
            }))
        })
        .await
        .unwrap();
    phone.set_item_done(&item.id, true).await.unwrap();
    let realm_id = phone.make_sharable(&list.id).await.unwrap();

    exchange(laptop.replica(), phone.replica()).await.unwrap();

    let a = laptop.replica().read(|db| db.clone()).unwrap();
    let b = phone.replica().read(|db| db.clone()).unwrap();
    assert_eq!(a, b);

    // Neither field-level intent was overwritten by the other device
    let merged = a.todo_items.get(&item.id).unwrap();
    assert_eq!(merged.title, "Oat milk");
    assert!(merged.done);
    assert_eq!(merged.realm_id, realm_id);
}

#[tokio::test]
async fn test_share_against_concurrent_privatize_converges() {
    let (laptop, phone) = device_pair("ada@example.com");

    let list = laptop.create_list("Groceries").await.unwrap();
    laptop.share_with(&list.id, "Robin", "robin@example.com", true).await.unwrap();
    exchange(laptop.replica(), phone.replica()).await.unwrap();

    // Offline: one device invites another member, the other pulls the
    // list private. The outcome is whatever the canonical order says,
    // but it must be the same outcome on both devices.
    laptop.share_with(&list.id, "Sam", "sam@example.com", true).await.unwrap();
    phone.make_private(&list.id).await.unwrap();

    exchange(laptop.replica(), phone.replica()).await.unwrap();

    let a = laptop.replica().read(|db| db.clone()).unwrap();
    let b = phone.replica().read(|db| db.clone()).unwrap();
    assert_eq!(a, b);

    // The list still exists exactly once, whichever way it went
    assert!(a.lists.get(&list.id).is_some());
}

#[tokio::test]
async fn test_three_replica_gossip_converges() {
    let (laptop, phone) = device_pair("ada@example.com");
    let tablet = super::manager_for("ada@example.com", "ada-tablet");

    let list = laptop.create_list("Groceries").await.unwrap();
    laptop.add_item(&list.id, "Milk").await.unwrap();

    // Entries flow laptop -> phone -> tablet, never laptop -> tablet
    exchange(laptop.replica(), phone.replica()).await.unwrap();
    phone.make_sharable(&list.id).await.unwrap();
    exchange(phone.replica(), tablet.replica()).await.unwrap();
    exchange(laptop.replica(), phone.replica()).await.unwrap();
    exchange(phone.replica(), tablet.replica()).await.unwrap();

    let a = laptop.replica().read(|db| db.clone()).unwrap();
    let b = phone.replica().read(|db| db.clone()).unwrap();
    let c = tablet.replica().read(|db| db.clone()).unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
}

fn put_item_ops(log: &mut OpLog, device: &DeviceId, list: &TodoList, titles: &[String]) {
    for title in titles {
        let item = crate::core_store::model::TodoItem::new(list, title.clone());
        log.stamp(device, StoreOp::TodoItems(TableOp::Put { record: item }));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Merging the same two histories in either direction folds to the
    /// same table state.
    #[test]
    fn prop_merge_is_commutative(titles_a in proptest::collection::vec(".{0,12}", 0..6),
                                 titles_b in proptest::collection::vec(".{0,12}", 0..6)) {
        let list = TodoList::new_private("Groceries", UserId::new("ada@example.com"));
        let device_a = DeviceId::new("a");
        let device_b = DeviceId::new("b");

        let mut log_a = OpLog::new();
        log_a.stamp(&device_a, StoreOp::TodoLists(TableOp::Put { record: list.clone() }));
        put_item_ops(&mut log_a, &device_a, &list, &titles_a);

        let mut log_b = OpLog::new();
        put_item_ops(&mut log_b, &device_b, &list, &titles_b);

        let mut ab = log_a.clone();
        ab.merge(log_b.entries().to_vec());

        let mut ba = log_b.clone();
        ba.merge(log_a.entries().to_vec());

        prop_assert_eq!(ab.entries(), ba.entries());
        prop_assert_eq!(Database::replay(ab.entries()), Database::replay(ba.entries()));
    }
}
