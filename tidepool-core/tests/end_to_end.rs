//! End-to-end test against the public API: a user shares a list from one
//! device, edits flow through sync, unsharing reverts the list, deletion
//! cascades everywhere.

use anyhow::Result;
use tidepool_core::core_realm::{ListManager, LocalListManager, SharingManager};
use tidepool_core::core_store::sync::exchange;
use tidepool_core::{tied_realm_id, DeviceId, Replica, Session, SharingState, UserId};

fn device(user: &str, device: &str) -> LocalListManager {
    let session = Session::new(UserId::new(user), DeviceId::new(device));
    LocalListManager::new(Replica::in_memory(session.device.clone()), session)
}

#[tokio::test]
async fn shared_list_lifecycle_across_two_devices() -> Result<()> {
    let laptop = device("ada@example.com", "laptop");
    let phone = device("ada@example.com", "phone");

    // Ada drafts a list on the laptop
    let list = laptop.create_list("Camping trip").await?;
    let tent = laptop.add_item(&list.id, "Pack the tent").await?;
    laptop.add_item(&list.id, "Buy gas canisters").await?;
    exchange(laptop.replica(), phone.replica()).await?;

    // She invites Robin from the laptop; the private list promotes itself
    laptop.share_with(&list.id, "Robin", "robin@example.com", true).await?;
    let shared = laptop.get_list(&list.id).await?.expect("list exists");
    assert!(laptop.is_sharable(&shared));
    assert_eq!(shared.realm_id, tied_realm_id(&list.id));

    // Meanwhile the phone, still offline, ticks an item off
    phone.set_item_done(&tent.id, true).await?;

    exchange(laptop.replica(), phone.replica()).await?;

    // Both edits survived the merge on both devices
    for mgr in [&laptop, &phone] {
        let db = mgr.replica().read(|db| db.clone())?;
        let item = db.todo_items.get(&tent.id).expect("item exists");
        assert!(item.done);
        assert_eq!(item.realm_id, tied_realm_id(&list.id));
        assert_eq!(db.members.len(), 2, "owner and Robin");
    }

    // Robin is uninvited from the phone; only the owner remains, so the
    // list reverts to private on its own
    phone.unshare_with(&list.id, "robin@example.com").await?;
    exchange(laptop.replica(), phone.replica()).await?;

    let reverted = laptop.get_list(&list.id).await?.expect("list exists");
    assert_eq!(SharingState::of(&reverted), SharingState::Private);
    let db = laptop.replica().read(|db| db.clone())?;
    assert!(db.realms.is_empty());
    assert!(db.members.is_empty());

    // Deleting on one device removes everything on both after sync
    laptop.delete_list(&list.id).await?;
    exchange(laptop.replica(), phone.replica()).await?;

    for mgr in [&laptop, &phone] {
        let db = mgr.replica().read(|db| db.clone())?;
        assert!(db.lists.is_empty());
        assert!(db.todo_items.is_empty());
        assert!(db.realms.is_empty());
        assert!(db.members.is_empty());
    }

    Ok(())
}
