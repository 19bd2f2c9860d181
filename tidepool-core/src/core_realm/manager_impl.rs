/*
    manager_impl.rs - Local implementation of the managers

    Every operation is one transaction over the tables it names. The
    promotion and demotion step sequences are shared between the explicit
    operations and the paths that trigger them implicitly (share_with
    promotes, unshare_with demotes), so both always behave identically.

    Bulk moves and revocations are expressed as predicate ops, never as
    read-then-write loops: replayed on a peer after a merge they cover
    records this device has never seen.
*/

use super::manager::{ListManager, SharingManager};
use super::session::Session;
use super::state::{SharingEvent, SharingState};
use super::tied::{is_sharable, tied_realm_id};
use crate::core_store::model::realm::REPRESENTS_TODO_LIST;
use crate::core_store::model::{
    ItemId, ItemMutation, ItemPredicate, ListId, ListMutation, Member, MemberId, MemberPredicate,
    Permissions, Realm, RealmId, TodoItem, TodoList,
};
use crate::core_store::op::{StoreOp, TableOp};
use crate::core_store::store::{
    StoreError, StoreResult, TableRef, Transaction, TransactionMode,
};
use crate::core_store::sync::Replica;
use async_trait::async_trait;

/// Managers backed by one device's replica
#[derive(Clone)]
pub struct LocalListManager {
    replica: Replica,
    session: Session,
}

impl LocalListManager {
    pub fn new(replica: Replica, session: Session) -> Self {
        LocalListManager { replica, session }
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

fn require_list(tx: &Transaction, list_id: &ListId) -> StoreResult<TodoList> {
    tx.lists()?
        .get(list_id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(format!("todo list {}", list_id)))
}

/// The promotion steps: upsert the tied realm, retarget the list, move the
/// items. Needs {todoLists, todoItems, realms} in scope.
fn promote_to_sharable(tx: &mut Transaction, list: &TodoList) -> StoreResult<RealmId> {
    let tied = tied_realm_id(&list.id);
    if list.realm_id == tied {
        return Ok(tied);
    }

    // Insert-or-replace; a concurrent promotion elsewhere must merge to
    // one record, never fail
    tx.apply(StoreOp::Realms(TableOp::Put {
        record: Realm::new(tied.clone(), &list.title, REPRESENTS_TODO_LIST),
    }))?;

    tx.apply(StoreOp::TodoLists(TableOp::Update {
        key: list.id.clone(),
        mutation: ListMutation::SetRealm { realm_id: tied.clone() },
    }))?;

    tx.apply(StoreOp::TodoItems(TableOp::ModifyWhere {
        predicate: ItemPredicate::ByListInRealm {
            list_id: list.id.clone(),
            realm_id: list.realm_id.clone(),
        },
        mutation: ItemMutation::SetRealm { realm_id: tied.clone() },
    }))?;

    tracing::info!(list = %list.id, realm = %tied, "list promoted to sharable");
    Ok(tied)
}

/// The demotion steps: move the items and the list into the caller's
/// personal realm, then drop every membership and the realm record. All
/// four steps commit together, so no interleaving where items are private
/// but memberships still grant access is ever observable.
/// Needs {todoLists, todoItems, realms, members} in scope.
fn demote_to_private(
    tx: &mut Transaction,
    list: &TodoList,
    personal: &RealmId,
) -> StoreResult<()> {
    let old_realm = list.realm_id.clone();

    tx.apply(StoreOp::TodoItems(TableOp::ModifyWhere {
        predicate: ItemPredicate::ByListInRealm {
            list_id: list.id.clone(),
            realm_id: old_realm.clone(),
        },
        mutation: ItemMutation::SetRealm { realm_id: personal.clone() },
    }))?;

    tx.apply(StoreOp::TodoLists(TableOp::Update {
        key: list.id.clone(),
        mutation: ListMutation::SetRealm { realm_id: personal.clone() },
    }))?;

    tx.apply(StoreOp::Members(TableOp::DeleteWhere {
        predicate: MemberPredicate::ByRealm { realm_id: old_realm.clone() },
    }))?;

    tx.apply(StoreOp::Realms(TableOp::Delete { key: old_realm.clone() }))?;

    tracing::info!(list = %list.id, realm = %old_realm, "list reverted to private");
    Ok(())
}

#[async_trait]
impl ListManager for LocalListManager {
    async fn create_list(&self, title: &str) -> StoreResult<TodoList> {
        let list = TodoList::new_private(title, self.session.user_id.clone());
        let record = list.clone();

        self.replica
            .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoLists], move |tx| {
                tx.apply(StoreOp::TodoLists(TableOp::Put { record }))
            })
            .await?;

        Ok(list)
    }

    async fn add_item(&self, list_id: &ListId, title: &str) -> StoreResult<TodoItem> {
        self.replica
            .run_in_transaction(
                TransactionMode::ReadWrite,
                &[TableRef::TodoLists, TableRef::TodoItems],
                |tx| {
                    let list = require_list(tx, list_id)?;
                    let item = TodoItem::new(&list, title);
                    tx.apply(StoreOp::TodoItems(TableOp::Put { record: item.clone() }))?;
                    Ok(item)
                },
            )
            .await
    }

    async fn set_item_done(&self, item_id: &ItemId, done: bool) -> StoreResult<()> {
        self.replica
            .run_in_transaction(TransactionMode::ReadWrite, &[TableRef::TodoItems], |tx| {
                if tx.todo_items()?.get(item_id).is_none() {
                    return Err(StoreError::NotFound(format!("todo item {}", item_id)));
                }
                tx.apply(StoreOp::TodoItems(TableOp::Update {
                    key: item_id.clone(),
                    mutation: ItemMutation::SetDone { done },
                }))
            })
            .await
    }

    async fn get_list(&self, list_id: &ListId) -> StoreResult<Option<TodoList>> {
        self.replica.read(|db| db.lists.get(list_id).cloned())
    }
}

#[async_trait]
impl SharingManager for LocalListManager {
    fn is_sharable(&self, list: &TodoList) -> bool {
        is_sharable(list)
    }

    async fn make_sharable(&self, list_id: &ListId) -> StoreResult<RealmId> {
        self.replica
            .run_in_transaction(
                TransactionMode::ReadWrite,
                &[TableRef::TodoLists, TableRef::TodoItems, TableRef::Realms],
                |tx| {
                    let list = require_list(tx, list_id)?;
                    promote_to_sharable(tx, &list)
                },
            )
            .await
    }

    async fn make_private(&self, list_id: &ListId) -> StoreResult<()> {
        let personal = self.session.personal_realm_id();
        self.replica
            .run_in_transaction(TransactionMode::ReadWrite, &TableRef::ALL, |tx| {
                let list = require_list(tx, list_id)?;
                demote_to_private(tx, &list, &personal)
            })
            .await
    }

    async fn share_with(
        &self,
        list_id: &ListId,
        name: &str,
        email: &str,
        send_invite: bool,
    ) -> StoreResult<MemberId> {
        self.replica
            .run_in_transaction(TransactionMode::ReadWrite, &TableRef::ALL, |tx| {
                let list = require_list(tx, list_id)?;
                let realm_id = promote_to_sharable(tx, &list)?;

                // Owner's standing grant; deterministic row id, one row
                // after any merge
                tx.apply(StoreOp::Members(TableOp::Put {
                    record: Member::owner(realm_id.clone(), &list.owner),
                }))?;

                let member = Member::new(
                    realm_id.clone(),
                    name,
                    email,
                    send_invite,
                    Permissions::default_share(),
                );
                let member_id = member.id.clone();
                tx.apply(StoreOp::Members(TableOp::Put { record: member }))?;

                if send_invite {
                    // Delivery itself belongs to the sync service
                    tracing::info!(email, realm = %realm_id, "invitation queued");
                }

                Ok(member_id)
            })
            .await
    }

    async fn unshare_with(&self, list_id: &ListId, email: &str) -> StoreResult<()> {
        let personal = self.session.personal_realm_id();
        self.replica
            .run_in_transaction(TransactionMode::ReadWrite, &TableRef::ALL, |tx| {
                let list = require_list(tx, list_id)?;
                let realm_id = list.realm_id.clone();

                tx.apply(StoreOp::Members(TableOp::DeleteWhere {
                    predicate: MemberPredicate::ByRealmAndEmail {
                        realm_id: realm_id.clone(),
                        email: email.to_string(),
                    },
                }))?;

                let remaining = tx
                    .members()?
                    .where_(MemberPredicate::ByRealm { realm_id: realm_id.clone() })
                    .count();

                let state = SharingState::of(&list);
                let next = if remaining <= 1 {
                    state.on(SharingEvent::MemberCountAtOrBelowOwner)
                } else {
                    state
                };

                if state == SharingState::Sharable && next == SharingState::Private {
                    tracing::debug!(
                        list = %list.id,
                        remaining,
                        "membership dropped to owner, auto-privatizing"
                    );
                    demote_to_private(tx, &list, &personal)?;
                }

                Ok(())
            })
            .await
    }

    async fn delete_list(&self, list_id: &ListId) -> StoreResult<()> {
        self.replica
            .run_in_transaction(TransactionMode::ReadWrite, &TableRef::ALL, |tx| {
                if tx.lists()?.get(list_id).is_none() {
                    // Deleting an absent list is a no-op, not an error
                    tracing::debug!(list = %list_id, "delete of absent list ignored");
                    return Ok(());
                }

                let tied = tied_realm_id(list_id);

                tx.apply(StoreOp::TodoItems(TableOp::DeleteWhere {
                    predicate: ItemPredicate::ByList { list_id: list_id.clone() },
                }))?;

                // The tied realm may never have existed; these are no-ops then
                tx.apply(StoreOp::Members(TableOp::DeleteWhere {
                    predicate: MemberPredicate::ByRealm { realm_id: tied.clone() },
                }))?;
                tx.apply(StoreOp::Realms(TableOp::Delete { key: tied }))?;

                tx.apply(StoreOp::TodoLists(TableOp::Delete { key: list_id.clone() }))?;

                tracing::info!(list = %list_id, "list deleted with items and memberships");
                Ok(())
            })
            .await
    }
}
