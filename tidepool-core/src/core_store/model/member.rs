/*
    member.rs - Membership record

    One member row is one principal's grant on one realm. Rows are keyed by
    a surrogate id; the pair (realm_id, email) is what queries go by, and
    nothing stops two concurrent invitations of the same address from both
    landing. Revocation is therefore always a predicate delete, never a
    delete by key.
*/

use super::types::{MemberId, RealmId, UserId};
use crate::core_store::store::table::{Record, RecordMutation, RecordPredicate, TableRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-capability grants of a member on a realm
///
/// `add` names the tables the member may insert into. `update` maps a table
/// to the set of fields the member may overwrite on existing records.
/// Enforcement happens in the sync service; this layer only records intent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub add: BTreeSet<String>,
    pub update: BTreeMap<String, BTreeSet<String>>,
}

impl Permissions {
    /// No capabilities at all
    pub fn none() -> Self {
        Permissions::default()
    }

    /// The grant handed to invited list members: they may add items and
    /// tick items off, nothing else.
    pub fn default_share() -> Self {
        let mut add = BTreeSet::new();
        add.insert("todoItems".to_string());

        let mut done_only = BTreeSet::new();
        done_only.insert("done".to_string());
        let mut update = BTreeMap::new();
        update.insert("todoItems".to_string(), done_only);

        Permissions { add, update }
    }

    /// The unrestricted grant a realm owner holds; "*" matches any table
    /// or field
    pub fn owner() -> Self {
        let mut add = BTreeSet::new();
        add.insert("*".to_string());

        let mut all_fields = BTreeSet::new();
        all_fields.insert("*".to_string());
        let mut update = BTreeMap::new();
        update.insert("*".to_string(), all_fields);

        Permissions { add, update }
    }

    /// Whether the grant allows inserting into a table
    pub fn allows_add(&self, table: &str) -> bool {
        self.add.contains(table) || self.add.contains("*")
    }

    /// Whether the grant allows overwriting a field of a table
    pub fn allows_update(&self, table: &str, field: &str) -> bool {
        let fields_allow =
            |fields: &BTreeSet<String>| fields.contains(field) || fields.contains("*");
        self.update.get(table).map(&fields_allow).unwrap_or(false)
            || self.update.get("*").map(&fields_allow).unwrap_or(false)
    }
}

/// One principal's grant on one realm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Surrogate row ID
    pub id: MemberId,

    /// Realm the grant applies to
    pub realm_id: RealmId,

    /// Resolved user id, once the invitee has an account
    pub user_id: Option<UserId>,

    /// Display name of the invitee
    pub name: String,

    /// Address the invitation goes to and queries go by
    pub email: String,

    /// Whether an external invitation should be delivered
    pub invite: bool,

    /// Set once the invitee accepts; acceptance arrives via sync
    pub accepted: bool,

    /// Capabilities granted to this member
    pub permissions: Permissions,
}

impl Member {
    pub fn new(
        realm_id: RealmId,
        name: impl Into<String>,
        email: impl Into<String>,
        invite: bool,
        permissions: Permissions,
    ) -> Self {
        Member {
            id: MemberId::generate(),
            realm_id,
            user_id: None,
            name: name.into(),
            email: email.into(),
            invite,
            accepted: false,
            permissions,
        }
    }

    /// The owner's standing grant on a realm they share.
    ///
    /// The id is derived from the realm id, so two devices that start
    /// sharing the same list offline converge on a single owner row, the
    /// same way tied realm ids make the realm records converge. User ids
    /// double as the owner's address here.
    pub fn owner(realm_id: RealmId, user_id: &UserId) -> Self {
        Member {
            id: MemberId::new(format!("{}~owner", realm_id)),
            realm_id,
            user_id: Some(user_id.clone()),
            name: user_id.to_string(),
            email: user_id.to_string(),
            invite: false,
            accepted: true,
            permissions: Permissions::owner(),
        }
    }
}

/// Predicates over the members table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberPredicate {
    /// Every grant on a realm
    ByRealm { realm_id: RealmId },
    /// Grants of one address on a realm
    ByRealmAndEmail { realm_id: RealmId, email: String },
}

impl RecordPredicate<Member> for MemberPredicate {
    fn matches(&self, record: &Member) -> bool {
        match self {
            MemberPredicate::ByRealm { realm_id } => record.realm_id == *realm_id,
            MemberPredicate::ByRealmAndEmail { realm_id, email } => {
                record.realm_id == *realm_id && record.email == *email
            }
        }
    }
}

/// Field mutations on a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberMutation {
    /// Record invitation acceptance
    SetAccepted { accepted: bool },
    /// Replace the member's grant
    SetPermissions { permissions: Permissions },
}

impl RecordMutation<Member> for MemberMutation {
    fn apply_to(&self, record: &mut Member) {
        match self {
            MemberMutation::SetAccepted { accepted } => record.accepted = *accepted,
            MemberMutation::SetPermissions { permissions } => {
                record.permissions = permissions.clone()
            }
        }
    }
}

impl Record for Member {
    type Key = MemberId;
    type Predicate = MemberPredicate;
    type Mutation = MemberMutation;

    const TABLE: TableRef = TableRef::Members;

    fn key(&self) -> MemberId {
        self.id.clone()
    }
}
