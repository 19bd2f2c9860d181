/*
    realm.rs - Realm record

    A realm groups records under one access scope. Only shared realms get a
    record in the realms table; private realms are implied by user ids and
    never materialize. Creation is always an upsert so that two devices
    converting the same list offline converge on a single record.
*/

use super::types::RealmId;
use crate::core_store::store::table::{Record, RecordMutation, RecordPredicate, TableRef};
use serde::{Deserialize, Serialize};

/// Label stored on realms that scope a single todo list
pub const REPRESENTS_TODO_LIST: &str = "a to-do list";

/// A shared access scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Realm {
    /// Unique realm ID; for tied realms this is derived from the list id
    pub realm_id: RealmId,

    /// Display name, taken from the entity the realm scopes
    pub name: String,

    /// Human label of what kind of entity this realm represents
    pub represents: String,
}

impl Realm {
    pub fn new(
        realm_id: RealmId,
        name: impl Into<String>,
        represents: impl Into<String>,
    ) -> Self {
        Realm { realm_id, name: name.into(), represents: represents.into() }
    }
}

/// Predicates over the realms table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RealmPredicate {
    /// Realms representing a given kind of entity
    ByRepresents { represents: String },
}

impl RecordPredicate<Realm> for RealmPredicate {
    fn matches(&self, record: &Realm) -> bool {
        match self {
            RealmPredicate::ByRepresents { represents } => record.represents == *represents,
        }
    }
}

/// Field mutations on a realm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RealmMutation {
    /// Rename the realm, normally following a rename of the scoped entity
    SetName { name: String },
}

impl RecordMutation<Realm> for RealmMutation {
    fn apply_to(&self, record: &mut Realm) {
        match self {
            RealmMutation::SetName { name } => record.name = name.clone(),
        }
    }
}

impl Record for Realm {
    type Key = RealmId;
    type Predicate = RealmPredicate;
    type Mutation = RealmMutation;

    const TABLE: TableRef = TableRef::Realms;

    fn key(&self) -> RealmId {
        self.realm_id.clone()
    }
}
