/*
    table.rs - Typed record tables

    One Table per record type, keyed by the record's id. Bulk reads and
    writes go through serializable predicate and mutation values rather
    than closures; the same values end up in the operation log, which is
    what makes a bulk mutation replayable on another replica.
*/

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names of the tables a transaction can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableRef {
    TodoLists,
    TodoItems,
    Realms,
    Members,
}

impl TableRef {
    /// All tables, in canonical (lock acquisition) order
    pub const ALL: [TableRef; 4] =
        [TableRef::TodoLists, TableRef::TodoItems, TableRef::Realms, TableRef::Members];

    pub fn name(&self) -> &'static str {
        match self {
            TableRef::TodoLists => "todoLists",
            TableRef::TodoItems => "todoItems",
            TableRef::Realms => "realms",
            TableRef::Members => "members",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A serializable filter over one record type
pub trait RecordPredicate<R>: Clone + fmt::Debug {
    fn matches(&self, record: &R) -> bool;
}

/// A serializable field update on one record type
pub trait RecordMutation<R>: Clone + fmt::Debug {
    fn apply_to(&self, record: &mut R);
}

/// A storable record type with its key, predicate and mutation companions
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Key: Clone + Ord + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;
    type Predicate: RecordPredicate<Self> + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    type Mutation: RecordMutation<Self> + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// The table this record type lives in
    const TABLE: TableRef;

    fn key(&self) -> Self::Key;
}

/// An in-memory table of records, ordered by key for deterministic iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R: Record> {
    rows: BTreeMap<R::Key, R>,
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Table { rows: BTreeMap::new() }
    }
}

impl<R: Record> Table<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a record by key
    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.rows.get(key)
    }

    /// Insert or replace a record
    pub fn put(&mut self, record: R) {
        self.rows.insert(record.key(), record);
    }

    /// Apply a mutation to the record with the given key.
    /// Returns false when no such record exists.
    pub fn update(&mut self, key: &R::Key, mutation: &R::Mutation) -> bool {
        match self.rows.get_mut(key) {
            Some(record) => {
                mutation.apply_to(record);
                true
            }
            None => false,
        }
    }

    /// Delete by key; deleting an absent record is a no-op
    pub fn delete(&mut self, key: &R::Key) -> bool {
        self.rows.remove(key).is_some()
    }

    /// Read-only view of the records matching a predicate
    pub fn where_(&self, predicate: R::Predicate) -> WhereClause<'_, R> {
        WhereClause { table: self, predicate }
    }

    /// Apply a mutation to every record matching the predicate.
    /// Returns the number of records touched.
    pub fn modify_where(&mut self, predicate: &R::Predicate, mutation: &R::Mutation) -> usize {
        let mut touched = 0;
        for record in self.rows.values_mut() {
            if predicate.matches(record) {
                mutation.apply_to(record);
                touched += 1;
            }
        }
        touched
    }

    /// Delete every record matching the predicate.
    /// Returns the number of records removed.
    pub fn delete_where(&mut self, predicate: &R::Predicate) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, record| !predicate.matches(record));
        before - self.rows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only predicate view over a table
pub struct WhereClause<'a, R: Record> {
    table: &'a Table<R>,
    predicate: R::Predicate,
}

impl<'a, R: Record> WhereClause<'a, R> {
    /// Number of matching records
    pub fn count(&self) -> usize {
        self.table.iter().filter(|r| self.predicate.matches(r)).count()
    }

    /// First matching record, in key order
    pub fn first(&self) -> Option<&'a R> {
        self.table.iter().find(|r| self.predicate.matches(r))
    }

    /// All matching records, in key order
    pub fn to_vec(&self) -> Vec<R> {
        self.table.iter().filter(|r| self.predicate.matches(r)).cloned().collect()
    }
}
