//! Core data model.
//!
//! An entry wraps one caller-supplied item with an identity and a creation
//! timestamp. The queue never looks inside the item.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One slot in a queue. This is also the persisted record shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Epoch milliseconds at insertion. Advisory only; never used for ordering.
    pub created_at: i64,

    /// Identity within one queue instance's lifetime.
    pub id: EntryId,

    /// The caller's payload.
    pub item: Value,
}

impl Entry {
    /// Wrap an item, stamping it with a fresh id and the current time.
    pub fn new(item: Value) -> Self {
        let created_at = Utc::now().timestamp_millis();
        Self {
            created_at,
            id: EntryId::generate(created_at),
            item,
        }
    }
}

/// Newtype for entry ids, formatted as `"<random>.<epoch_ms>"`.
///
/// Ids are unique within one queue instance's lifetime only. `replace` and
/// `shift` assign new ids to every remaining entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn generate(epoch_ms: i64) -> Self {
        Self(format!("{}.{epoch_ms}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// What to append: one item, or several in order.
///
/// Converting from a [`Value`] decides structurally: a JSON array becomes
/// `Many`, anything else (objects included) becomes `One`. Construct
/// `Items::One` directly to store an array as a single item.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    One(Value),
    Many(Vec<Value>),
}

impl Items {
    pub fn len(&self) -> usize {
        match self {
            Items::One(_) => 1,
            Items::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Value> for Items {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Items::Many(items),
            other => Items::One(other),
        }
    }
}

impl From<Vec<Value>> for Items {
    fn from(items: Vec<Value>) -> Self {
        Items::Many(items)
    }
}
