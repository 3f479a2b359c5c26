//! Tagged argument values and property bags.
//!
//! Reactions, commands and overwrite/pipeline payloads all exchange data
//! through [`Value`]. Keeping the variant set small lets each reaction
//! pattern-match the shape it expects instead of resolving arguments
//! dynamically at call time.
//!
//! ## Value Types
//!
//! - `Int`: amounts, counters, positions
//! - `Bool`: flags and verdicts
//! - `Text`: names and keys
//! - `Entity` / `Player`: references into the duel
//! - `List`: ordered values
//! - `Table`: nested property bag (used by validation payloads)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;

/// Open key-value table carried by entities and by overwrite/pipeline
/// triggers.
///
/// Ordered so that equality checks and iteration are deterministic.
pub type PropertyBag = BTreeMap<String, Value>;

/// A single argument or property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer value (amounts, positions, costs).
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Text value.
    Text(String),
    /// Reference to a registered entity.
    Entity(EntityId),
    /// Reference to a player.
    Player(PlayerId),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested table.
    Table(PropertyBag),
}

impl Value {
    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Value::Entity(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_player(&self) -> Option<PlayerId> {
        match self {
            Value::Player(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&PropertyBag> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Mutable access to a nested table.
    pub fn as_table_mut(&mut self) -> Option<&mut PropertyBag> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<EntityId> for Value {
    fn from(v: EntityId) -> Self {
        Value::Entity(v)
    }
}

impl From<PlayerId> for Value {
    fn from(v: PlayerId) -> Self {
        Value::Player(v)
    }
}

impl From<PropertyBag> for Value {
    fn from(v: PropertyBag) -> Self {
        Value::Table(v)
    }
}

/// Convenience accessors for property bags.
pub trait BagExt {
    /// Integer under `key`, or `default` when missing or not an Int.
    fn int_or(&self, key: &str, default: i64) -> i64;

    /// Bool under `key`, or `default` when missing or not a Bool.
    fn bool_or(&self, key: &str, default: bool) -> bool;

    /// Insert any value convertible into [`Value`].
    fn put(&mut self, key: &str, value: impl Into<Value>);
}

impl BagExt for PropertyBag {
    fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_int).unwrap_or(default)
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.insert(key.to_string(), value.into());
    }
}
