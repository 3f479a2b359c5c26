//! Entity identification.
//!
//! Every reactive game object (player, hero, card instance, resource type,
//! persistent effect) is addressed by an `EntityId`. IDs are handed out by
//! the per-duel [`EntityDirectory`](crate::registry::EntityDirectory) and
//! become reusable once the entity is released.
//!
//! ```
//! use duel_core::core::EntityId;
//!
//! let id = EntityId::new(7);
//! assert_eq!(id.raw(), 7);
//! assert_eq!(format!("{}", id), "Entity(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a registered entity.
///
/// Only unique within one directory and only for the lifetime of the
/// entity it was issued to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index as a `usize` for slot lookups.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
