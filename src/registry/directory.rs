//! Per-duel entity directory.
//!
//! The directory owns index allocation and the index → entity map for one
//! duel. Released indices go back to a free set and the lowest one is
//! reused first, so allocation is deterministic regardless of release
//! timing.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::EntityId;

use super::entity::{Entity, EntitySpec};

/// Index allocator and entity store for one duel.
#[derive(Clone, Debug, Default)]
pub struct EntityDirectory {
    /// Slot per issued index; `None` once released.
    slots: Vec<Option<Entity>>,

    /// Released indices available for reuse.
    free: BTreeSet<u32>,

    /// Number of live entities.
    live: usize,
}

impl EntityDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity and return its index.
    pub fn register(&mut self, spec: EntitySpec) -> EntityId {
        let id = match self.free.pop_first() {
            Some(index) => EntityId(index),
            None => {
                self.slots.push(None);
                EntityId((self.slots.len() - 1) as u32)
            }
        };

        debug!(entity = %id, name = %spec.name, "entity registered");
        self.slots[id.index()] = Some(Entity::from_spec(id, spec));
        self.live += 1;
        id
    }

    /// Release an entity, making its index reusable.
    ///
    /// Returns the released entity, or `None` if the index was not live.
    pub fn release(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.slots.get_mut(id.index())?.take()?;
        self.free.insert(id.raw());
        self.live -= 1;
        debug!(entity = %id, name = %entity.name, "entity released");
        Some(entity)
    }

    /// Release every entity (duel teardown).
    pub fn release_all(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Look up a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index())?.as_ref()
    }

    /// Look up a live entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Find a live entity by its stable item path.
    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<&Entity> {
        self.iter().find(|e| e.item_path.as_deref() == Some(path))
    }

    /// Iterate live entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
