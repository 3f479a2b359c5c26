//! Entity directory: stable identity and liveness for reactive entities.
//!
//! Every player, hero, card instance, resource type and persistent effect
//! that can react to triggers is registered here before the dispatcher can
//! discover it. The owning manager calls [`EntityDirectory::release`] the
//! moment an object leaves play; lookups of a released index return `None`.
//!
//! ## Key Types
//!
//! - [`EntitySpec`]: builder describing an entity before registration
//! - [`Entity`]: a registered entity with its index and property bag
//! - [`EntityKind`] / [`EntityCategory`]: structural data used for ordering
//! - [`EntityDirectory`]: the per-duel allocator and store

mod directory;
mod entity;

pub use directory::EntityDirectory;
pub use entity::{CardLocation, CardPlacement, Entity, EntityCategory, EntityKind, EntitySpec};
