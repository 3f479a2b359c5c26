//! Core engine types: entity and player identity, values, configuration,
//! RNG and the error taxonomy.
//!
//! Everything here is free of duel state and safe to share between the
//! duel loop thread and connection threads.

pub mod entity;
pub mod player;
pub mod value;
pub mod config;
pub mod rng;
pub mod error;

pub use entity::EntityId;
pub use player::{PlayerId, PlayerMap};
pub use value::{BagExt, PropertyBag, Value};
pub use config::{DuelConfig, DEFAULT_ACK_TIMEOUT, DEFAULT_MAX_TRIGGER_DEPTH, DEFAULT_STALE_COMMAND_AFTER};
pub use rng::GameRng;
pub use error::{DuelError, DuelResult};
