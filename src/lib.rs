//! # duel-core
//!
//! Authoritative rules core for a two-party, turn-based card duel.
//!
//! ## Design Principles
//!
//! 1. **One Writer**: a single loop thread executes commands under one lock.
//!    Connection threads only enqueue commands and forward acknowledgements.
//!
//! 2. **Deterministic Ordering**: simultaneous reactions are totally ordered
//!    by a fixed comparer chain computed before any of them runs.
//!
//! 3. **Failure Containment**: a faulty reaction or command is logged and
//!    skipped. Nothing escapes the dispatcher or the duel loop.
//!
//! 4. **Explicit Registration**: abilities and actions are typed closures in
//!    tables built before the duel starts; entities are released explicitly.
//!
//! ## Modules
//!
//! - `core`: entity and player IDs, values, configuration, RNG, errors
//! - `registry`: per-duel entity directory
//! - `priority`: the reaction priority comparer chain
//! - `triggers`: abilities and trigger dispatch (broadcast, overwrite, pipeline)
//! - `duel`: duel state, turns, lifecycle and the action table
//! - `commands`: command queue, turn timer and the duel loop host
//! - `playback`: blocking client synchronization
//! - `games`: content packs (`skirmish`)
//!
//! ## Logging
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod core;
pub mod registry;
pub mod priority;
pub mod triggers;
pub mod duel;
pub mod commands;
pub mod playback;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    BagExt, DuelConfig, DuelError, DuelResult, EntityId, GameRng, PlayerId, PlayerMap, PropertyBag, Value,
};

pub use crate::registry::{CardLocation, CardPlacement, Entity, EntityCategory, EntityDirectory, EntityKind, EntitySpec};

pub use crate::priority::{CategoryRanks, CompareFn, PriorityContext, PriorityKey};

pub use crate::triggers::{Ability, AbilityBook, Reaction, ReactionCtx, TriggerKind, TriggerOptions, TriggerRecord};

pub use crate::duel::{ActionTable, DuelHooks, DuelPhase, DuelState, TurnData};

pub use crate::commands::{CommandQueue, DuelHost, TurnTimer};

pub use crate::playback::{AckOutcome, PlaybackSync, RequestTarget, Transport};
