//! Content packs built on the engine.

pub mod skirmish;
