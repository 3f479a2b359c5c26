//! Skirmish: a minimal two-player content pack for exercising the engine.
//!
//! - Each player has a hero (20 health by default) and a "Mana" resource
//! - Cards sit on the board, in hand or in the grave
//! - Commands: end the turn, play a card, gain mana, charge with a card, concede
//! - A hero at 0 health loses the duel
//!
//! Everything interesting happens through triggers, so content abilities
//! can hook every step (see [`trigger`]).

mod game;

pub use game::{actions, command, trigger, Skirmish, SkirmishBuilder};
