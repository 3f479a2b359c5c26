//! Duel state, turns and lifecycle.
//!
//! [`DuelState`] is the aggregate root for one duel: the two player seats,
//! the entity directory, turn history and lifecycle phase. Trigger
//! dispatch is implemented as methods on it (see [`crate::triggers`]),
//! so a reaction holding `&mut DuelState` can fire nested triggers.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use duel_core::core::{DuelConfig, PlayerId};
//! use duel_core::duel::DuelState;
//! use duel_core::triggers::AbilityBook;
//!
//! let config = DuelConfig::new(1).with_first_player(PlayerId::SECOND).with_starting_level(4);
//! let mut duel = DuelState::with_default_players(config, Arc::new(AbilityBook::new()));
//!
//! duel.start();
//! duel.next_turn();
//!
//! assert_eq!(duel.turn_owner(), Some(PlayerId::SECOND));
//! assert_eq!(duel.action_points(), 4);
//! ```

mod actions;
mod lifecycle;
mod state;
mod turn;

pub use actions::{ActionFn, ActionTable};
pub use lifecycle::{DuelHooks, HookFn, GAME_ENDED, GAME_STARTED, TURN_STARTED};
pub use state::{DuelPhase, DuelState, PlayerSeat};
pub use turn::TurnData;
