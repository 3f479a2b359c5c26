//! Trigger dispatch for content-defined abilities.
//!
//! Content never calls reactions directly. It fires a named trigger and
//! the dispatcher finds every live entity carrying an ability that reacts
//! to that name, orders them through [`crate::priority`], and invokes them
//! one at a time with the duel state.
//!
//! ## Dispatch Modes
//!
//! | Mode       | Entry point                            | Order              |
//! |------------|----------------------------------------|--------------------|
//! | Broadcast  | [`DuelState::trigger`]                 | priority           |
//! | Incite     | [`DuelState::incite_trigger`]          | priority           |
//! | Explicit   | [`DuelState::explicit_trigger`]        | attachment order   |
//! | Overwrite  | [`DuelState::overwrite_trigger`]       | reverse priority   |
//! | Pipeline   | [`DuelState::trigger_pipeline`]        | priority, folded   |
//!
//! ## Guarantees
//!
//! - A failing or panicking reaction is logged and skipped; the rest still run
//! - Nested dispatch beyond `max_trigger_depth` is refused with a warning
//! - Nothing dispatches once the duel has finished
//!
//! [`DuelState::trigger`]: crate::duel::DuelState::trigger
//! [`DuelState::incite_trigger`]: crate::duel::DuelState::incite_trigger
//! [`DuelState::explicit_trigger`]: crate::duel::DuelState::explicit_trigger
//! [`DuelState::overwrite_trigger`]: crate::duel::DuelState::overwrite_trigger
//! [`DuelState::trigger_pipeline`]: crate::duel::DuelState::trigger_pipeline

mod ability;
mod dispatcher;
mod pipeline;
mod record;

pub use ability::{Ability, AbilityBook, AmendFn, BroadcastFn, Reaction, ReactionCtx};
pub(crate) use dispatcher::{panic_message, DispatchState};
pub use dispatcher::{TriggerOptions, TriggerReaction};
pub use pipeline::{VALIDATION_ACCEPTED, VALIDATION_ORIGINAL, VALIDATION_PROPOSED};
pub use record::{validation_name, TriggerKind, TriggerRecord};
