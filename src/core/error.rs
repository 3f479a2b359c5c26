//! Error taxonomy for the duel core.
//!
//! None of these ever escape the dispatcher or the duel loop: both are
//! outer boundaries that turn every failure into a log event or a no-op.
//! Content closures (reactions and actions) return [`DuelResult`] so they
//! can surface a failure with `?` and have it logged with context.

use thiserror::Error;

use super::entity::EntityId;
use super::player::PlayerId;

/// Result type for reactions, actions and lifecycle transitions.
pub type DuelResult<T = ()> = Result<T, DuelError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DuelError {
    /// A queued command outlived the staleness window before it ran.
    #[error("command `{command}` from {player} is {age_ms}ms old and was dropped")]
    StaleCommand {
        player: PlayerId,
        command: String,
        age_ms: u128,
    },

    /// Nested dispatch reached the configured maximum depth.
    #[error("trigger `{trigger}` exceeded the maximum chain depth of {max_depth}")]
    TriggerChainOverflow { trigger: String, max_depth: u32 },

    /// A single reaction failed during dispatch.
    #[error("reaction `{ability}` on {reactor} failed during `{trigger}`: {reason}")]
    ReactionFailure {
        trigger: String,
        reactor: EntityId,
        ability: String,
        reason: String,
    },

    /// A lifecycle operation was called from the wrong state.
    #[error("cannot {operation} while duel is {state}")]
    InvalidStateTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// Lookup of a released or never-issued entity index.
    #[error("{0} is not registered")]
    UnresolvedEntity(EntityId),

    /// A command id with no entry in the action table.
    #[error("no action registered for command `{0}`")]
    UnknownCommand(String),

    /// Content refused an action (not enough action points, bad target...).
    #[error("action rejected: {0}")]
    Rejected(String),
}

impl DuelError {
    /// Shorthand for content-level refusals.
    pub fn rejected(reason: impl Into<String>) -> Self {
        DuelError::Rejected(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = DuelError::ReactionFailure {
            trigger: "CardPlayed".into(),
            reactor: EntityId(4),
            ability: "Echo".into(),
            reason: "boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "reaction `Echo` on Entity(4) failed during `CardPlayed`: boom"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = DuelError::InvalidStateTransition {
            operation: "start",
            state: "ongoing",
        };
        assert_eq!(err.to_string(), "cannot start while duel is ongoing");
    }
}
