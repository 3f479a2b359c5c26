//! Turn records.

use std::time::{Duration, Instant};

use crate::core::PlayerId;

/// One player's turn.
///
/// The current turn is the entry for the latest turn number in the duel's
/// turn history; once a new turn starts, the old record is only read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnData {
    /// Monotonic turn number, starting at 1.
    pub number: u32,
    pub owner: PlayerId,
    /// Remaining action points.
    pub action_points: i64,
    pub started_at: Instant,
    /// Number of the turn this one superseded.
    pub previous: Option<u32>,
}

impl TurnData {
    pub fn new(number: u32, owner: PlayerId, action_points: i64, previous: Option<u32>) -> Self {
        Self {
            number,
            owner,
            action_points,
            started_at: Instant::now(),
            previous,
        }
    }

    /// Time since the turn started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
