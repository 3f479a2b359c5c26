//! Lifecycle state machine: start, turns, finish.
//!
//! ```text
//! NotStarted --start()--> Ongoing --finish()--> Finished
//!                          |   ^
//!                          +---+ new_turn()
//! ```
//!
//! A call from the wrong phase logs `InvalidStateTransition` and returns
//! `false`; it never panics or changes state.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info};

use crate::core::{DuelError, DuelResult, PlayerId, Value};
use crate::triggers::panic_message;

use super::state::{DuelPhase, DuelState};
use super::turn::TurnData;

/// Broadcast once when the duel starts.
pub const GAME_STARTED: &str = "GameStarted";

/// Broadcast at the start of every turn with `[Player(owner), Int(number)]`.
pub const TURN_STARTED: &str = "TurnStarted";

/// Broadcast once as the duel finishes, with `[Player(winner)]` or no
/// arguments for a draw.
pub const GAME_ENDED: &str = "GameEnded";

/// A one-shot lifecycle callback.
pub type HookFn = Box<dyn FnOnce(&mut DuelState) -> DuelResult + Send>;

/// Callbacks fired on lifecycle transitions. Each fires at most once.
#[derive(Default)]
pub struct DuelHooks {
    on_start: Option<HookFn>,
    on_finish: Option<HookFn>,
}

impl DuelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut DuelState) -> DuelResult + Send + 'static,
    {
        self.on_start = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_finish<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut DuelState) -> DuelResult + Send + 'static,
    {
        self.on_finish = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for DuelHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuelHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_finish", &self.on_finish.is_some())
            .finish()
    }
}

impl DuelState {
    /// Move from `NotStarted` to `Ongoing`.
    ///
    /// Broadcasts [`GAME_STARTED`], then runs the start hook. Turns are not
    /// created here; the start hook (or the host) calls [`new_turn`].
    ///
    /// [`new_turn`]: DuelState::new_turn
    pub fn start(&mut self) -> bool {
        if !self.check_phase("start", DuelPhase::NotStarted) {
            return false;
        }
        self.phase = DuelPhase::Ongoing;
        info!(first_player = %self.first_player(), "duel started");

        self.trigger(GAME_STARTED, None, &[]);
        if let Some(hook) = self.hooks.on_start.take() {
            self.run_hook("on_start", hook);
        }
        true
    }

    /// Begin a new turn for `player`.
    ///
    /// The outgoing turn is archived as its owner's last turn, the counter
    /// advances, and the new turn starts with the player's level in action
    /// points.
    pub fn new_turn(&mut self, player: PlayerId) -> bool {
        if !self.check_phase("start a new turn", DuelPhase::Ongoing) {
            return false;
        }

        let previous = self.current_turn().cloned();
        let previous_number = previous.as_ref().map(|t| t.number);
        if let Some(outgoing) = previous {
            let owner = outgoing.owner;
            self.seat_mut(owner).last_turn = Some(outgoing);
        }

        self.turn_count += 1;
        let turn = TurnData::new(self.turn_count, player, self.level(player), previous_number);
        info!(turn = turn.number, player = %player, action_points = turn.action_points, "turn started");
        self.turn_history.insert(self.turn_count, turn);

        let source = self.seat(player).entity;
        self.trigger(
            TURN_STARTED,
            Some(source),
            &[Value::Player(player), Value::Int(i64::from(self.turn_count))],
        );
        true
    }

    /// Pass the turn under the alternating policy.
    ///
    /// The first turn goes to the configured (or coin-flipped) first player.
    pub fn next_turn(&mut self) -> bool {
        let next = self
            .turn_owner()
            .map_or_else(|| self.first_player(), PlayerId::opponent);
        self.new_turn(next)
    }

    /// Move from `Ongoing` to `Finished` and run the finish hook.
    ///
    /// [`GAME_ENDED`] is broadcast while the duel is still ongoing. After
    /// this returns every trigger dispatch is a no-op.
    pub fn finish(&mut self, winner: Option<PlayerId>) -> bool {
        if !self.check_phase("finish", DuelPhase::Ongoing) {
            return false;
        }
        let args: Vec<Value> = winner.map(Value::Player).into_iter().collect();
        self.trigger(GAME_ENDED, None, &args);
        if self.phase != DuelPhase::Ongoing {
            // A reaction finished the duel first.
            return false;
        }
        self.phase = DuelPhase::Finished;
        self.winner = winner;
        match winner {
            Some(player) => info!(winner = %player, turns = self.turn_count, "duel finished"),
            None => info!(turns = self.turn_count, "duel finished without a winner"),
        }

        if let Some(hook) = self.hooks.on_finish.take() {
            self.run_hook("on_finish", hook);
        }
        true
    }

    /// Spend action points from the current turn.
    ///
    /// Fails without spending anything when `player` does not own the
    /// current turn or has too few points left.
    pub fn spend_action_points(&mut self, player: PlayerId, amount: i64) -> DuelResult {
        if amount < 0 {
            return Err(DuelError::rejected(format!("cannot spend {amount} action points")));
        }
        let number = self.turn_count;
        let turn = self
            .turn_history
            .get_mut(&number)
            .ok_or_else(|| DuelError::rejected("no turn in progress"))?;
        if turn.owner != player {
            return Err(DuelError::rejected(format!("{player} does not own turn {number}")));
        }
        if turn.action_points < amount {
            return Err(DuelError::rejected(format!(
                "{player} has {} action points, needs {amount}",
                turn.action_points
            )));
        }
        turn.action_points -= amount;
        Ok(())
    }

    /// Action points left in the current turn.
    #[must_use]
    pub fn action_points(&self) -> i64 {
        self.current_turn().map_or(0, |t| t.action_points)
    }

    /// Release every entity. The state must not be reused afterwards.
    pub fn teardown(&mut self) {
        let released = self.directory().len();
        self.directory_mut().release_all();
        info!(released, "duel torn down");
    }

    fn check_phase(&self, operation: &'static str, expected: DuelPhase) -> bool {
        if self.phase == expected {
            return true;
        }
        let err = DuelError::InvalidStateTransition {
            operation,
            state: self.phase.as_str(),
        };
        error!("{}", err);
        false
    }

    fn run_hook(&mut self, name: &'static str, hook: HookFn) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook(self)));
        let reason = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        error!(hook = name, %reason, "lifecycle hook failed");
    }
}
