//! Blocking sends and acknowledgement tracking.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::core::{DuelConfig, PlayerId, PlayerMap, Value};

use super::transport::{RequestTarget, Transport};

/// How a blocking send was released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AckOutcome {
    /// The client acknowledged in time.
    Acknowledged,
    /// The wait timed out; execution continued anyway.
    TimedOut,
    /// The player is (or became) disconnected.
    Disconnected,
    /// Playback is disabled; the request was sent without waiting.
    Skipped,
}

impl AckOutcome {
    #[must_use]
    pub fn is_acknowledged(self) -> bool {
        self == AckOutcome::Acknowledged
    }
}

#[derive(Debug)]
struct AckState {
    /// A blocking send is waiting on this player.
    waiting: PlayerMap<bool>,
    /// Acknowledgement received for the current wait.
    ready: PlayerMap<bool>,
    connected: PlayerMap<bool>,
}

/// Playback channel for one duel.
///
/// Connection threads call [`acknowledge`](Self::acknowledge) and
/// [`disconnect`](Self::disconnect); the duel loop calls the send methods.
/// Every readiness flag lives under one lock, so concurrent acknowledgements
/// from both connections cannot both miss the release condition.
pub struct PlaybackSync {
    transport: Arc<dyn Transport>,
    config: DuelConfig,
    state: Mutex<AckState>,
    signal: Condvar,
}

impl PlaybackSync {
    pub fn new(transport: Arc<dyn Transport>, config: &DuelConfig) -> Self {
        Self {
            transport,
            config: config.clone(),
            state: Mutex::new(AckState {
                waiting: PlayerMap::with_value(false),
                ready: PlayerMap::with_value(false),
                connected: PlayerMap::with_value(true),
            }),
            signal: Condvar::new(),
        }
    }

    /// Send without waiting for anything.
    pub fn send(&self, target: RequestTarget, request_id: &str, payload: &Value) {
        self.transport.send_request(target, request_id, payload);
    }

    /// Send to one player and wait for their acknowledgement.
    ///
    /// Fail-open: returns after `ack_timeout` at the latest, or at once if
    /// the player disconnects.
    pub fn send_blocking(&self, player: PlayerId, request_id: &str, payload: &Value) -> AckOutcome {
        self.send_and_wait(RequestTarget::Player(player), request_id, payload)[player]
    }

    /// Send to both players and wait until both acknowledge or the timeout
    /// elapses. Reports the outcome per player.
    pub fn send_blocking_both(&self, request_id: &str, payload: &Value) -> PlayerMap<AckOutcome> {
        self.send_and_wait(RequestTarget::Both, request_id, payload)
    }

    /// Record a "ready" acknowledgement from `player`.
    ///
    /// Returns `false` when no blocking send was waiting on them.
    pub fn acknowledge(&self, player: PlayerId) -> bool {
        let mut state = self.state.lock();
        if !state.waiting[player] {
            debug!(player = %player, "acknowledgement with no pending request ignored");
            return false;
        }
        state.ready[player] = true;
        self.signal.notify_all();
        true
    }

    /// Mark `player` disconnected, releasing any wait on them.
    pub fn disconnect(&self, player: PlayerId) {
        let mut state = self.state.lock();
        state.connected[player] = false;
        self.signal.notify_all();
        debug!(player = %player, "player disconnected from playback");
    }

    pub fn reconnect(&self, player: PlayerId) {
        self.state.lock().connected[player] = true;
    }

    #[must_use]
    pub fn is_connected(&self, player: PlayerId) -> bool {
        self.state.lock().connected[player]
    }

    /// Sleep for a presentation delay scaled by the playback speed.
    ///
    /// No-op when playback is disabled.
    pub fn pause(&self, base: Duration) {
        let scaled = self.config.scaled_pause(base);
        if !scaled.is_zero() {
            thread::sleep(scaled);
        }
    }

    fn send_and_wait(&self, target: RequestTarget, request_id: &str, payload: &Value) -> PlayerMap<AckOutcome> {
        let targets = PlayerMap::new(|p| target.includes(p));
        let mut outcomes = PlayerMap::with_value(AckOutcome::Skipped);

        {
            let mut state = self.state.lock();
            for (player, targeted) in targets.iter() {
                if !*targeted {
                    continue;
                }
                if state.connected[player] {
                    state.ready[player] = false;
                    state.waiting[player] = !self.config.playback_disabled;
                } else {
                    outcomes[player] = AckOutcome::Disconnected;
                }
            }
        }

        // Flags are armed before sending so an immediate reply is not lost.
        self.transport.send_request(target, request_id, payload);
        if self.config.playback_disabled {
            return outcomes;
        }

        let deadline = Instant::now() + self.config.ack_timeout;
        let mut state = self.state.lock();
        loop {
            let released = PlayerId::both()
                .filter(|&p| targets[p])
                .all(|p| state.ready[p] || !state.connected[p]);
            if released || self.signal.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }

        for player in PlayerId::both().filter(|&p| targets[p]) {
            outcomes[player] = if state.ready[player] {
                AckOutcome::Acknowledged
            } else if !state.connected[player] {
                AckOutcome::Disconnected
            } else {
                warn!(player = %player, request = %request_id, "acknowledgement timed out, continuing");
                AckOutcome::TimedOut
            };
            state.waiting[player] = false;
            state.ready[player] = false;
        }
        outcomes
    }
}

impl fmt::Debug for PlaybackSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSync")
            .field("state", &*self.state.lock())
            .field("ack_timeout", &self.config.ack_timeout)
            .field("disabled", &self.config.playback_disabled)
            .finish()
    }
}
