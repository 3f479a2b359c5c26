//! The duel loop and its host.
//!
//! [`DuelHost`] owns the duel state behind one coarse lock and runs a
//! single worker thread that drains the command queue. Connection threads
//! only enqueue commands or forward acknowledgements; they never touch the
//! state directly.

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::core::{DuelError, DuelResult, PlayerId, Value};
use crate::duel::{ActionTable, DuelState};
use crate::playback::{PlaybackSync, Transport};
use crate::triggers::panic_message;

use super::queue::{CommandEntry, CommandQueue};
use super::timer::{TimerHandle, TurnTimer};

/// Runs once after the loop stops.
pub type CleanupFn = Box<dyn FnOnce(&mut DuelState) + Send>;

/// Configures and spawns a [`DuelHost`].
pub struct HostBuilder {
    state: DuelState,
    actions: ActionTable,
    transport: Option<Arc<dyn Transport>>,
    cleanup: Option<CleanupFn>,
}

impl HostBuilder {
    /// Deliver playback requests through `transport`.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Run `cleanup` exactly once after the loop stops.
    #[must_use]
    pub fn on_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: FnOnce(&mut DuelState) + Send + 'static,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// Start the loop thread (and the turn timer, if configured).
    pub fn spawn(self) -> io::Result<DuelHost> {
        let mut state = self.state;
        let config = state.config().clone();

        let playback = self.transport.map(|transport| {
            let sync = Arc::new(PlaybackSync::new(transport, &config));
            state.attach_playback(Arc::clone(&sync));
            sync
        });
        let timer_handle = match (config.turn_timeout, &config.timeout_command) {
            (Some(budget), Some(_)) => Some(TimerHandle::new(budget)),
            _ => None,
        };

        let shared = Arc::new(HostShared {
            state: Mutex::new(state),
            queue: CommandQueue::new(),
            actions: self.actions,
            playback,
            timer: timer_handle.clone(),
            timeout_command: config.timeout_command,
            stale_after: config.stale_command_after,
            finished: AtomicBool::new(false),
            cleanup: Mutex::new(self.cleanup),
        });

        let timer = match timer_handle {
            Some(handle) => {
                let shared = Arc::clone(&shared);
                Some(TurnTimer::spawn(handle, move |turn| shared.on_turn_elapsed(turn))?)
            }
            None => None,
        };

        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("duel-loop".into())
                .spawn(move || shared.run_loop())?
        };

        Ok(DuelHost {
            shared,
            worker: Some(worker),
            timer,
        })
    }
}

/// A running duel.
///
/// ```
/// use std::sync::Arc;
/// use duel_core::core::{DuelConfig, PlayerId};
/// use duel_core::commands::DuelHost;
/// use duel_core::duel::{ActionTable, DuelState};
/// use duel_core::triggers::AbilityBook;
///
/// let config = DuelConfig::new(1).with_first_player(PlayerId::FIRST).headless();
/// let state = DuelState::with_default_players(config, Arc::new(AbilityBook::new()));
/// let actions = ActionTable::new().with("Concede", |state, player, _| {
///     state.finish(Some(player.opponent()));
///     Ok(())
/// });
///
/// let host = DuelHost::builder(state, actions).spawn().unwrap();
/// assert!(host.enqueue(PlayerId::SECOND, "Concede", Vec::new()));
/// host.join();
/// ```
pub struct DuelHost {
    shared: Arc<HostShared>,
    worker: Option<JoinHandle<()>>,
    timer: Option<TurnTimer>,
}

impl DuelHost {
    pub fn builder(state: DuelState, actions: ActionTable) -> HostBuilder {
        HostBuilder {
            state,
            actions,
            transport: None,
            cleanup: None,
        }
    }

    /// Spawn with no transport and no cleanup hook.
    pub fn spawn(state: DuelState, actions: ActionTable) -> io::Result<Self> {
        Self::builder(state, actions).spawn()
    }

    /// Queue a command for `player`. Callable from any thread.
    ///
    /// Returns `false` when the command id is unknown or the duel is over.
    pub fn enqueue(&self, player: PlayerId, command: &str, args: Vec<Value>) -> bool {
        let Some(action) = self.shared.actions.get(command).cloned() else {
            warn!(player = %player, error = %DuelError::UnknownCommand(command.to_string()), "command dropped");
            return false;
        };
        let entry = CommandEntry::new(player, command, move |state| action(state, player, &args));
        self.shared.queue.push(entry)
    }

    /// Forward a client acknowledgement. Never takes the duel lock.
    pub fn acknowledge(&self, player: PlayerId) -> bool {
        self.shared
            .playback
            .as_ref()
            .is_some_and(|playback| playback.acknowledge(player))
    }

    /// Release any playback wait on `player`.
    pub fn disconnect(&self, player: PlayerId) {
        if let Some(playback) = &self.shared.playback {
            playback.disconnect(player);
        }
    }

    /// Run a read-only query under the duel lock.
    pub fn with_state<R>(&self, query: impl FnOnce(&DuelState) -> R) -> R {
        query(&*self.shared.state.lock())
    }

    #[must_use]
    pub fn playback(&self) -> Option<&Arc<PlaybackSync>> {
        self.shared.playback.as_ref()
    }

    #[must_use]
    pub fn timer(&self) -> Option<&TimerHandle> {
        self.timer.as_ref().map(TurnTimer::handle)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Acquire)
    }

    /// Finish the duel from outside the loop (host shutdown, forfeit on
    /// disconnect).
    pub fn finish(&self, winner: Option<PlayerId>) {
        let mut state = self.shared.state.lock();
        state.finish(winner);
        self.shared.after_mutation(&state);
    }

    /// Stop the loop without finishing the duel. Pending commands are dropped.
    pub fn close(&self) {
        self.shared.queue.close();
    }

    /// Wait for the loop to stop.
    pub fn join(mut self) {
        self.stop_worker(false);
    }

    fn stop_worker(&mut self, close: bool) {
        if close {
            self.shared.queue.close();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("duel loop thread panicked");
            }
        }
        if let Some(timer) = self.timer.take() {
            timer.shutdown();
        }
    }
}

impl Drop for DuelHost {
    fn drop(&mut self) {
        self.stop_worker(true);
    }
}

impl fmt::Debug for DuelHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuelHost")
            .field("queue", &self.shared.queue)
            .field("finished", &self.is_finished())
            .finish()
    }
}

struct HostShared {
    state: Mutex<DuelState>,
    queue: CommandQueue,
    actions: ActionTable,
    playback: Option<Arc<PlaybackSync>>,
    timer: Option<TimerHandle>,
    timeout_command: Option<String>,
    stale_after: Duration,
    finished: AtomicBool,
    cleanup: Mutex<Option<CleanupFn>>,
}

impl HostShared {
    fn run_loop(&self) {
        {
            let mut state = self.state.lock();
            if !state.is_started() {
                state.start();
            }
            self.after_mutation(&state);
        }
        info!("duel loop running");

        while !self.finished.load(Ordering::Acquire) {
            let Some(entry) = self.queue.pop_blocking() else {
                break;
            };
            self.execute(entry);
        }

        self.run_cleanup();
        info!("duel loop stopped");
    }

    fn execute(&self, entry: CommandEntry) {
        let age = entry.age();
        if age > self.stale_after {
            let err = DuelError::StaleCommand {
                player: entry.player,
                command: entry.command.clone(),
                age_ms: age.as_millis(),
            };
            debug!("{}", err);
            return;
        }

        let mut state = self.state.lock();
        if state.is_finished() {
            self.after_mutation(&state);
            return;
        }
        if let Some(timer) = &self.timer {
            timer.pause();
        }

        let player = entry.player;
        let command = entry.command.clone();
        debug!(player = %player, command = %command, "executing command");
        run_guarded(player, &command, || entry.run(&mut *state));
        state.clear_dispatch_stack();

        self.after_mutation(&state);
    }

    /// Runs on the timer thread with the number of the turn that ran out.
    fn on_turn_elapsed(&self, turn: u32) {
        let mut state = self.state.lock();
        if state.is_finished() || state.turn_count() != turn {
            debug!(turn, "turn timer fired for a superseded turn");
            return;
        }
        let (Some(owner), Some(command)) = (state.turn_owner(), self.timeout_command.as_deref()) else {
            return;
        };
        warn!(turn, player = %owner, command = %command, "turn time elapsed");

        match self.actions.get(command).cloned() {
            Some(action) => run_guarded(owner, command, || action(&mut *state, owner, &[])),
            None => warn!(error = %DuelError::UnknownCommand(command.to_string()), "timeout command missing"),
        }
        state.clear_dispatch_stack();
        self.after_mutation(&state);
    }

    /// Sync the timer and the finished flag with the state.
    fn after_mutation(&self, state: &DuelState) {
        if state.is_finished() {
            if let Some(timer) = &self.timer {
                timer.disarm();
            }
            if !self.finished.swap(true, Ordering::AcqRel) {
                self.queue.close();
            }
            return;
        }
        if let (Some(timer), Some(turn)) = (&self.timer, state.current_turn()) {
            timer.resume_for(turn.number);
        }
    }

    fn run_cleanup(&self) {
        let Some(cleanup) = self.cleanup.lock().take() else {
            return;
        };
        let mut state = self.state.lock();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| cleanup(&mut *state))) {
            error!(reason = %panic_message(payload.as_ref()), "cleanup hook failed");
        }
    }
}

fn run_guarded(player: PlayerId, command: &str, call: impl FnOnce() -> DuelResult) {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(player = %player, command = %command, error = %err, "command failed"),
        Err(payload) => error!(
            player = %player,
            command = %command,
            reason = %panic_message(payload.as_ref()),
            "command panicked"
        ),
    }
}
