//! Turn budget timer.
//!
//! One background thread per duel counts down the current turn's budget.
//! The loop pauses it while a command runs and resumes it afterwards, so
//! time spent executing commands is not charged to the player. The
//! countdown restarts from the full budget whenever a newer turn number
//! is seen.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug)]
struct TimerState {
    /// Turn the countdown belongs to; 0 before any turn.
    turn: u32,
    remaining: Duration,
    /// Set while counting down.
    running_since: Option<Instant>,
    armed: bool,
    shutdown: bool,
}

#[derive(Debug)]
struct TimerShared {
    state: Mutex<TimerState>,
    signal: Condvar,
}

/// Control handle for a turn timer. Cheap to clone.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    shared: Arc<TimerShared>,
    budget: Duration,
}

impl TimerHandle {
    /// A stopped timer with the given per-turn budget.
    pub fn new(budget: Duration) -> Self {
        Self {
            shared: Arc::new(TimerShared {
                state: Mutex::new(TimerState {
                    turn: 0,
                    remaining: budget,
                    running_since: None,
                    armed: false,
                    shutdown: false,
                }),
                signal: Condvar::new(),
            }),
            budget,
        }
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Stop the countdown, keeping the time left.
    pub fn pause(&self) {
        let mut state = self.shared.state.lock();
        if let Some(since) = state.running_since.take() {
            state.remaining = state.remaining.saturating_sub(since.elapsed());
        }
    }

    /// Continue counting for `turn`.
    ///
    /// A newer turn restarts from the full budget; an older one is ignored.
    pub fn resume_for(&self, turn: u32) {
        let mut state = self.shared.state.lock();
        if turn < state.turn || turn == 0 {
            return;
        }
        if turn > state.turn {
            debug!(turn, budget_ms = self.budget.as_millis(), "turn timer armed");
            state.turn = turn;
            state.remaining = self.budget;
            state.armed = true;
            state.running_since = None;
        }
        if state.armed && state.running_since.is_none() {
            state.running_since = Some(Instant::now());
            self.shared.signal.notify_all();
        }
    }

    /// Stop the countdown for good (until a newer turn is seen).
    pub fn disarm(&self) {
        let mut state = self.shared.state.lock();
        state.armed = false;
        state.running_since = None;
        self.shared.signal.notify_all();
    }

    /// Time left in the current turn, if armed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let state = self.shared.state.lock();
        if !state.armed {
            return None;
        }
        let spent = state.running_since.map_or(Duration::ZERO, |since| since.elapsed());
        Some(state.remaining.saturating_sub(spent))
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        let state = self.shared.state.lock();
        state.armed && state.running_since.is_some()
    }

    fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        state.shutdown = true;
        self.shared.signal.notify_all();
    }
}

/// The countdown thread.
#[derive(Debug)]
pub struct TurnTimer {
    handle: TimerHandle,
    thread: Option<JoinHandle<()>>,
}

impl TurnTimer {
    /// Start the countdown thread.
    ///
    /// `on_elapsed` runs on the timer thread with the number of the turn
    /// that ran out; the timer is disarmed by then.
    pub fn spawn<F>(handle: TimerHandle, mut on_elapsed: F) -> io::Result<Self>
    where
        F: FnMut(u32) + Send + 'static,
    {
        let shared = Arc::clone(&handle.shared);
        let thread = thread::Builder::new()
            .name("duel-turn-timer".into())
            .spawn(move || countdown(&shared, &mut on_elapsed))?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    #[must_use]
    pub fn handle(&self) -> &TimerHandle {
        &self.handle
    }

    /// Stop the thread and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.handle.shutdown();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                debug!("turn timer thread panicked");
            }
        }
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn countdown(shared: &TimerShared, on_elapsed: &mut dyn FnMut(u32)) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        let deadline = match (state.armed, state.running_since) {
            (true, Some(since)) => since + state.remaining,
            _ => {
                shared.signal.wait(&mut state);
                continue;
            }
        };
        if Instant::now() < deadline {
            shared.signal.wait_until(&mut state, deadline);
            continue;
        }

        let turn = state.turn;
        state.armed = false;
        state.running_since = None;
        state.remaining = Duration::ZERO;
        MutexGuard::unlocked(&mut state, || on_elapsed(turn));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn test_fires_once_for_turn() {
        let (tx, rx) = mpsc::channel();
        let handle = TimerHandle::new(Duration::from_millis(30));
        let timer = TurnTimer::spawn(handle.clone(), move |turn| {
            let _ = tx.send(turn);
        })
        .unwrap();

        handle.resume_for(1);
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(1));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(handle.remaining().is_none());
        timer.shutdown();
    }

    #[test]
    fn test_pause_holds_the_budget() {
        let (tx, rx) = mpsc::channel();
        let handle = TimerHandle::new(Duration::from_millis(80));
        let _timer = TurnTimer::spawn(handle.clone(), move |turn| {
            let _ = tx.send(turn);
        })
        .unwrap();

        handle.resume_for(1);
        handle.pause();
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!handle.is_running());

        handle.resume_for(1);
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(1));
    }

    #[test]
    fn test_older_turn_is_ignored() {
        let handle = TimerHandle::new(Duration::from_secs(60));
        handle.resume_for(3);
        handle.pause();
        handle.resume_for(2);
        assert!(!handle.is_running());
        handle.resume_for(4);
        assert!(handle.is_running());
        assert!(handle.remaining().is_some_and(|left| left > Duration::from_secs(59)));
    }

    #[test]
    fn test_disarm_prevents_firing() {
        let (tx, rx) = mpsc::channel();
        let handle = TimerHandle::new(Duration::from_millis(40));
        let _timer = TurnTimer::spawn(handle.clone(), move |turn| {
            let _ = tx.send(turn);
        })
        .unwrap();

        handle.resume_for(1);
        handle.disarm();
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
    }
}
