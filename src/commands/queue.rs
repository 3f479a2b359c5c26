//! Per-player command queue.
//!
//! Each player has at most one pending command: a new submission replaces
//! the old one in place. The loop takes the oldest submission across both
//! players, so execution follows submission time.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::core::{DuelResult, PlayerId, PlayerMap};
use crate::duel::DuelState;

/// A command with its arguments already bound.
pub type DeferredAction = Box<dyn FnOnce(&mut DuelState) -> DuelResult + Send>;

/// One queued command.
pub struct CommandEntry {
    pub player: PlayerId,
    /// Command id, kept for logging.
    pub command: String,
    pub submitted_at: Instant,
    action: DeferredAction,
}

impl CommandEntry {
    pub fn new<F>(player: PlayerId, command: impl Into<String>, action: F) -> Self
    where
        F: FnOnce(&mut DuelState) -> DuelResult + Send + 'static,
    {
        Self {
            player,
            command: command.into(),
            submitted_at: Instant::now(),
            action: Box::new(action),
        }
    }

    /// Override the submission time.
    #[must_use]
    pub fn with_submitted_at(mut self, at: Instant) -> Self {
        self.submitted_at = at;
        self
    }

    #[must_use]
    pub fn age(&self) -> Duration {
        self.submitted_at.elapsed()
    }

    /// Run the command against the duel.
    pub fn run(self, state: &mut DuelState) -> DuelResult {
        (self.action)(state)
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("player", &self.player)
            .field("command", &self.command)
            .field("age", &self.age())
            .finish()
    }
}

#[derive(Default)]
struct Pending {
    slots: PlayerMap<Option<CommandEntry>>,
    closed: bool,
}

impl Pending {
    fn take_earliest(&mut self) -> Option<CommandEntry> {
        let mut earliest: Option<PlayerId> = None;
        for (player, slot) in self.slots.iter() {
            let Some(entry) = slot else { continue };
            let earlier = earliest
                .and_then(|p| self.slots[p].as_ref())
                .map_or(true, |best| entry.submitted_at < best.submitted_at);
            if earlier {
                earliest = Some(player);
            }
        }
        self.slots[earliest?].take()
    }
}

/// Wake-on-submit queue shared between connection threads and the loop.
#[derive(Default)]
pub struct CommandQueue {
    pending: Mutex<Pending>,
    ready: Condvar,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `entry`, replacing the player's pending command if any.
    ///
    /// Returns `false` once the queue is closed.
    pub fn push(&self, entry: CommandEntry) -> bool {
        let mut pending = self.pending.lock();
        if pending.closed {
            debug!(player = %entry.player, command = %entry.command, "queue closed, command dropped");
            return false;
        }
        let player = entry.player;
        if let Some(replaced) = pending.slots[player].replace(entry) {
            debug!(player = %player, command = %replaced.command, "pending command superseded");
        }
        self.ready.notify_one();
        true
    }

    /// Take the oldest pending command, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue is closed; commands still pending at
    /// that point are discarded.
    pub fn pop_blocking(&self) -> Option<CommandEntry> {
        let mut pending = self.pending.lock();
        loop {
            if pending.closed {
                return None;
            }
            if let Some(entry) = pending.take_earliest() {
                return Some(entry);
            }
            self.ready.wait(&mut pending);
        }
    }

    /// Take the oldest pending command without waiting.
    pub fn try_pop(&self) -> Option<CommandEntry> {
        let mut pending = self.pending.lock();
        if pending.closed {
            return None;
        }
        pending.take_earliest()
    }

    /// Stop accepting commands and wake the loop.
    pub fn close(&self) {
        let mut pending = self.pending.lock();
        pending.closed = true;
        self.ready.notify_all();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }

    /// Number of pending commands (0, 1 or 2).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().slots.iter().filter(|(_, s)| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("pending", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn entry(player: PlayerId, command: &str) -> CommandEntry {
        CommandEntry::new(player, command, |_| Ok(()))
    }

    #[test]
    fn test_same_player_replaces() {
        let queue = CommandQueue::new();
        queue.push(entry(PlayerId::FIRST, "A1"));
        queue.push(entry(PlayerId::FIRST, "A2"));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_pop().map(|e| e.command), Some("A2".to_string()));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_oldest_submission_first() {
        let queue = CommandQueue::new();
        let now = Instant::now();
        queue.push(entry(PlayerId::FIRST, "late").with_submitted_at(now));
        queue.push(entry(PlayerId::SECOND, "early").with_submitted_at(now - Duration::from_millis(5)));

        assert_eq!(queue.try_pop().map(|e| e.command), Some("early".to_string()));
        assert_eq!(queue.try_pop().map(|e| e.command), Some("late".to_string()));
    }

    #[test]
    fn test_equal_timestamps_follow_seat_order() {
        let queue = CommandQueue::new();
        let now = Instant::now();
        queue.push(entry(PlayerId::SECOND, "b").with_submitted_at(now));
        queue.push(entry(PlayerId::FIRST, "a").with_submitted_at(now));

        assert_eq!(queue.try_pop().map(|e| e.player), Some(PlayerId::FIRST));
    }

    #[test]
    fn test_push_wakes_waiting_pop() {
        let queue = Arc::new(CommandQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_blocking().map(|e| e.command))
        };

        thread::sleep(Duration::from_millis(20));
        queue.push(entry(PlayerId::SECOND, "wake"));
        assert_eq!(consumer.join().unwrap(), Some("wake".to_string()));
    }

    #[test]
    fn test_close_releases_waiter_and_rejects_pushes() {
        let queue = Arc::new(CommandQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_blocking().is_none())
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(consumer.join().unwrap());
        assert!(!queue.push(entry(PlayerId::FIRST, "late")));
    }
}
