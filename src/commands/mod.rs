//! Command queue and the single-threaded duel loop.
//!
//! ## Execution Model
//!
//! - Connection threads call [`DuelHost::enqueue`]; each player keeps at most
//!   one pending command, newer submissions replace older ones
//! - One loop thread takes the oldest command, drops it if it outlived
//!   `stale_command_after`, otherwise runs it under the duel lock
//! - The [`TurnTimer`] is paused while a command runs; when the turn budget
//!   runs out, `timeout_command` runs for the turn owner under the same lock
//! - The loop stops once the duel is finished, then the cleanup hook runs once

mod host;
mod queue;
mod timer;

pub use host::{CleanupFn, DuelHost, HostBuilder};
pub use queue::{CommandEntry, CommandQueue, DeferredAction};
pub use timer::{TimerHandle, TurnTimer};
