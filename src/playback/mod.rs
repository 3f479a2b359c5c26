//! Blocking playback synchronization.
//!
//! Game actions may need the clients to catch up before the authoritative
//! state moves on (an animation, a reveal). A blocking send delivers a
//! request through the [`Transport`] and suspends the calling thread until
//! the client acknowledges, the player disconnects, or `ack_timeout`
//! elapses. Every wait is fail-open: a silent client slows the duel down,
//! it never stalls it.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use duel_core::core::{DuelConfig, PlayerId, Value};
//! use duel_core::playback::{AckOutcome, PlaybackSync, RecordingTransport};
//!
//! let transport = Arc::new(RecordingTransport::default());
//! let sync = PlaybackSync::new(transport.clone(), &DuelConfig::default().headless());
//!
//! let outcome = sync.send_blocking(PlayerId::FIRST, "RevealCard", &Value::Int(7));
//! assert_eq!(outcome, AckOutcome::Skipped);
//! assert_eq!(transport.sent()[0].request_id, "RevealCard");
//! ```

mod sync;
mod transport;

pub use sync::{AckOutcome, PlaybackSync};
pub use transport::{RecordingTransport, RequestTarget, SentRequest, Transport};
