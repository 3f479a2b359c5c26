//! Outbound transport seam.

use parking_lot::Mutex;

use crate::core::{PlayerId, Value};

/// Who a request is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestTarget {
    Player(PlayerId),
    Both,
}

impl RequestTarget {
    #[must_use]
    pub fn includes(self, player: PlayerId) -> bool {
        match self {
            RequestTarget::Player(p) => p == player,
            RequestTarget::Both => true,
        }
    }
}

/// The single outbound event the core emits: "send request".
///
/// Implementations frame and deliver the request; they must not block on
/// the client's reply. Replies come back through
/// [`PlaybackSync::acknowledge`](super::PlaybackSync::acknowledge).
pub trait Transport: Send + Sync {
    fn send_request(&self, target: RequestTarget, request_id: &str, payload: &Value);
}

/// A request captured by [`RecordingTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct SentRequest {
    pub target: RequestTarget,
    pub request_id: String,
    pub payload: Value,
}

/// In-memory transport that records every request.
///
/// Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentRequest>>,
}

impl RecordingTransport {
    /// Snapshot of everything sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }
}

impl Transport for RecordingTransport {
    fn send_request(&self, target: RequestTarget, request_id: &str, payload: &Value) {
        self.sent.lock().push(SentRequest {
            target,
            request_id: request_id.to_string(),
            payload: payload.clone(),
        });
    }
}
