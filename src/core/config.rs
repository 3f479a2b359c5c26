//! Duel configuration.
//!
//! Hosts provide a `DuelConfig` when a duel is created. Everything that
//! tunes the engine's behaviour (recursion guard, staleness window,
//! playback timing, turn budget) lives here so content never hardcodes it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Default cap on nested trigger dispatch.
pub const DEFAULT_MAX_TRIGGER_DEPTH: u32 = 22;

/// Default age after which a queued command is discarded.
pub const DEFAULT_STALE_COMMAND_AFTER: Duration = Duration::from_secs(1);

/// Default wait for a client acknowledgement.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Complete duel configuration.
///
/// ```
/// use std::time::Duration;
/// use duel_core::core::{DuelConfig, PlayerId};
///
/// let config = DuelConfig::new(7)
///     .with_first_player(PlayerId::FIRST)
///     .with_turn_timeout(Duration::from_secs(90), "EndTurn")
///     .headless();
///
/// assert_eq!(config.max_trigger_depth, 22);
/// assert!(config.playback_disabled);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Seed for the duel RNG.
    pub seed: u64,

    /// Maximum nested trigger depth before dispatch becomes a no-op.
    pub max_trigger_depth: u32,

    /// Commands older than this when the loop reaches them are dropped.
    pub stale_command_after: Duration,

    /// Turn budget. `None` disables the turn timer.
    pub turn_timeout: Option<Duration>,

    /// Command executed for the turn owner when the turn budget elapses.
    pub timeout_command: Option<String>,

    /// How long a blocking send waits for acknowledgement.
    pub ack_timeout: Duration,

    /// Skip every playback pause (headless or automated runs).
    pub playback_disabled: bool,

    /// Playback speed multiplier; 2.0 halves every pause.
    pub playback_speed: f64,

    /// Level each player starts with; a new turn refills action points to it.
    pub starting_level: i64,

    /// Who takes the first turn. `None` lets the duel RNG decide.
    pub first_player: Option<PlayerId>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_trigger_depth: DEFAULT_MAX_TRIGGER_DEPTH,
            stale_command_after: DEFAULT_STALE_COMMAND_AFTER,
            turn_timeout: None,
            timeout_command: None,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            playback_disabled: false,
            playback_speed: 1.0,
            starting_level: 1,
            first_player: None,
        }
    }
}

impl DuelConfig {
    /// Create a configuration with defaults and the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_trigger_depth(mut self, depth: u32) -> Self {
        self.max_trigger_depth = depth;
        self
    }

    #[must_use]
    pub fn with_stale_command_after(mut self, age: Duration) -> Self {
        self.stale_command_after = age;
        self
    }

    /// Enable the turn timer.
    #[must_use]
    pub fn with_turn_timeout(mut self, budget: Duration, command: impl Into<String>) -> Self {
        self.turn_timeout = Some(budget);
        self.timeout_command = Some(command.into());
        self
    }

    #[must_use]
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_playback_speed(mut self, speed: f64) -> Self {
        self.playback_speed = speed;
        self
    }

    #[must_use]
    pub fn with_starting_level(mut self, level: i64) -> Self {
        self.starting_level = level;
        self
    }

    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = Some(player);
        self
    }

    /// Disable playback pauses.
    #[must_use]
    pub fn headless(mut self) -> Self {
        self.playback_disabled = true;
        self
    }

    /// Scale a presentation delay by the playback speed.
    ///
    /// Returns zero when playback is disabled or the speed is not a
    /// positive finite number. Never longer than `ack_timeout`.
    #[must_use]
    pub fn scaled_pause(&self, base: Duration) -> Duration {
        if self.playback_disabled || !self.playback_speed.is_finite() || self.playback_speed <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(base.as_secs_f64() / self.playback_speed)
            .unwrap_or(Duration::MAX)
            .min(self.ack_timeout)
    }
}
