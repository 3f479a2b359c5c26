//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use duel_core::core::{DuelConfig, EntityId, PlayerId};
use duel_core::duel::DuelState;
use duel_core::registry::{CardPlacement, EntityKind, EntitySpec};
use duel_core::triggers::AbilityBook;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

pub fn config() -> DuelConfig {
    DuelConfig::new(42).with_first_player(PlayerId::FIRST).headless()
}

/// A started duel with turn 1 owned by the first player.
pub fn started_duel(book: AbilityBook) -> DuelState {
    started_duel_with(config(), book)
}

pub fn started_duel_with(config: DuelConfig, book: AbilityBook) -> DuelState {
    let mut state = DuelState::with_default_players(config, Arc::new(book));
    state.start();
    state.next_turn();
    state
}

/// Register a living board card carrying `abilities`.
pub fn board_card(state: &mut DuelState, owner: PlayerId, position: u32, abilities: &[&str]) -> EntityId {
    let spec = abilities.iter().fold(
        EntitySpec::new(format!("Card@{position}"), EntityKind::Card(CardPlacement::on_board(position))).owned_by(owner),
        |spec, ability| spec.with_ability(*ability),
    );
    state.register(spec)
}
