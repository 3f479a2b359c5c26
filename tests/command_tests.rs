//! Duel loop integration tests: debounce, staleness, failure containment,
//! the turn timer and shutdown.

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use duel_core::commands::DuelHost;
use duel_core::core::{DuelConfig, DuelError, PlayerId, Value};
use duel_core::duel::{ActionTable, DuelState};
use duel_core::triggers::{Ability, AbilityBook};
use parking_lot::Mutex;

use common::{board_card, config, init_tracing, started_duel_with, wait_until};

const WAIT: Duration = Duration::from_secs(5);

/// Shared witnesses the test actions report into.
#[derive(Clone, Default)]
struct Witness {
    entered: Arc<AtomicBool>,
    left: Arc<AtomicBool>,
    values: Arc<Mutex<Vec<i64>>>,
}

impl Witness {
    /// `Block` holds the loop for `hold`; `Record` logs its first argument.
    fn actions(&self, hold: Duration) -> ActionTable {
        let (entered, left, values) = (
            Arc::clone(&self.entered),
            Arc::clone(&self.left),
            Arc::clone(&self.values),
        );
        ActionTable::new()
            .with("Block", move |_, _, _| {
                entered.store(true, Ordering::SeqCst);
                thread::sleep(hold);
                left.store(true, Ordering::SeqCst);
                Ok(())
            })
            .with("Record", move |_, _, args| {
                let value = args.first().and_then(Value::as_int).unwrap_or_default();
                values.lock().push(value);
                Ok(())
            })
            .with("Boom", |_, _, _| panic!("broken command"))
            .with("Fail", |_, _, _| Err(DuelError::rejected("not allowed")))
            .with("Concede", |state, player, _| {
                state.finish(Some(player.opponent()));
                Ok(())
            })
    }

    fn values(&self) -> Vec<i64> {
        self.values.lock().clone()
    }
}

fn duel(config: DuelConfig) -> DuelState {
    started_duel_with(config, AbilityBook::new())
}

#[test]
fn test_newer_command_replaces_pending_one() {
    init_tracing();
    let witness = Witness::default();
    let host = DuelHost::spawn(duel(config()), witness.actions(Duration::from_millis(150))).unwrap();

    assert!(host.enqueue(PlayerId::SECOND, "Block", Vec::new()));
    assert!(wait_until(WAIT, || witness.entered.load(Ordering::SeqCst)));

    assert!(host.enqueue(PlayerId::FIRST, "Record", vec![Value::Int(1)]));
    assert!(host.enqueue(PlayerId::FIRST, "Record", vec![Value::Int(2)]));

    assert!(wait_until(WAIT, || !witness.values().is_empty()));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(witness.values(), vec![2]);
}

#[test]
fn test_stale_command_is_dropped() {
    init_tracing();
    let witness = Witness::default();
    let config = config().with_stale_command_after(Duration::from_millis(20));
    let host = DuelHost::spawn(duel(config), witness.actions(Duration::from_millis(120))).unwrap();

    host.enqueue(PlayerId::SECOND, "Block", Vec::new());
    assert!(wait_until(WAIT, || witness.entered.load(Ordering::SeqCst)));
    host.enqueue(PlayerId::FIRST, "Record", vec![Value::Int(1)]);

    assert!(wait_until(WAIT, || witness.left.load(Ordering::SeqCst)));
    thread::sleep(Duration::from_millis(50));
    host.enqueue(PlayerId::FIRST, "Record", vec![Value::Int(2)]);

    assert!(wait_until(WAIT, || !witness.values().is_empty()));
    assert_eq!(witness.values(), vec![2]);
}

#[test]
fn test_loop_survives_failing_commands() {
    init_tracing();
    let witness = Witness::default();
    let host = DuelHost::spawn(duel(config()), witness.actions(Duration::ZERO)).unwrap();

    host.enqueue(PlayerId::FIRST, "Boom", Vec::new());
    host.enqueue(PlayerId::SECOND, "Fail", Vec::new());
    thread::sleep(Duration::from_millis(50));
    host.enqueue(PlayerId::FIRST, "Record", vec![Value::Int(5)]);

    assert!(wait_until(WAIT, || witness.values() == vec![5]));
    assert!(!host.is_finished());
}

#[test]
fn test_unknown_command_is_rejected() {
    let witness = Witness::default();
    let host = DuelHost::spawn(duel(config()), witness.actions(Duration::ZERO)).unwrap();
    assert!(!host.enqueue(PlayerId::FIRST, "Surrender", Vec::new()));
}

#[test]
fn test_finish_stops_loop_and_cleans_up_once() {
    init_tracing();
    let witness = Witness::default();
    let cleanups = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&cleanups);
    let host = DuelHost::builder(duel(config()), witness.actions(Duration::ZERO))
        .on_cleanup(move |state| {
            assert!(state.is_finished());
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .spawn()
        .unwrap();

    assert!(host.enqueue(PlayerId::SECOND, "Concede", Vec::new()));
    assert!(wait_until(WAIT, || host.is_finished()));
    assert!(!host.enqueue(PlayerId::FIRST, "Record", vec![Value::Int(1)]));
    assert_eq!(host.with_state(DuelState::winner), Some(PlayerId::FIRST));

    host.join();
    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    assert!(witness.values().is_empty());
}

#[test]
fn test_external_finish_stops_loop() {
    let witness = Witness::default();
    let host = DuelHost::spawn(duel(config()), witness.actions(Duration::ZERO)).unwrap();

    host.finish(Some(PlayerId::SECOND));
    assert!(host.is_finished());
    assert!(host.timer().is_none());
    host.join();
}

#[test]
fn test_turn_timeout_runs_timeout_command_for_owner() {
    init_tracing();
    let owners = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&owners);
    let actions = ActionTable::new().with("EndTurn", move |state, player, _| {
        sink.lock().push(player);
        state.next_turn();
        Ok(())
    });
    let config = config().with_turn_timeout(Duration::from_millis(60), "EndTurn");
    let host = DuelHost::spawn(duel(config), actions).unwrap();

    assert!(wait_until(WAIT, || owners.lock().len() >= 2));
    host.finish(None);
    host.join();

    let owners = owners.lock();
    assert_eq!(owners[..2], [PlayerId::FIRST, PlayerId::SECOND]);
}

#[test]
fn test_timer_idles_after_finish() {
    let actions = ActionTable::new().with("Concede", |state, player, _| {
        state.finish(Some(player.opponent()));
        Ok(())
    });
    let config = config().with_turn_timeout(Duration::from_secs(30), "Concede");
    let host = DuelHost::spawn(duel(config), actions).unwrap();

    let timer = host.timer().cloned().unwrap();
    assert!(wait_until(WAIT, || timer.is_running()));

    host.enqueue(PlayerId::FIRST, "Concede", Vec::new());
    assert!(wait_until(WAIT, || host.is_finished()));
    assert!(!timer.is_running());
    assert_eq!(timer.remaining(), None);
}

#[test]
fn test_broken_comparer_does_not_exhaust_trigger_depth() {
    init_tracing();
    let fires = Arc::new(AtomicUsize::new(0));
    let pings = Arc::new(AtomicUsize::new(0));
    let (fire_count, ping_count) = (Arc::clone(&fires), Arc::clone(&pings));
    let unstable = Ability::new("Unstable")
        .on_broadcast("Fire", move |_, _, _| {
            fire_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .with_comparer(|_, _, _| panic!("bad comparer"));
    let watch = Ability::new("Watch").on_broadcast("Ping", move |_, _, _| {
        ping_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let config = config().with_max_trigger_depth(3);
    let mut state = started_duel_with(config, AbilityBook::new().with(unstable).with(watch));
    board_card(&mut state, PlayerId::FIRST, 1, &["Unstable", "Watch"]);
    board_card(&mut state, PlayerId::SECOND, 1, &["Unstable"]);

    let actions = ActionTable::new()
        .with("Fire", |state, _, _| {
            state.trigger("Fire", None, &[]);
            Ok(())
        })
        .with("Ping", |state, _, _| {
            state.trigger("Ping", None, &[]);
            Ok(())
        });
    let host = DuelHost::spawn(state, actions).unwrap();

    for round in 1..=4 {
        assert!(host.enqueue(PlayerId::FIRST, "Fire", Vec::new()));
        assert!(wait_until(WAIT, || fires.load(Ordering::SeqCst) == 2 * round));
    }
    assert_eq!(host.with_state(DuelState::trigger_depth), 0);

    assert!(host.enqueue(PlayerId::SECOND, "Ping", Vec::new()));
    assert!(wait_until(WAIT, || pings.load(Ordering::SeqCst) == 1));
    assert!(!host.is_finished());
}
