//! Turn lifecycle integration tests.

mod common;

use std::sync::Arc;

use duel_core::core::{DuelConfig, PlayerId, Value};
use duel_core::duel::{DuelHooks, DuelPhase, DuelState, GAME_ENDED, GAME_STARTED, TURN_STARTED};
use duel_core::triggers::{Ability, AbilityBook};
use parking_lot::Mutex;

use common::{board_card, config, started_duel};

#[test]
fn test_turns_alternate_and_accumulate_history() {
    let mut state = DuelState::with_default_players(config(), Arc::new(AbilityBook::new()));
    assert!(state.start());

    for _ in 0..7 {
        assert!(state.next_turn());
    }

    assert_eq!(state.turn_count(), 7);
    assert_eq!(state.turn_history().len(), 7);
    for (number, turn) in state.turn_history() {
        let expected = if number % 2 == 1 { PlayerId::FIRST } else { PlayerId::SECOND };
        assert_eq!(turn.owner, expected, "turn {number}");
        assert_eq!(turn.previous, number.checked_sub(1).filter(|n| *n > 0));
    }
    assert_eq!(state.seat(PlayerId::FIRST).last_turn.as_ref().map(|t| t.number), Some(5));
    assert_eq!(state.seat(PlayerId::SECOND).last_turn.as_ref().map(|t| t.number), Some(6));
}

#[test]
fn test_action_points_refill_from_level() {
    let mut state = started_duel(AbilityBook::new());
    state.set_level(PlayerId::SECOND, 6);

    let start = state.action_points();
    state.spend_action_points(PlayerId::FIRST, start).unwrap();
    assert_eq!(state.action_points(), 0);
    assert!(state.spend_action_points(PlayerId::FIRST, 1).is_err());

    state.next_turn();
    assert_eq!(state.turn_owner(), Some(PlayerId::SECOND));
    assert_eq!(state.action_points(), 6);

    // The archived turn keeps its spent total.
    assert_eq!(state.turn(1).map(|t| t.action_points), Some(0));
}

#[test]
fn test_opponent_cannot_spend_action_points() {
    let mut state = started_duel(AbilityBook::new());
    let before = state.action_points();
    assert!(state.spend_action_points(PlayerId::SECOND, 1).is_err());
    assert_eq!(state.action_points(), before);
}

#[test]
fn test_lifecycle_broadcasts() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let on_start = Arc::clone(&seen);
    let on_turn = Arc::clone(&seen);
    let herald = Ability::new("Herald")
        .on_broadcast(GAME_STARTED, move |_, _, _| {
            on_start.lock().push(Value::Text(GAME_STARTED.into()));
            Ok(())
        })
        .on_broadcast(TURN_STARTED, move |_, ctx, args| {
            assert!(ctx.trigger.source.is_some());
            on_turn.lock().push(Value::List(args.to_vec()));
            Ok(())
        });

    let mut state = DuelState::with_default_players(config(), Arc::new(AbilityBook::new().with(herald)));
    board_card(&mut state, PlayerId::FIRST, 1, &["Herald"]);
    state.start();
    state.next_turn();
    state.next_turn();

    assert_eq!(
        *seen.lock(),
        vec![
            Value::Text(GAME_STARTED.into()),
            Value::List(vec![Value::Player(PlayerId::FIRST), Value::Int(1)]),
            Value::List(vec![Value::Player(PlayerId::SECOND), Value::Int(2)]),
        ]
    );
}

#[test]
fn test_hooks_run_once_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let start_log = Arc::clone(&log);
    let finish_log = Arc::clone(&log);
    let hooks = DuelHooks::new()
        .on_start(move |state| {
            start_log.lock().push("start");
            state.next_turn();
            Ok(())
        })
        .on_finish(move |_| {
            finish_log.lock().push("finish");
            Ok(())
        });
    let config = DuelConfig::new(3).with_first_player(PlayerId::SECOND).headless();
    let mut state = DuelState::with_default_players(config, Arc::new(AbilityBook::new())).with_hooks(hooks);

    assert!(state.start());
    assert!(!state.start());
    assert_eq!(state.turn_owner(), Some(PlayerId::SECOND));

    assert!(state.finish(None));
    assert!(!state.finish(Some(PlayerId::FIRST)));
    assert_eq!(state.phase(), DuelPhase::Finished);
    assert_eq!(state.winner(), None);
    assert!(!state.next_turn());
    assert_eq!(*log.lock(), vec!["start", "finish"]);
}

#[test]
fn test_game_end_broadcast_precedes_finish_hook() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let on_end = Arc::clone(&log);
    let on_finish = Arc::clone(&log);
    let mourner = Ability::new("Mourner").on_broadcast(GAME_ENDED, move |state, _, args| {
        assert!(!state.is_finished());
        on_end.lock().push(format!("ended {args:?}"));
        Ok(())
    });
    let hooks = DuelHooks::new().on_finish(move |_| {
        on_finish.lock().push("hook".to_string());
        Ok(())
    });

    let mut state =
        DuelState::with_default_players(config(), Arc::new(AbilityBook::new().with(mourner))).with_hooks(hooks);
    board_card(&mut state, PlayerId::SECOND, 1, &["Mourner"]);
    state.start();
    state.next_turn();

    assert!(state.finish(Some(PlayerId::SECOND)));
    assert!(!state.finish(None));

    let expected = format!("ended {:?}", [Value::Player(PlayerId::SECOND)]);
    assert_eq!(*log.lock(), vec![expected, "hook".to_string()]);
    assert_eq!(state.winner(), Some(PlayerId::SECOND));
}

#[test]
fn test_drawn_game_end_has_no_winner_argument() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mourner = Ability::new("Mourner").on_broadcast(GAME_ENDED, move |_, _, args| {
        sink.lock().push(args.len());
        Ok(())
    });
    let mut state = started_duel(AbilityBook::new().with(mourner));
    board_card(&mut state, PlayerId::FIRST, 1, &["Mourner"]);

    assert!(state.finish(None));
    assert_eq!(*seen.lock(), vec![0]);
    assert_eq!(state.trigger(GAME_ENDED, None, &[]), 0);
}
