//! Priority ordering against a live duel.

mod common;

use std::cmp::Ordering;

use duel_core::core::PlayerId;
use duel_core::priority::{compare, PriorityContext, PriorityKey};
use duel_core::registry::{CardPlacement, EntityCategory, EntityKind, EntitySpec};
use duel_core::triggers::{Ability, AbilityBook};
use proptest::prelude::*;

use common::{board_card, started_duel};

fn watch_book() -> AbilityBook {
    AbilityBook::new().with(Ability::new("Watch").on_broadcast("Ping", |_, _, _| Ok(())))
}

fn entity_ids(keys: &[PriorityKey]) -> Vec<u32> {
    keys.iter().map(|k| k.entity.raw()).collect()
}

#[test]
fn test_turn_owner_board_left_to_right_then_opponent() {
    let mut state = started_duel(watch_book());
    let third = board_card(&mut state, PlayerId::SECOND, 3, &["Watch"]);
    let second = board_card(&mut state, PlayerId::FIRST, 2, &["Watch"]);
    let first = board_card(&mut state, PlayerId::FIRST, 1, &["Watch"]);

    let order = state.reactors_for("Ping", None);
    assert_eq!(entity_ids(&order), vec![first.raw(), second.raw(), third.raw()]);
}

#[test]
fn test_categories_outrank_cards() {
    let mut state = started_duel(watch_book());
    let card = board_card(&mut state, PlayerId::FIRST, 1, &["Watch"]);
    let global = state.register(EntitySpec::new("Rules", EntityKind::Global).with_ability("Watch"));
    let hero = state.set_hero(PlayerId::SECOND, EntitySpec::new("Hero", EntityKind::Hero).with_ability("Watch"));

    let order = state.reactors_for("Ping", None);
    assert_eq!(entity_ids(&order), vec![global.raw(), hero.raw(), card.raw()]);
}

#[test]
fn test_living_board_cards_before_hand_and_grave() {
    let mut state = started_duel(watch_book());
    let grave = state.register(
        EntitySpec::new("Fallen", EntityKind::Card(CardPlacement::in_grave()))
            .owned_by(PlayerId::FIRST)
            .with_ability("Watch"),
    );
    let hand = state.register(
        EntitySpec::new("Held", EntityKind::Card(CardPlacement::in_hand()))
            .owned_by(PlayerId::FIRST)
            .with_ability("Watch"),
    );
    let board = board_card(&mut state, PlayerId::FIRST, 4, &["Watch"]);

    let order = state.reactors_for("Ping", None);
    assert_eq!(entity_ids(&order), vec![board.raw(), hand.raw(), grave.raw()]);
}

#[test]
fn test_turn_change_flips_owner_priority() {
    let mut state = started_duel(watch_book());
    let mine = board_card(&mut state, PlayerId::FIRST, 1, &["Watch"]);
    let theirs = board_card(&mut state, PlayerId::SECOND, 1, &["Watch"]);

    assert_eq!(entity_ids(&state.reactors_for("Ping", None)), vec![mine.raw(), theirs.raw()]);
    state.next_turn();
    assert_eq!(entity_ids(&state.reactors_for("Ping", None)), vec![theirs.raw(), mine.raw()]);
}

#[derive(Clone, Debug)]
enum Placement {
    Board(u32),
    Hand,
    Grave,
}

fn arb_entity() -> impl Strategy<Value = (u8, Option<u8>, Placement)> {
    let placement = prop_oneof![
        (0u32..6).prop_map(Placement::Board),
        Just(Placement::Hand),
        Just(Placement::Grave),
    ];
    (0u8..4, prop::option::of(0u8..2), placement)
}

fn spec_for(index: usize, (kind, owner, placement): &(u8, Option<u8>, Placement)) -> EntitySpec {
    let kind = match *kind {
        0 => EntityKind::Global,
        1 => EntityKind::Effect,
        2 => EntityKind::Custom(7),
        _ => EntityKind::Card(match placement {
            Placement::Board(position) => CardPlacement::on_board(*position),
            Placement::Hand => CardPlacement::in_hand(),
            Placement::Grave => CardPlacement::in_grave(),
        }),
    };
    let spec = EntitySpec::new(format!("E{index}"), kind).with_ability("Watch");
    match (*owner).and_then(PlayerId::new) {
        Some(owner) => spec.owned_by(owner),
        None => spec,
    }
}

proptest! {
    #[test]
    fn test_order_is_deterministic_and_strict(entities in prop::collection::vec(arb_entity(), 0..12)) {
        let mut state = started_duel(watch_book());
        for (index, entity) in entities.iter().enumerate() {
            state.register(spec_for(index, entity));
        }

        let first = state.reactors_for("Ping", None);
        let second = state.reactors_for("Ping", None);
        prop_assert_eq!(entity_ids(&first), entity_ids(&second));

        let ctx = PriorityContext::new("Ping", state.turn_owner(), state.ranks());
        for (i, a) in first.iter().enumerate() {
            for b in &first[i + 1..] {
                prop_assert_eq!(compare(a, b, &ctx), Ordering::Less);
                prop_assert_eq!(compare(b, a, &ctx), Ordering::Greater);
            }
        }
    }
}

#[test]
fn test_custom_category_rank_applies() {
    let mut state = started_duel(watch_book());
    state.ranks_mut().set_rank(EntityCategory::Custom(7), 200);
    let global = state.register(EntitySpec::new("Rules", EntityKind::Global).with_ability("Watch"));
    let aura = state.register(EntitySpec::new("Aura", EntityKind::Custom(7)).with_ability("Watch"));

    assert_eq!(entity_ids(&state.reactors_for("Ping", None)), vec![aura.raw(), global.raw()]);
}
