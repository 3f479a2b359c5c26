//! Skirmish content: setup builder and actions.

use std::sync::Arc;

use crate::core::{BagExt, DuelConfig, DuelError, DuelResult, EntityId, PlayerId, PlayerMap, PropertyBag, Value};
use crate::duel::{ActionTable, DuelHooks, DuelState};
use crate::registry::{CardLocation, CardPlacement, EntityKind, EntitySpec};
use crate::triggers::{Ability, AbilityBook};

/// Trigger names content can react to.
pub mod trigger {
    /// Broadcast after a card moves from hand to board: `[Entity(card), Player(owner)]`.
    pub const CARD_PLAYED: &str = "CardPlayed";
    /// Fired on the played card only, before [`CARD_PLAYED`].
    pub const PLAYED: &str = "Played";
    /// Broadcast when a player ends their turn: `[Player(owner)]`.
    pub const READY_TO_ATTACK: &str = "ReadyToAttack";
    /// Overwrite trigger over `{ player, amount }` before resources are granted.
    pub const GAINING_RESOURCE: &str = "GainingResource";
    /// Broadcast after resources were granted: `[Player(owner), Int(amount)]`.
    pub const GAINED_RESOURCE: &str = "GainedResource";
    /// Pipeline over `{ attacker, target, damage }` before a charge resolves.
    pub const BEFORE_CHARGE: &str = "BeforeCharge";
}

/// Command ids accepted by the action table.
pub mod command {
    pub const END_TURN: &str = "EndTurn";
    pub const PLAY_CARD: &str = "PlayCard";
    pub const GAIN_RESOURCE: &str = "GainResource";
    pub const CHARGE: &str = "Charge";
    pub const CONCEDE: &str = "Concede";
}

/// A built skirmish: duel state, action table and handles to the entities
/// the builder created.
pub struct Skirmish {
    pub state: DuelState,
    pub actions: ActionTable,
    pub heroes: PlayerMap<EntityId>,
    /// Each player's "Mana" resource entity.
    pub mana: PlayerMap<EntityId>,
    /// Cards in the order they were added to the builder.
    pub cards: Vec<EntityId>,
}

/// Builder for a two-player skirmish.
///
/// ```
/// use duel_core::core::{DuelConfig, PlayerId};
/// use duel_core::games::skirmish::SkirmishBuilder;
/// use duel_core::registry::CardPlacement;
///
/// let mut skirmish = SkirmishBuilder::new(DuelConfig::new(5).with_first_player(PlayerId::FIRST))
///     .hero_health(10)
///     .card(PlayerId::FIRST, "Footman", CardPlacement::on_board(1))
///     .build();
///
/// skirmish.state.start();
/// assert_eq!(skirmish.state.turn_owner(), Some(PlayerId::FIRST));
/// assert_eq!(skirmish.cards.len(), 1);
/// ```
pub struct SkirmishBuilder {
    config: DuelConfig,
    hero_health: i64,
    cards: Vec<EntitySpec>,
    book: AbilityBook,
}

impl SkirmishBuilder {
    pub fn new(config: DuelConfig) -> Self {
        Self {
            config,
            hero_health: 20,
            cards: Vec::new(),
            book: AbilityBook::new(),
        }
    }

    #[must_use]
    pub fn hero_health(mut self, health: i64) -> Self {
        self.hero_health = health;
        self
    }

    /// Add a card with default stats (attack 1, health 1, cost 0).
    #[must_use]
    pub fn card(self, owner: PlayerId, name: &str, placement: CardPlacement) -> Self {
        let spec = EntitySpec::new(name, EntityKind::Card(placement))
            .with_property("attack", 1)
            .with_property("health", 1)
            .with_property("cost", 0);
        self.card_spec(owner, spec)
    }

    /// Add a fully specified card.
    #[must_use]
    pub fn card_spec(mut self, owner: PlayerId, spec: EntitySpec) -> Self {
        self.cards.push(spec.owned_by(owner));
        self
    }

    /// Register content abilities cards and heroes can carry.
    #[must_use]
    pub fn ability(mut self, ability: Ability) -> Self {
        self.book.register(ability);
        self
    }

    pub fn build(self) -> Skirmish {
        let hooks = DuelHooks::new().on_start(|state| {
            state.next_turn();
            Ok(())
        });
        let mut state = DuelState::with_default_players(self.config, Arc::new(self.book)).with_hooks(hooks);

        let heroes = PlayerMap::new(|p| p).into_array().map(|p| {
            let spec = EntitySpec::new(format!("Hero {}", p.0), EntityKind::Hero).with_property("health", self.hero_health);
            state.set_hero(p, spec)
        });
        let mana = PlayerMap::new(|p| p).into_array().map(|p| {
            state.register(
                EntitySpec::new("Mana", EntityKind::Resource)
                    .owned_by(p)
                    .with_property("amount", 0),
            )
        });
        let cards = self.cards.into_iter().map(|spec| state.register(spec)).collect();

        Skirmish {
            state,
            actions: actions(),
            heroes: PlayerMap::from_array(heroes),
            mana: PlayerMap::from_array(mana),
            cards,
        }
    }
}

/// The skirmish action table.
pub fn actions() -> ActionTable {
    ActionTable::new()
        .with(command::END_TURN, end_turn)
        .with(command::PLAY_CARD, play_card)
        .with(command::GAIN_RESOURCE, gain_resource)
        .with(command::CHARGE, charge)
        .with(command::CONCEDE, |state, player, _| {
            state.finish(Some(player.opponent()));
            Ok(())
        })
}

fn end_turn(state: &mut DuelState, player: PlayerId, _args: &[Value]) -> DuelResult {
    require_turn(state, player)?;
    let source = state.seat(player).entity;
    state.trigger(trigger::READY_TO_ATTACK, Some(source), &[Value::Player(player)]);
    if !state.is_finished() {
        state.new_turn(player.opponent());
    }
    Ok(())
}

/// `[Entity(card), Int(position)]`
fn play_card(state: &mut DuelState, player: PlayerId, args: &[Value]) -> DuelResult {
    require_turn(state, player)?;
    let card = entity_arg(args, 0)?;
    let position = int_arg(args, 1)?;

    let entity = state.entity(card).ok_or(DuelError::UnresolvedEntity(card))?;
    if entity.owner != Some(player) {
        return Err(DuelError::rejected(format!("{card} is not owned by {player}")));
    }
    if entity.kind.placement().map(|p| p.location) != Some(CardLocation::Hand) {
        return Err(DuelError::rejected(format!("{card} is not in hand")));
    }
    let cost = entity.properties.int_or("cost", 0);
    let position = u32::try_from(position).map_err(|_| DuelError::rejected("board position must be positive"))?;

    state.spend_action_points(player, cost)?;
    if let Some(entity) = state.entity_mut(card) {
        entity.set_placement(CardPlacement::on_board(position));
    }

    state.explicit_trigger(trigger::PLAYED, card, &[Value::Player(player)]);
    state.trigger(trigger::CARD_PLAYED, Some(card), &[Value::Entity(card), Value::Player(player)]);
    Ok(())
}

/// `[Int(amount)]`
fn gain_resource(state: &mut DuelState, player: PlayerId, args: &[Value]) -> DuelResult {
    let requested = int_arg(args, 0)?;
    let mana = state
        .directory()
        .iter()
        .find(|e| e.kind == EntityKind::Resource && e.owner == Some(player))
        .map(|e| e.id)
        .ok_or_else(|| DuelError::rejected(format!("{player} has no resource entity")))?;

    let mut table = PropertyBag::new();
    table.put("player", player);
    table.put("amount", requested);
    state.overwrite_trigger(trigger::GAINING_RESOURCE, Some(mana), &mut table);

    let amount = table.int_or("amount", requested).max(0);
    let current = state.property(mana, "amount").and_then(Value::as_int).unwrap_or(0);
    state.set_property(mana, "amount", current + amount);
    state.trigger(trigger::GAINED_RESOURCE, Some(mana), &[Value::Player(player), Value::Int(amount)]);
    Ok(())
}

/// `[Entity(attacker), Entity(target)]`
fn charge(state: &mut DuelState, player: PlayerId, args: &[Value]) -> DuelResult {
    require_turn(state, player)?;
    let attacker = entity_arg(args, 0)?;
    let target = entity_arg(args, 1)?;

    let entity = state.entity(attacker).ok_or(DuelError::UnresolvedEntity(attacker))?;
    if entity.owner != Some(player) || !entity.kind.placement().is_some_and(|p| p.is_alive_on_board()) {
        return Err(DuelError::rejected(format!("{attacker} cannot charge")));
    }
    let attack = entity.properties.int_or("attack", 0);
    state.spend_action_points(player, 1)?;

    let mut payload = PropertyBag::new();
    payload.put("attacker", attacker);
    payload.put("target", target);
    payload.put("damage", attack);
    let resolved = state.trigger_pipeline(trigger::BEFORE_CHARGE, Some(attacker), payload);

    let target = resolved.get("target").and_then(Value::as_entity).unwrap_or(target);
    let damage = resolved.int_or("damage", attack).max(0);
    deal_damage(state, player, target, damage)
}

fn deal_damage(state: &mut DuelState, attacker_owner: PlayerId, target: EntityId, damage: i64) -> DuelResult {
    let health = state
        .property(target, "health")
        .and_then(Value::as_int)
        .ok_or_else(|| DuelError::rejected(format!("{target} cannot take damage")))?;
    let remaining = health - damage;
    state.set_property(target, "health", remaining);
    if remaining > 0 {
        return Ok(());
    }

    if state.player_of(target).is_some() {
        state.finish(Some(attacker_owner));
    } else if let Some(entity) = state.entity_mut(target) {
        entity.set_placement(CardPlacement::in_grave());
    }
    Ok(())
}

fn require_turn(state: &DuelState, player: PlayerId) -> DuelResult {
    if state.turn_owner() == Some(player) {
        Ok(())
    } else {
        Err(DuelError::rejected(format!("it is not {player}'s turn")))
    }
}

fn entity_arg(args: &[Value], index: usize) -> DuelResult<EntityId> {
    args.get(index)
        .and_then(Value::as_entity)
        .ok_or_else(|| DuelError::rejected(format!("argument {index} must be an entity")))
}

fn int_arg(args: &[Value], index: usize) -> DuelResult<i64> {
    args.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| DuelError::rejected(format!("argument {index} must be an integer")))
}
