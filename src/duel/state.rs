//! The duel aggregate root.

use std::fmt;
use std::sync::Arc;

use im::OrdMap;

use crate::core::{DuelConfig, EntityId, GameRng, PlayerId, PlayerMap, Value};
use crate::playback::PlaybackSync;
use crate::priority::CategoryRanks;
use crate::registry::{Entity, EntityDirectory, EntityKind, EntitySpec};
use crate::triggers::{AbilityBook, DispatchState};

use super::lifecycle::DuelHooks;
use super::turn::TurnData;

/// Lifecycle phase. `Finished` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DuelPhase {
    NotStarted,
    Ongoing,
    Finished,
}

impl DuelPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DuelPhase::NotStarted => "not started",
            DuelPhase::Ongoing => "ongoing",
            DuelPhase::Finished => "finished",
        }
    }
}

/// Per-player seat data.
#[derive(Clone, Debug)]
pub struct PlayerSeat {
    pub name: String,
    /// The player's own entity in the directory.
    pub entity: EntityId,
    pub hero: Option<EntityId>,
    /// Action points granted at the start of each of this player's turns.
    pub level: i64,
    /// This player's most recent finished turn.
    pub last_turn: Option<TurnData>,
}

/// Canonical state of one duel.
///
/// Only the duel loop thread mutates it, always under the host's lock.
/// Reactions receive it mutably, so anything they need (directory, turn
/// data, RNG, playback) hangs off this struct.
pub struct DuelState {
    config: DuelConfig,
    directory: EntityDirectory,
    players: PlayerMap<PlayerSeat>,
    ranks: CategoryRanks,
    abilities: Arc<AbilityBook>,
    pub(super) hooks: DuelHooks,
    rng: GameRng,
    pub(super) phase: DuelPhase,
    first_player: PlayerId,
    pub(super) winner: Option<PlayerId>,

    /// Latest turn number; 0 before the first turn.
    pub(super) turn_count: u32,
    /// Every turn keyed by number, current turn included.
    pub(super) turn_history: OrdMap<u32, TurnData>,

    dispatch: DispatchState,
    playback: Option<Arc<PlaybackSync>>,
}

impl DuelState {
    /// Create a duel with one player entity per seat.
    ///
    /// Player entities are registered in seat order, so they take the
    /// first two directory indices.
    pub fn new(config: DuelConfig, abilities: Arc<AbilityBook>, players: PlayerMap<EntitySpec>) -> Self {
        let mut directory = EntityDirectory::new();
        let mut rng = GameRng::new(config.seed);
        let first_player = config.first_player.unwrap_or_else(|| rng.coin_flip());

        let [first, second] = players.into_array();
        let seat = |directory: &mut EntityDirectory, player: PlayerId, spec: EntitySpec| {
            let name = spec.name.clone();
            let spec = EntitySpec {
                kind: EntityKind::Player(player),
                owner: Some(player),
                ..spec
            };
            PlayerSeat {
                name,
                entity: directory.register(spec),
                hero: None,
                level: config.starting_level,
                last_turn: None,
            }
        };
        let first = seat(&mut directory, PlayerId::FIRST, first);
        let second = seat(&mut directory, PlayerId::SECOND, second);

        Self {
            directory,
            players: PlayerMap::from_array([first, second]),
            ranks: CategoryRanks::default(),
            abilities,
            hooks: DuelHooks::default(),
            rng,
            phase: DuelPhase::NotStarted,
            first_player,
            winner: None,
            turn_count: 0,
            turn_history: OrdMap::new(),
            dispatch: DispatchState::default(),
            playback: None,
            config,
        }
    }

    /// Create a duel with plain player entities named "Player 0" and "Player 1".
    pub fn with_default_players(config: DuelConfig, abilities: Arc<AbilityBook>) -> Self {
        let players = PlayerMap::new(|p| EntitySpec::new(p.to_string(), EntityKind::Player(p)));
        Self::new(config, abilities, players)
    }

    #[must_use]
    pub fn with_ranks(mut self, ranks: CategoryRanks) -> Self {
        self.ranks = ranks;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: DuelHooks) -> Self {
        self.hooks = hooks;
        self
    }

    // === Configuration ===

    #[must_use]
    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    #[must_use]
    pub fn ranks(&self) -> &CategoryRanks {
        &self.ranks
    }

    pub fn ranks_mut(&mut self) -> &mut CategoryRanks {
        &mut self.ranks
    }

    #[must_use]
    pub fn abilities(&self) -> &AbilityBook {
        &self.abilities
    }

    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    // === Entities ===

    #[must_use]
    pub fn directory(&self) -> &EntityDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut EntityDirectory {
        &mut self.directory
    }

    /// Register an entity so the dispatcher can find it.
    pub fn register(&mut self, spec: EntitySpec) -> EntityId {
        self.directory.register(spec)
    }

    /// Release an entity that left play.
    pub fn release(&mut self, id: EntityId) -> Option<Entity> {
        self.directory.release(id)
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.directory.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.directory.get_mut(id)
    }

    /// Property of a live entity.
    #[must_use]
    pub fn property(&self, id: EntityId, key: &str) -> Option<&Value> {
        self.directory.get(id)?.properties.get(key)
    }

    /// Set a property on a live entity. Returns `false` if the entity is gone.
    pub fn set_property(&mut self, id: EntityId, key: &str, value: impl Into<Value>) -> bool {
        match self.directory.get_mut(id) {
            Some(entity) => {
                entity.properties.insert(key.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    // === Players ===

    #[must_use]
    pub fn seat(&self, player: PlayerId) -> &PlayerSeat {
        &self.players[player]
    }

    pub fn seat_mut(&mut self, player: PlayerId) -> &mut PlayerSeat {
        &mut self.players[player]
    }

    /// Register `spec` as `player`'s hero.
    pub fn set_hero(&mut self, player: PlayerId, spec: EntitySpec) -> EntityId {
        let hero = self.directory.register(EntitySpec {
            kind: EntityKind::Hero,
            owner: Some(player),
            ..spec
        });
        self.players[player].hero = Some(hero);
        hero
    }

    #[must_use]
    pub fn level(&self, player: PlayerId) -> i64 {
        self.players[player].level
    }

    pub fn set_level(&mut self, player: PlayerId, level: i64) {
        self.players[player].level = level;
    }

    /// Seat that owns `entity`, if it is a player or hero entity.
    #[must_use]
    pub fn player_of(&self, entity: EntityId) -> Option<PlayerId> {
        PlayerId::both().find(|&p| {
            let seat = &self.players[p];
            seat.entity == entity || seat.hero == Some(entity)
        })
    }

    #[must_use]
    pub fn first_player(&self) -> PlayerId {
        self.first_player
    }

    // === Turns and phase ===

    #[must_use]
    pub fn phase(&self) -> DuelPhase {
        self.phase
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.phase != DuelPhase::NotStarted
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == DuelPhase::Finished
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[must_use]
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// The turn in progress, once any turn exists.
    #[must_use]
    pub fn current_turn(&self) -> Option<&TurnData> {
        self.turn_history.get(&self.turn_count)
    }

    #[must_use]
    pub fn turn_owner(&self) -> Option<PlayerId> {
        self.current_turn().map(|t| t.owner)
    }

    #[must_use]
    pub fn turn(&self, number: u32) -> Option<&TurnData> {
        self.turn_history.get(&number)
    }

    #[must_use]
    pub fn turn_history(&self) -> &OrdMap<u32, TurnData> {
        &self.turn_history
    }

    // === Playback ===

    /// Attach the playback channel reactions use for client requests.
    pub fn attach_playback(&mut self, playback: Arc<PlaybackSync>) {
        self.playback = Some(playback);
    }

    #[must_use]
    pub fn playback(&self) -> Option<&Arc<PlaybackSync>> {
        self.playback.as_ref()
    }

    pub(crate) fn dispatch_state(&self) -> &DispatchState {
        &self.dispatch
    }

    pub(crate) fn dispatch_state_mut(&mut self) -> &mut DispatchState {
        &mut self.dispatch
    }
}

impl fmt::Debug for DuelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuelState")
            .field("phase", &self.phase)
            .field("turn_count", &self.turn_count)
            .field("turn_owner", &self.turn_owner())
            .field("entities", &self.directory.len())
            .field("winner", &self.winner)
            .finish()
    }
}
