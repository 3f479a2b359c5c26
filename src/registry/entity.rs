//! Reactive entities and their category data.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, PlayerId, PropertyBag, Value};

/// Structural category used by the priority chain's rank tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// System-level entities (rule keepers, the duel itself).
    Global,
    /// Persistent effects.
    Effect,
    /// Resource types (mana, energy...).
    Resource,
    Player,
    Hero,
    /// Card instances.
    Card,
    /// Package-defined category; ranked through `CategoryRanks`.
    Custom(u16),
}

/// Where a card-like entity currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardLocation {
    /// On the board at a relative position (lower = further left).
    Board { position: u32 },
    Hand,
    Grave,
    /// Deck, exile, or anywhere else.
    Elsewhere,
}

impl CardLocation {
    /// Location precedence for off-board cards: hand, then grave, then
    /// anywhere else.
    #[must_use]
    pub(crate) const fn off_board_rank(self) -> u8 {
        match self {
            CardLocation::Hand => 0,
            CardLocation::Grave => 1,
            CardLocation::Board { .. } | CardLocation::Elsewhere => 2,
        }
    }
}

/// Placement data for card-like entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardPlacement {
    pub location: CardLocation,
    pub alive: bool,
}

impl CardPlacement {
    /// A living card on the board.
    #[must_use]
    pub const fn on_board(position: u32) -> Self {
        Self {
            location: CardLocation::Board { position },
            alive: true,
        }
    }

    #[must_use]
    pub const fn in_hand() -> Self {
        Self {
            location: CardLocation::Hand,
            alive: false,
        }
    }

    #[must_use]
    pub const fn in_grave() -> Self {
        Self {
            location: CardLocation::Grave,
            alive: false,
        }
    }

    /// True for living cards on the board.
    #[must_use]
    pub const fn is_alive_on_board(&self) -> bool {
        self.alive && matches!(self.location, CardLocation::Board { .. })
    }

    /// Board position, if on the board.
    #[must_use]
    pub const fn board_position(&self) -> Option<u32> {
        match self.location {
            CardLocation::Board { position } => Some(position),
            _ => None,
        }
    }
}

/// What kind of game object an entity is, with the data the priority chain
/// needs for that kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Global,
    Effect,
    Resource,
    Player(PlayerId),
    Hero,
    Card(CardPlacement),
    Custom(u16),
}

impl EntityKind {
    #[must_use]
    pub fn category(&self) -> EntityCategory {
        match self {
            EntityKind::Global => EntityCategory::Global,
            EntityKind::Effect => EntityCategory::Effect,
            EntityKind::Resource => EntityCategory::Resource,
            EntityKind::Player(_) => EntityCategory::Player,
            EntityKind::Hero => EntityCategory::Hero,
            EntityKind::Card(_) => EntityCategory::Card,
            EntityKind::Custom(tag) => EntityCategory::Custom(*tag),
        }
    }

    /// Placement data for card-like entities.
    #[must_use]
    pub fn placement(&self) -> Option<CardPlacement> {
        match self {
            EntityKind::Card(placement) => Some(*placement),
            _ => None,
        }
    }
}

/// Description of an entity before it is registered.
///
/// ```
/// use duel_core::core::PlayerId;
/// use duel_core::registry::{CardPlacement, EntityKind, EntitySpec};
///
/// let spec = EntitySpec::new("Footman", EntityKind::Card(CardPlacement::on_board(1)))
///     .owned_by(PlayerId::FIRST)
///     .with_ability("Guard")
///     .with_property("attack", 2)
///     .with_item_path("core/cards/footman");
///
/// assert_eq!(spec.abilities.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    pub kind: EntityKind,
    pub owner: Option<PlayerId>,
    pub abilities: SmallVec<[String; 4]>,
    pub properties: PropertyBag,
    pub item_path: Option<String>,
}

impl EntitySpec {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        let owner = match kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        };
        Self {
            name: name.into(),
            kind,
            owner,
            abilities: SmallVec::new(),
            properties: PropertyBag::new(),
            item_path: None,
        }
    }

    #[must_use]
    pub fn owned_by(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Attach an ability by its registered name.
    #[must_use]
    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.abilities.push(ability.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Stable key the persistence layer uses instead of a deep copy.
    #[must_use]
    pub fn with_item_path(mut self, path: impl Into<String>) -> Self {
        self.item_path = Some(path.into());
        self
    }
}

/// A registered entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Index issued by the directory.
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    /// Controlling player; `None` for neutral/system entities.
    pub owner: Option<PlayerId>,
    /// Names of the abilities this entity carries, in attachment order.
    pub abilities: SmallVec<[String; 4]>,
    /// Open property bag.
    pub properties: PropertyBag,
    pub item_path: Option<String>,
}

impl Entity {
    pub(crate) fn from_spec(id: EntityId, spec: EntitySpec) -> Self {
        Self {
            id,
            name: spec.name,
            kind: spec.kind,
            owner: spec.owner,
            abilities: spec.abilities,
            properties: spec.properties,
            item_path: spec.item_path,
        }
    }

    #[must_use]
    pub fn category(&self) -> EntityCategory {
        self.kind.category()
    }

    /// Does this entity carry the named ability?
    #[must_use]
    pub fn has_ability(&self, ability: &str) -> bool {
        self.abilities.iter().any(|a| a == ability)
    }

    /// Move a card-like entity. Returns `false` for non-card entities.
    pub fn set_placement(&mut self, placement: CardPlacement) -> bool {
        match &mut self.kind {
            EntityKind::Card(current) => {
                *current = placement;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_kind_sets_owner() {
        let spec = EntitySpec::new("Alice", EntityKind::Player(PlayerId::SECOND));
        assert_eq!(spec.owner, Some(PlayerId::SECOND));
    }

    #[test]
    fn test_placement_queries() {
        let board = CardPlacement::on_board(3);
        assert!(board.is_alive_on_board());
        assert_eq!(board.board_position(), Some(3));

        let dead = CardPlacement {
            location: CardLocation::Board { position: 1 },
            alive: false,
        };
        assert!(!dead.is_alive_on_board());

        assert!(CardLocation::Hand.off_board_rank() < CardLocation::Grave.off_board_rank());
        assert!(CardLocation::Grave.off_board_rank() < CardLocation::Elsewhere.off_board_rank());
    }

    #[test]
    fn test_set_placement_only_for_cards() {
        let mut card = Entity::from_spec(
            EntityId(1),
            EntitySpec::new("Imp", EntityKind::Card(CardPlacement::in_hand())),
        );
        assert!(card.set_placement(CardPlacement::on_board(0)));
        assert_eq!(card.kind.placement(), Some(CardPlacement::on_board(0)));

        let mut hero = Entity::from_spec(EntityId(2), EntitySpec::new("Hero", EntityKind::Hero));
        assert!(!hero.set_placement(CardPlacement::on_board(0)));
    }
}
