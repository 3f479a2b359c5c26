//! The priority comparer chain.
//!
//! `Ordering::Less` means "reacts first". Tiers are evaluated top to
//! bottom and the first non-equal result decides:
//!
//! 1. An explicit comparer declared by either reactor's ability
//! 2. A comparer supplied by the trigger invocation
//! 3. Entity-category rank
//! 4. Turn-owner precedence
//! 5. Category tie-break (card placement)
//! 6. Entity index, then ability name
//!
//! The last tier only returns `Equal` for the very same (entity, ability)
//! pair, so any set of distinct reactions sorts into a strict order.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::core::{EntityId, PlayerId};
use crate::registry::{CardPlacement, Entity, EntityCategory};

use super::ranks::CategoryRanks;

/// Comparer supplied by an ability or a trigger invocation.
///
/// Returning `Equal` defers to the next tier.
pub type CompareFn =
    Arc<dyn Fn(&PriorityKey, &PriorityKey, &PriorityContext<'_>) -> Ordering + Send + Sync>;

/// Wrap a closure as a [`CompareFn`].
pub fn comparer<F>(f: F) -> CompareFn
where
    F: Fn(&PriorityKey, &PriorityKey, &PriorityContext<'_>) -> Ordering + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Snapshot of everything the chain looks at for one reaction.
///
/// Keys are captured before any reaction runs, so mutations made by early
/// reactions cannot reorder later ones.
#[derive(Clone)]
pub struct PriorityKey {
    pub entity: EntityId,
    pub ability: String,
    pub category: EntityCategory,
    pub owner: Option<PlayerId>,
    pub placement: Option<CardPlacement>,
    /// Comparer declared by the reacting ability.
    pub comparer: Option<CompareFn>,
}

impl PriorityKey {
    /// Capture the key for one of `entity`'s abilities.
    pub fn capture(entity: &Entity, ability: &str, comparer: Option<CompareFn>) -> Self {
        Self {
            entity: entity.id,
            ability: ability.to_string(),
            category: entity.category(),
            owner: entity.owner,
            placement: entity.kind.placement(),
            comparer,
        }
    }
}

impl fmt::Debug for PriorityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityKey")
            .field("entity", &self.entity)
            .field("ability", &self.ability)
            .field("category", &self.category)
            .field("owner", &self.owner)
            .field("placement", &self.placement)
            .field("comparer", &self.comparer.is_some())
            .finish()
    }
}

/// Per-dispatch context handed to every tier.
#[derive(Clone, Copy)]
pub struct PriorityContext<'a> {
    /// Name of the trigger being ordered.
    pub trigger: &'a str,
    /// Owner of the current turn, if any turn has started.
    pub turn_owner: Option<PlayerId>,
    pub ranks: &'a CategoryRanks,
    /// Comparer supplied by the trigger invocation.
    pub custom: Option<&'a CompareFn>,
}

impl<'a> PriorityContext<'a> {
    pub fn new(trigger: &'a str, turn_owner: Option<PlayerId>, ranks: &'a CategoryRanks) -> Self {
        Self {
            trigger,
            turn_owner,
            ranks,
            custom: None,
        }
    }

    #[must_use]
    pub fn with_custom(mut self, custom: Option<&'a CompareFn>) -> Self {
        self.custom = custom;
        self
    }

    fn is_turn_owner(&self, owner: Option<PlayerId>) -> bool {
        owner.is_some() && owner == self.turn_owner
    }
}

/// Compare two reactions through the full chain.
pub fn compare(a: &PriorityKey, b: &PriorityKey, ctx: &PriorityContext<'_>) -> Ordering {
    declared(a, b, ctx)
        .then_with(|| ctx.custom.map_or(Ordering::Equal, |f| f(a, b, ctx)))
        .then_with(|| ctx.ranks.rank(b.category).cmp(&ctx.ranks.rank(a.category)))
        .then_with(|| turn_owner_first(a.owner, b.owner, ctx))
        .then_with(|| category_tie_break(a, b, ctx))
        .then_with(|| a.entity.cmp(&b.entity))
        .then_with(|| a.ability.cmp(&b.ability))
}

/// Sort items into firing order.
pub fn order_by_priority<T>(
    items: &mut [T],
    key: impl Fn(&T) -> &PriorityKey,
    ctx: &PriorityContext<'_>,
) {
    items.sort_by(|a, b| compare(key(a), key(b), ctx));
}

fn declared(a: &PriorityKey, b: &PriorityKey, ctx: &PriorityContext<'_>) -> Ordering {
    if a.entity == b.entity {
        return Ordering::Equal;
    }
    if let Some(f) = &a.comparer {
        let ord = f(a, b, ctx);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    match &b.comparer {
        Some(f) => f(b, a, ctx).reverse(),
        None => Ordering::Equal,
    }
}

fn turn_owner_first(a: Option<PlayerId>, b: Option<PlayerId>, ctx: &PriorityContext<'_>) -> Ordering {
    ctx.is_turn_owner(b).cmp(&ctx.is_turn_owner(a))
}

fn category_tie_break(a: &PriorityKey, b: &PriorityKey, ctx: &PriorityContext<'_>) -> Ordering {
    match (a.placement, b.placement) {
        (Some(pa), Some(pb)) => card_tie_break(pa, a.owner, pb, b.owner, ctx),
        _ => Ordering::Equal,
    }
}

fn card_tie_break(
    a: CardPlacement,
    a_owner: Option<PlayerId>,
    b: CardPlacement,
    b_owner: Option<PlayerId>,
    ctx: &PriorityContext<'_>,
) -> Ordering {
    b.is_alive_on_board()
        .cmp(&a.is_alive_on_board())
        .then_with(|| turn_owner_first(a_owner, b_owner, ctx))
        .then_with(|| match (a.board_position(), b.board_position()) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.location.off_board_rank().cmp(&b.location.off_board_rank()))
}
