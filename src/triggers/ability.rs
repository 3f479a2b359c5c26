//! Abilities and the registration table that maps names to them.
//!
//! Content registers abilities once, before the duel starts. An ability is
//! a bundle of typed reactions keyed by trigger name; entities refer to
//! abilities by name. Nothing here is resolved dynamically on the dispatch
//! path beyond two hash lookups.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{DuelResult, EntityId, PropertyBag, Value};
use crate::duel::DuelState;
use crate::priority::{comparer, CompareFn, PriorityContext, PriorityKey};

use super::record::TriggerRecord;

/// What a reaction gets to know about its invocation.
#[derive(Clone, Copy, Debug)]
pub struct ReactionCtx<'a> {
    pub trigger: &'a TriggerRecord,
    /// The reacting entity.
    pub reactor: EntityId,
    /// Name of the ability that produced this reaction.
    pub ability: &'a str,
    /// Explicit originator for incited triggers.
    pub originator: Option<EntityId>,
}

/// Reaction to a broadcast, incite or explicit trigger.
pub type BroadcastFn = Arc<dyn Fn(&mut DuelState, &ReactionCtx<'_>, &[Value]) -> DuelResult + Send + Sync>;

/// Reaction that amends a shared table (overwrite) or a provisional clone
/// (pipeline and validation).
pub type AmendFn = Arc<dyn Fn(&mut DuelState, &ReactionCtx<'_>, &mut PropertyBag) -> DuelResult + Send + Sync>;

/// A typed reaction. The variant must match the mode the trigger is
/// dispatched in; mismatches are skipped with a warning.
#[derive(Clone)]
pub enum Reaction {
    Broadcast(BroadcastFn),
    Overwrite(AmendFn),
    Pipeline(AmendFn),
}

impl Reaction {
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Reaction::Broadcast(_) => "broadcast",
            Reaction::Overwrite(_) => "overwrite",
            Reaction::Pipeline(_) => "pipeline",
        }
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reaction::{}", self.mode())
    }
}

/// A content-defined bundle of reactions.
///
/// ```
/// use duel_core::triggers::Ability;
///
/// let guard = Ability::new("Guard")
///     .on_broadcast("ReadyToAttack", |_state, _ctx, _args| Ok(()))
///     .on_overwrite("GainingResource", |_state, _ctx, table| {
///         table.insert("amount".into(), 0.into());
///         Ok(())
///     });
///
/// assert!(guard.reaction("ReadyToAttack").is_some());
/// assert!(guard.reaction("CardPlayed").is_none());
/// ```
#[derive(Clone)]
pub struct Ability {
    pub name: String,
    reactions: FxHashMap<String, Reaction>,
    comparer: Option<CompareFn>,
}

impl Ability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reactions: FxHashMap::default(),
            comparer: None,
        }
    }

    /// React to a broadcast, incite or explicit trigger.
    #[must_use]
    pub fn on_broadcast<F>(mut self, trigger: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut DuelState, &ReactionCtx<'_>, &[Value]) -> DuelResult + Send + Sync + 'static,
    {
        self.reactions.insert(trigger.into(), Reaction::Broadcast(Arc::new(f)));
        self
    }

    /// Adjust a forthcoming outcome through an overwrite trigger.
    #[must_use]
    pub fn on_overwrite<F>(mut self, trigger: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut DuelState, &ReactionCtx<'_>, &mut PropertyBag) -> DuelResult + Send + Sync + 'static,
    {
        self.reactions.insert(trigger.into(), Reaction::Overwrite(Arc::new(f)));
        self
    }

    /// Amend a pipeline payload (or vote in a validation sub-trigger).
    #[must_use]
    pub fn on_pipeline<F>(mut self, trigger: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut DuelState, &ReactionCtx<'_>, &mut PropertyBag) -> DuelResult + Send + Sync + 'static,
    {
        self.reactions.insert(trigger.into(), Reaction::Pipeline(Arc::new(f)));
        self
    }

    /// Declare an explicit priority comparison for entities carrying this
    /// ability. It overrides every structural tier.
    #[must_use]
    pub fn with_comparer<F>(mut self, f: F) -> Self
    where
        F: Fn(&PriorityKey, &PriorityKey, &PriorityContext<'_>) -> Ordering + Send + Sync + 'static,
    {
        self.comparer = Some(comparer(f));
        self
    }

    #[must_use]
    pub fn reaction(&self, trigger: &str) -> Option<&Reaction> {
        self.reactions.get(trigger)
    }

    #[must_use]
    pub fn comparer(&self) -> Option<&CompareFn> {
        self.comparer.as_ref()
    }

    /// Trigger names this ability reacts to.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.reactions.keys().map(String::as_str)
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut triggers: Vec<_> = self.triggers().collect();
        triggers.sort_unstable();
        f.debug_struct("Ability")
            .field("name", &self.name)
            .field("triggers", &triggers)
            .field("comparer", &self.comparer.is_some())
            .finish()
    }
}

/// Registration table: ability name → ability.
///
/// Built once by the content loader and shared read-only with the duel.
#[derive(Clone, Debug, Default)]
pub struct AbilityBook {
    abilities: FxHashMap<String, Ability>,
}

impl AbilityBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ability, replacing any previous one with the same name.
    pub fn register(&mut self, ability: Ability) -> &mut Self {
        self.abilities.insert(ability.name.clone(), ability);
        self
    }

    /// Register an ability (builder pattern).
    #[must_use]
    pub fn with(mut self, ability: Ability) -> Self {
        self.register(ability);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Ability> {
        self.abilities.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}
