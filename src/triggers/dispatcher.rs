//! Trigger dispatch: broadcast, incite, explicit and overwrite modes.
//!
//! Every mode follows the same shape:
//!
//! 1. Refuse to start once the duel is finished or the nesting limit is hit
//! 2. Resolve the current reactors and order them once, up front
//! 3. Invoke each reaction, re-checking the finished flag in between
//! 4. Contain every failure at the reaction boundary
//!
//! A dispatch frame is popped even when something inside it unwinds, so a
//! panic never leaks chain depth into later dispatches.
//!
//! The pipeline mode lives in `pipeline.rs` and reuses steps 1, 2 and 4.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::core::{DuelError, DuelResult, EntityId, PropertyBag, Value};
use crate::duel::DuelState;
use crate::priority::{order_by_priority, CompareFn, PriorityContext, PriorityKey};

use super::ability::{Reaction, ReactionCtx};
use super::record::{TriggerKind, TriggerRecord};

/// Per-duel dispatcher bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct DispatchState {
    /// Dispatches currently running, outermost first.
    active: Vec<Arc<TriggerRecord>>,
}

/// Optional inputs for a broadcast.
#[derive(Clone, Default)]
pub struct TriggerOptions {
    /// Entity whose action caused the trigger.
    pub source: Option<EntityId>,
    /// Explicit originator passed to every reaction.
    pub originator: Option<EntityId>,
    /// Comparer consulted after ability-declared ones.
    pub comparer: Option<CompareFn>,
}

impl TriggerOptions {
    #[must_use]
    pub fn from_source(source: Option<EntityId>) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn incited_by(originator: EntityId) -> Self {
        Self {
            source: Some(originator),
            originator: Some(originator),
            comparer: None,
        }
    }

    #[must_use]
    pub fn with_comparer(mut self, comparer: CompareFn) -> Self {
        self.comparer = Some(comparer);
        self
    }
}

/// An (entity, ability) pairing produced for one dispatch.
#[derive(Clone, Debug)]
pub struct TriggerReaction {
    pub key: PriorityKey,
    pub reaction: Reaction,
}

impl DuelState {
    /// Broadcast `name` to every current reactor in priority order.
    ///
    /// Returns how many reactions ran successfully.
    pub fn trigger(&mut self, name: &str, source: Option<EntityId>, args: &[Value]) -> usize {
        self.trigger_with(name, &TriggerOptions::from_source(source), args)
    }

    /// Broadcast `name` with an explicit originator.
    pub fn incite_trigger(&mut self, name: &str, originator: EntityId, args: &[Value]) -> usize {
        self.trigger_with(name, &TriggerOptions::incited_by(originator), args)
    }

    /// Broadcast with full options.
    pub fn trigger_with(&mut self, name: &str, options: &TriggerOptions, args: &[Value]) -> usize {
        let kind = if options.originator.is_some() {
            TriggerKind::Incite
        } else {
            TriggerKind::Broadcast
        };
        self.within_dispatch(name, kind, options.source, options.originator, |state, record| {
            let reactions = state.collect_reactions(name, options.comparer.as_ref());
            state.run_broadcast(record, reactions, args)
        })
        .unwrap_or(0)
    }

    /// Fire `name` on a single entity only, in ability attachment order.
    pub fn explicit_trigger(&mut self, name: &str, target: EntityId, args: &[Value]) -> usize {
        if !self.directory().contains(target) {
            debug!(trigger = %name, error = %DuelError::UnresolvedEntity(target), "explicit trigger skipped");
            return 0;
        }
        self.within_dispatch(name, TriggerKind::Explicit, Some(target), None, |state, record| {
            let reactions = state.entity_reactions(target, name);
            state.run_broadcast(record, reactions, args)
        })
        .unwrap_or(0)
    }

    /// Let listeners adjust a shared table, lowest priority first, so the
    /// highest-priority listener's write lands last.
    ///
    /// A listener that fails has its writes rolled back.
    pub fn overwrite_trigger(&mut self, name: &str, source: Option<EntityId>, table: &mut PropertyBag) -> usize {
        self.within_dispatch(name, TriggerKind::Overwrite, source, None, |state, record| {
            let mut reactions = state.collect_reactions(name, None);
            reactions.reverse();

            let mut fired = 0;
            for reaction in reactions {
                if !state.may_continue(record, &reaction.key) {
                    if state.is_finished() {
                        break;
                    }
                    continue;
                }
                let Reaction::Overwrite(f) = &reaction.reaction else {
                    mode_mismatch(record, &reaction);
                    continue;
                };
                let snapshot = table.clone();
                if state.invoke(record, &reaction.key, &snapshot, |state, ctx| f(state, ctx, &mut *table)) {
                    fired += 1;
                } else {
                    *table = snapshot;
                }
            }
            fired
        })
        .unwrap_or(0)
    }

    /// Current reactors to `name`, in the order they would fire.
    ///
    /// Pure: calling it twice on an unchanged duel returns the same order.
    #[must_use]
    pub fn reactors_for(&self, name: &str, comparer: Option<&CompareFn>) -> Vec<PriorityKey> {
        self.collect_reactions(name, comparer)
            .into_iter()
            .map(|r| r.key)
            .collect()
    }

    /// The innermost dispatch currently running.
    #[must_use]
    pub fn active_trigger(&self) -> Option<&TriggerRecord> {
        self.dispatch_state().active.last().map(Arc::as_ref)
    }

    /// Number of nested dispatches currently running.
    #[must_use]
    pub fn trigger_depth(&self) -> u32 {
        self.dispatch_state().active.len() as u32
    }

    /// Run `body` inside a new dispatch frame.
    ///
    /// Returns `None` without calling `body` when the duel has finished or
    /// the nesting limit is reached. The frame is popped even if `body`
    /// unwinds; the panic then continues to the caller.
    pub(crate) fn within_dispatch<R>(
        &mut self,
        name: &str,
        kind: TriggerKind,
        source: Option<EntityId>,
        originator: Option<EntityId>,
        body: impl FnOnce(&mut DuelState, &TriggerRecord) -> R,
    ) -> Option<R> {
        let depth_before = self.dispatch_state().active.len();
        let record = self.begin_dispatch(name, kind, source, originator)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(self, &*record)));
        self.dispatch_state_mut().active.truncate(depth_before);
        match outcome {
            Ok(value) => Some(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Drop dispatch frames left behind by a panic that escaped a dispatch.
    pub(crate) fn clear_dispatch_stack(&mut self) {
        let stale = self.dispatch_state().active.len();
        if stale > 0 {
            warn!(stale, "dispatch stack not empty between commands, cleared");
            self.dispatch_state_mut().active.clear();
        }
    }

    fn begin_dispatch(
        &mut self,
        name: &str,
        kind: TriggerKind,
        source: Option<EntityId>,
        originator: Option<EntityId>,
    ) -> Option<Arc<TriggerRecord>> {
        if self.is_finished() {
            debug!(trigger = %name, "duel finished, trigger ignored");
            return None;
        }

        let max_depth = self.config().max_trigger_depth;
        let depth = self.trigger_depth() + 1;
        if depth > max_depth {
            let err = DuelError::TriggerChainOverflow {
                trigger: name.to_string(),
                max_depth,
            };
            let path = self.active_trigger().map(TriggerRecord::path).unwrap_or_default();
            warn!(trigger = %name, chain = %path, "{}", err);
            return None;
        }

        let record = Arc::new(TriggerRecord {
            name: name.to_string(),
            kind,
            source,
            originator,
            parent: self.dispatch_state().active.last().cloned(),
            depth,
        });
        self.dispatch_state_mut().active.push(Arc::clone(&record));
        Some(record)
    }

    /// Resolve and order every current reaction to `name`.
    pub(crate) fn collect_reactions(&self, name: &str, comparer: Option<&CompareFn>) -> Vec<TriggerReaction> {
        let book = self.abilities();
        let mut reactions = Vec::new();

        for entity in self.directory().iter() {
            for ability_name in &entity.abilities {
                let Some(ability) = book.get(ability_name) else {
                    continue;
                };
                let Some(reaction) = ability.reaction(name) else {
                    continue;
                };
                reactions.push(TriggerReaction {
                    key: PriorityKey::capture(entity, ability_name, ability.comparer().cloned()),
                    reaction: reaction.clone(),
                });
            }
        }

        let ctx = PriorityContext::new(name, self.turn_owner(), self.ranks()).with_custom(comparer);
        let sorted = panic::catch_unwind(AssertUnwindSafe(|| {
            order_by_priority(&mut reactions, |r| &r.key, &ctx);
        }));
        if let Err(payload) = sorted {
            // The slice is still a permutation; re-sort on built-in tiers only.
            error!(
                trigger = %name,
                reason = %panic_message(payload.as_ref()),
                "reactor comparer failed, falling back to structural order"
            );
            for reaction in &mut reactions {
                reaction.key.comparer = None;
            }
            order_by_priority(&mut reactions, |r| &r.key, &ctx.with_custom(None));
        }
        reactions
    }

    fn entity_reactions(&self, target: EntityId, name: &str) -> Vec<TriggerReaction> {
        let Some(entity) = self.directory().get(target) else {
            return Vec::new();
        };
        let book = self.abilities();
        entity
            .abilities
            .iter()
            .filter_map(|ability_name| {
                let ability = book.get(ability_name)?;
                let reaction = ability.reaction(name)?;
                Some(TriggerReaction {
                    key: PriorityKey::capture(entity, ability_name, ability.comparer().cloned()),
                    reaction: reaction.clone(),
                })
            })
            .collect()
    }

    fn run_broadcast(&mut self, record: &TriggerRecord, reactions: Vec<TriggerReaction>, args: &[Value]) -> usize {
        let mut fired = 0;
        for reaction in reactions {
            if !self.may_continue(record, &reaction.key) {
                if self.is_finished() {
                    break;
                }
                continue;
            }
            let Reaction::Broadcast(f) = &reaction.reaction else {
                mode_mismatch(record, &reaction);
                continue;
            };
            if self.invoke(record, &reaction.key, &args, |state, ctx| f(state, ctx, args)) {
                fired += 1;
            }
        }
        fired
    }

    /// False once the duel has finished or the reactor left play mid-dispatch.
    pub(crate) fn may_continue(&self, record: &TriggerRecord, key: &PriorityKey) -> bool {
        if self.is_finished() {
            debug!(trigger = %record.name, "duel finished mid-dispatch, remaining reactions skipped");
            return false;
        }
        let live = self
            .directory()
            .get(key.entity)
            .is_some_and(|e| e.has_ability(&key.ability));
        if !live {
            debug!(trigger = %record.name, reactor = %key.entity, "reactor left play before its turn");
        }
        live
    }

    /// Run one reaction, containing errors and panics.
    ///
    /// Returns `true` when the reaction completed successfully.
    pub(crate) fn invoke<F>(
        &mut self,
        record: &TriggerRecord,
        key: &PriorityKey,
        detail: &dyn fmt::Debug,
        call: F,
    ) -> bool
    where
        F: FnOnce(&mut DuelState, &ReactionCtx<'_>) -> DuelResult,
    {
        let ctx = ReactionCtx {
            trigger: record,
            reactor: key.entity,
            ability: &key.ability,
            originator: record.originator,
        };
        let depth_before = self.dispatch_state().active.len();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(self, &ctx)));
        self.dispatch_state_mut().active.truncate(depth_before);

        let reason = match outcome {
            Ok(Ok(())) => return true,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        let err = DuelError::ReactionFailure {
            trigger: record.name.clone(),
            reactor: key.entity,
            ability: key.ability.clone(),
            reason,
        };
        error!(
            chain = %record.path(),
            reactor = %key.entity,
            ability = %key.ability,
            args = ?detail,
            "{}",
            err
        );
        false
    }
}

fn mode_mismatch(record: &TriggerRecord, reaction: &TriggerReaction) {
    warn!(
        trigger = %record.name,
        mode = %record.kind,
        reactor = %reaction.key.entity,
        ability = %reaction.key.ability,
        registered = reaction.reaction.mode(),
        "reaction registered for a different dispatch mode, skipped"
    );
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
