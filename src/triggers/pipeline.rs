//! Pipeline dispatch with per-step validation.
//!
//! A pipeline threads one payload through every reactor in priority order.
//! Each step works on a clone; the clone replaces the running payload only
//! when the step succeeded, actually changed something and the change
//! survived the validation sub-trigger.
//!
//! The validation sub-trigger is itself a pipeline over a table of the
//! form `{ original, proposed, accepted }`. Validators veto a change by
//! setting `accepted` to `false`. Validation payloads are never validated
//! again, so the nesting stops after one level.

use tracing::debug;

use crate::core::{BagExt, EntityId, PropertyBag, Value};
use crate::duel::DuelState;

use super::ability::Reaction;
use super::record::{validation_name, TriggerKind, TriggerRecord};

/// Key holding the payload before the step ran.
pub const VALIDATION_ORIGINAL: &str = "original";
/// Key holding the step's proposed payload.
pub const VALIDATION_PROPOSED: &str = "proposed";
/// Verdict key; defaults to `true`.
pub const VALIDATION_ACCEPTED: &str = "accepted";

impl DuelState {
    /// Fold `payload` through every reactor to `name` and return the result.
    ///
    /// Returns the input unchanged when nothing reacts, the duel has
    /// finished, or the nesting limit is reached.
    pub fn trigger_pipeline(&mut self, name: &str, source: Option<EntityId>, payload: PropertyBag) -> PropertyBag {
        self.run_pipeline(name, TriggerKind::Pipeline, source, payload)
    }

    fn run_pipeline(
        &mut self,
        name: &str,
        kind: TriggerKind,
        source: Option<EntityId>,
        payload: PropertyBag,
    ) -> PropertyBag {
        let mut current = payload;
        self.within_dispatch(name, kind, source, None, |state, record| {
            for reaction in state.collect_reactions(name, None) {
                if !state.may_continue(record, &reaction.key) {
                    if state.is_finished() {
                        break;
                    }
                    continue;
                }
                let Reaction::Pipeline(f) = &reaction.reaction else {
                    debug!(
                        trigger = %name,
                        ability = %reaction.key.ability,
                        registered = reaction.reaction.mode(),
                        "non-pipeline reaction skipped"
                    );
                    continue;
                };

                let mut proposed = current.clone();
                if !state.invoke(record, &reaction.key, &current, |state, ctx| f(state, ctx, &mut proposed)) {
                    continue;
                }
                if proposed == current {
                    continue;
                }
                if kind == TriggerKind::Validation || state.validate_step(record, &current, &proposed) {
                    current = proposed;
                } else {
                    debug!(trigger = %name, reactor = %reaction.key.entity, "pipeline step vetoed");
                }
            }
        });
        current
    }

    /// Run the validation sub-trigger for one step. Accepts by default.
    fn validate_step(&mut self, record: &TriggerRecord, original: &PropertyBag, proposed: &PropertyBag) -> bool {
        let mut table = PropertyBag::new();
        table.put(VALIDATION_ORIGINAL, Value::Table(original.clone()));
        table.put(VALIDATION_PROPOSED, Value::Table(proposed.clone()));
        table.put(VALIDATION_ACCEPTED, true);

        let verdict = self.run_pipeline(
            &validation_name(&record.name),
            TriggerKind::Validation,
            record.source,
            table,
        );
        verdict.bool_or(VALIDATION_ACCEPTED, true)
    }
}
