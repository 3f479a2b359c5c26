//! Trigger invocation records.
//!
//! A fresh record is created for every dispatch call and dropped when the
//! dispatch returns. Records spawned while another dispatch is running
//! point at it through `parent`, which gives a call tree for logging.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::EntityId;

/// How a trigger is being dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Every reactor, priority order.
    Broadcast,
    /// Broadcast with an explicit originator.
    Incite,
    /// Every reactor, reverse priority order, shared table.
    Overwrite,
    /// Clone / amend / validate fold.
    Pipeline,
    /// Validation sub-trigger spawned by a pipeline step.
    Validation,
    /// A single entity's reactions only.
    Explicit,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TriggerKind::Broadcast => "broadcast",
            TriggerKind::Incite => "incite",
            TriggerKind::Overwrite => "overwrite",
            TriggerKind::Pipeline => "pipeline",
            TriggerKind::Validation => "validation",
            TriggerKind::Explicit => "explicit",
        };
        f.write_str(label)
    }
}

/// One dispatch call.
#[derive(Clone, Debug)]
pub struct TriggerRecord {
    /// Trigger name (the content-facing key).
    pub name: String,
    pub kind: TriggerKind,
    /// Entity whose action caused the trigger, if any.
    pub source: Option<EntityId>,
    /// Explicit originator for incited triggers.
    pub originator: Option<EntityId>,
    /// The dispatch that was running when this one started.
    pub parent: Option<Arc<TriggerRecord>>,
    /// Nesting depth; top-level dispatches are depth 1.
    pub depth: u32,
}

impl TriggerRecord {
    /// Render the call chain root-first, e.g. `EndTurn > ReadyToAttack`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut names = vec![self.name.as_str()];
        let mut cursor = self.parent.as_deref();
        while let Some(record) = cursor {
            names.push(record.name.as_str());
            cursor = record.parent.as_deref();
        }
        names.reverse();
        names.join(" > ")
    }
}

/// Name of the validation sub-trigger spawned by pipeline trigger `name`.
///
/// ```
/// assert_eq!(duel_core::triggers::validation_name("BeforeCharge"), "BeforeCharge.Validation");
/// ```
#[must_use]
pub fn validation_name(name: &str) -> String {
    format!("{name}.Validation")
}
