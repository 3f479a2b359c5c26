//! Pre-resolved action table.
//!
//! The content loader maps every command id a client may send to a typed
//! closure before the duel starts. The duel loop only ever looks commands
//! up here.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{DuelResult, PlayerId, Value};

use super::DuelState;

/// A command implementation: `(state, issuing player, args)`.
pub type ActionFn = Arc<dyn Fn(&mut DuelState, PlayerId, &[Value]) -> DuelResult + Send + Sync>;

/// Command id → action.
///
/// ```
/// use duel_core::duel::ActionTable;
///
/// let table = ActionTable::new()
///     .with("EndTurn", |state, player, _args| {
///         state.new_turn(player.opponent());
///         Ok(())
///     });
///
/// assert!(table.contains("EndTurn"));
/// assert!(table.get("Surrender").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ActionTable {
    actions: FxHashMap<String, ActionFn>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action, replacing any previous one under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, action: F) -> &mut Self
    where
        F: Fn(&mut DuelState, PlayerId, &[Value]) -> DuelResult + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut DuelState, PlayerId, &[Value]) -> DuelResult + Send + Sync + 'static,
    {
        self.register(name, action);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionFn> {
        self.actions.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.actions.keys().collect();
        names.sort_unstable();
        f.debug_struct("ActionTable").field("actions", &names).finish()
    }
}
