//! Priority ordering for simultaneous reactions.
//!
//! When several entities react to the same trigger, the dispatcher asks
//! this module for a strict total order over them. The order depends only
//! on a snapshot of each reactor ([`PriorityKey`]) and the trigger context
//! ([`PriorityContext`]), so ordering the same set twice gives the same
//! answer.
//!
//! ## Example
//!
//! ```
//! use duel_core::core::{EntityId, PlayerId};
//! use duel_core::priority::{order_by_priority, CategoryRanks, PriorityContext, PriorityKey};
//! use duel_core::registry::{CardPlacement, EntityCategory};
//!
//! let card = |id: u32, owner: PlayerId, position: u32| PriorityKey {
//!     entity: EntityId(id),
//!     ability: "Strike".into(),
//!     category: EntityCategory::Card,
//!     owner: Some(owner),
//!     placement: Some(CardPlacement::on_board(position)),
//!     comparer: None,
//! };
//!
//! let mut keys = vec![
//!     card(1, PlayerId::SECOND, 3),
//!     card(2, PlayerId::FIRST, 2),
//!     card(3, PlayerId::FIRST, 1),
//! ];
//!
//! let ranks = CategoryRanks::default();
//! let ctx = PriorityContext::new("ReadyToAttack", Some(PlayerId::FIRST), &ranks);
//! order_by_priority(&mut keys, |k| k, &ctx);
//!
//! let order: Vec<_> = keys.iter().map(|k| k.entity.raw()).collect();
//! assert_eq!(order, vec![3, 2, 1]);
//! ```

mod comparer;
mod ranks;

pub use comparer::{compare, comparer, order_by_priority, CompareFn, PriorityContext, PriorityKey};
pub use ranks::CategoryRanks;
