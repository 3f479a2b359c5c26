//! Entity-category rank table.

use rustc_hash::FxHashMap;

use crate::registry::EntityCategory;

/// Rank per entity category; higher ranks react first.
///
/// The defaults order system entities above effects, resource types,
/// players, heroes and card instances. Content packages extend the table
/// with their own `Custom` categories or re-rank built-in ones.
///
/// ```
/// use duel_core::priority::CategoryRanks;
/// use duel_core::registry::EntityCategory;
///
/// let ranks = CategoryRanks::default().with_rank(EntityCategory::Custom(1), 75);
/// assert!(ranks.rank(EntityCategory::Custom(1)) > ranks.rank(EntityCategory::Player));
/// assert!(ranks.rank(EntityCategory::Custom(1)) < ranks.rank(EntityCategory::Resource));
/// ```
#[derive(Clone, Debug)]
pub struct CategoryRanks {
    ranks: FxHashMap<EntityCategory, i32>,
}

impl Default for CategoryRanks {
    fn default() -> Self {
        let mut ranks = FxHashMap::default();
        ranks.insert(EntityCategory::Global, 100);
        ranks.insert(EntityCategory::Effect, 90);
        ranks.insert(EntityCategory::Resource, 80);
        ranks.insert(EntityCategory::Player, 70);
        ranks.insert(EntityCategory::Hero, 60);
        ranks.insert(EntityCategory::Card, 50);
        Self { ranks }
    }
}

impl CategoryRanks {
    /// Set the rank for a category (builder pattern).
    #[must_use]
    pub fn with_rank(mut self, category: EntityCategory, rank: i32) -> Self {
        self.set_rank(category, rank);
        self
    }

    pub fn set_rank(&mut self, category: EntityCategory, rank: i32) {
        self.ranks.insert(category, rank);
    }

    /// Rank for a category. Unlisted custom categories rank 0.
    #[must_use]
    pub fn rank(&self, category: EntityCategory) -> i32 {
        self.ranks.get(&category).copied().unwrap_or(0)
    }
}
