//! Player identification and per-player data storage.
//!
//! A duel always has exactly two parties, so `PlayerId` only takes the
//! values `0` and `1` and `PlayerMap` is backed by a fixed pair.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two duelling parties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The player seated first.
    pub const FIRST: PlayerId = PlayerId(0);
    /// The player seated second.
    pub const SECOND: PlayerId = PlayerId(1);

    /// Create a player ID, returning `None` for anything but 0 or 1.
    #[must_use]
    pub const fn new(id: u8) -> Option<Self> {
        if id < 2 {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other party.
    ///
    /// ```
    /// use duel_core::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::FIRST.opponent(), PlayerId::SECOND);
    /// assert_eq!(PlayerId::SECOND.opponent(), PlayerId::FIRST);
    /// ```
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Both players in seat order.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [Self::FIRST, Self::SECOND].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage.
///
/// ```
/// use duel_core::core::{PlayerId, PlayerMap};
///
/// let mut ready = PlayerMap::with_value(false);
/// ready[PlayerId::SECOND] = true;
/// assert!(!ready[PlayerId::FIRST]);
/// assert!(!ready.all(|r| *r));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId::FIRST), factory(PlayerId::SECOND)],
        }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            data: [value.clone(), value],
        }
    }

    /// Build from values in seat order.
    pub fn from_array(data: [T; 2]) -> Self {
        Self { data }
    }

    /// Consume the map, yielding values in seat order.
    pub fn into_array(self) -> [T; 2] {
        self.data
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// True when the predicate holds for both players.
    pub fn all(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.data.iter().all(pred)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_bounds() {
        assert_eq!(PlayerId::new(0), Some(PlayerId::FIRST));
        assert_eq!(PlayerId::new(1), Some(PlayerId::SECOND));
        assert_eq!(PlayerId::new(2), None);
        assert_eq!(format!("{}", PlayerId::SECOND), "Player 1");
    }

    #[test]
    fn test_both_in_seat_order() {
        let players: Vec<_> = PlayerId::both().collect();
        assert_eq!(players, vec![PlayerId::FIRST, PlayerId::SECOND]);
    }

    #[test]
    fn test_player_map_new() {
        let map: PlayerMap<i32> = PlayerMap::new(|p| p.index() as i32 * 10);

        assert_eq!(map[PlayerId::FIRST], 0);
        assert_eq!(map[PlayerId::SECOND], 10);
    }

    #[test]
    fn test_player_map_mutation() {
        let mut map: PlayerMap<i32> = PlayerMap::with_value(0);

        map[PlayerId::FIRST] = 10;
        map[PlayerId::SECOND] = 20;

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(PlayerId::FIRST, &10), (PlayerId::SECOND, &20)]);
        assert!(map.all(|v| *v > 5));
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<i32> = PlayerMap::new(|p| p.index() as i32 + 1);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }
}
