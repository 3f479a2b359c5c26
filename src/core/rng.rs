//! Deterministic random number generation.
//!
//! The duel RNG is seeded from [`DuelConfig`](super::DuelConfig) so a
//! replayed duel makes the same choices (who goes first, shuffles done by
//! content).
//!
//! ```
//! use duel_core::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.gen_range_usize(0..100), b.gen_range_usize(0..100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::PlayerId;

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Generate a random boolean with given probability of true.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability)
    }

    /// Coin flip between the two players.
    pub fn coin_flip(&mut self) -> PlayerId {
        if self.gen_bool(0.5) {
            PlayerId::FIRST
        } else {
            PlayerId::SECOND
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(12345);
        let mut rng2 = GameRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range_usize(0..1000), rng2.gen_range_usize(0..1000));
        }
    }

    #[test]
    fn test_coin_flip_is_seeded() {
        let flips: Vec<_> = (0..8).map(|_| GameRng::new(77).coin_flip()).collect();
        assert!(flips.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_shuffle_determinism() {
        let mut a = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let mut b = a.clone();
        GameRng::new(5).shuffle(&mut a);
        GameRng::new(5).shuffle(&mut b);
        assert_eq!(a, b);
    }
}
