//! Game randomness: deck shuffles, turn order, hidden role assignment.
//!
//! A seeded `GameRng` replays the same shuffles every time, which is what the
//! tests rely on. Unseeded games draw their seed from the OS.
//!
//! ```
//! use party_engine::core::GameRng;
//!
//! let mut a = GameRng::seeded(7);
//! let mut b = GameRng::seeded(7);
//! let mut x = vec![1, 2, 3, 4, 5];
//! let mut y = x.clone();
//! a.shuffle(&mut x);
//! b.shuffle(&mut y);
//! assert_eq!(x, y);
//! ```

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Shuffle source owned by a game instance.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Deterministic generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        let seed = rand::thread_rng().next_u64();
        Self::seeded(seed)
    }

    /// Seeded when `seed` is set, entropy otherwise.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_shuffles_repeat() {
        let mut a = GameRng::seeded(3);
        let mut b = GameRng::seeded(3);
        for _ in 0..5 {
            let mut x: Vec<u32> = (0..15).collect();
            let mut y = x.clone();
            a.shuffle(&mut x);
            b.shuffle(&mut y);
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = GameRng::seeded(11);
        let mut deck: Vec<u32> = (0..15).collect();
        rng.shuffle(&mut deck);
        assert_ne!(deck, (0..15).collect::<Vec<_>>());
        deck.sort_unstable();
        assert_eq!(deck, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_choose_and_index() {
        let mut rng = GameRng::seeded(1);
        let items = ["a", "b", "c"];
        assert!(items.contains(rng.choose(&items).unwrap()));
        assert!(rng.choose::<u8>(&[]).is_none());
        for _ in 0..20 {
            assert!(rng.index(3) < 3);
        }
    }

    #[test]
    fn test_from_seed_keeps_seed() {
        let mut a = GameRng::from_seed(Some(42));
        let mut b = GameRng::seeded(42);
        assert_eq!(a.seed(), 42);
        let x: Vec<_> = (0..10).map(|_| a.index(1000)).collect();
        let y: Vec<_> = (0..10).map(|_| b.index(1000)).collect();
        assert_eq!(x, y);
    }
}
