use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::hierarchy::{MAX_LEVEL, RATIO};

/// Seed used by [`RandomLeveler::new`].
pub const DEFAULT_SEED: u64 = 0;

/// Draws the level up to which a newly inserted point is promoted.
///
/// Levels follow a geometric law truncated at `MAX_LEVEL - 1`: starting at level 0, the point
/// climbs one more level with probability `1 / RATIO`, and stops otherwise. On average, each level
/// thus holds `RATIO` times fewer points than the level below.
///
/// The generator is seeded deterministically, so that two levelers built the same way draw the
/// same sequence of levels. This is not meant to be cryptographically random!
#[derive(Debug, Clone)]
pub struct RandomLeveler {
    rng: ChaCha8Rng,
}

impl Default for RandomLeveler {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomLeveler {
    /// Creates a leveler seeded with [`DEFAULT_SEED`].
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Creates a leveler seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draws a level in `0..MAX_LEVEL`.
    pub fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level < MAX_LEVEL - 1 && self.rng.gen_bool(1. / RATIO) {
            level += 1;
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_in_range() {
        let mut leveler = RandomLeveler::new();

        assert!((0..1000).all(|_| leveler.random_level() < MAX_LEVEL));
    }

    #[test]
    fn same_seed_same_levels() {
        let mut first = RandomLeveler::new();
        let mut second = RandomLeveler::new();

        let first: Vec<_> = (0..5000).map(|_| first.random_level()).collect();
        let second: Vec<_> = (0..5000).map(|_| second.random_level()).collect();

        assert_eq!(first, second);
        // Some points should have been promoted
        assert!(first.iter().any(|&level| level > 0));
    }

    #[test]
    fn different_seeds_different_levels() {
        let mut first = RandomLeveler::with_seed(1);
        let mut second = RandomLeveler::with_seed(2);

        let first: Vec<_> = (0..5000).map(|_| first.random_level()).collect();
        let second: Vec<_> = (0..5000).map(|_| second.random_level()).collect();

        assert_ne!(first, second);
    }

    #[test]
    fn clones_draw_the_same_levels() {
        let mut leveler = RandomLeveler::with_seed(7);
        leveler.random_level();
        let mut clone = leveler.clone();

        for _ in 0..1000 {
            assert_eq!(leveler.random_level(), clone.random_level());
        }
    }
}
