//! Seeded random number generation.
//!
//! Wraps ChaCha8Rng for reproducible draws: the same seed yields the
//! same output sequence across the same sequence of operations. Every
//! stochastic decision in the crate routes through a [`SeededRng`]
//! owned by exactly one generator or factory instance.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::errors::DrawError;

/// Deterministic RNG for level generation and content draws.
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Only the seed is serialized; a restored RNG restarts its sequence.
impl Serialize for SeededRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SeededRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(SeededRng::new(seed))
    }
}

impl SeededRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform f64 in [0, 1).
    pub fn real(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Uniform f64 in [min, max). Returns `min` for an empty range.
    pub fn real_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Uniform integer in [min, max). Returns `min` for an empty range.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Uniform index into a collection of length `len`.
    ///
    /// Returns 0 if `len` is 0.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    /// Returns true with probability 1/n.
    pub fn one_in(&mut self, n: u32) -> bool {
        if n == 0 {
            return false;
        }
        self.rng.gen_range(0..n) == 0
    }

    /// Uniformly chosen reference into `items`, without mutation.
    pub fn element<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, DrawError> {
        if items.is_empty() {
            return Err(DrawError::EmptyPool);
        }
        let idx = self.index(items.len());
        Ok(&items[idx])
    }

    /// Uniformly chosen element, removed from `items`.
    ///
    /// The caller-visible vector shrinks; callers that need a
    /// repeatable pool must pass a copy.
    pub fn remove_element<T>(&mut self, items: &mut Vec<T>) -> Result<T, DrawError> {
        if items.is_empty() {
            return Err(DrawError::EmptyPool);
        }
        let idx = self.index(items.len());
        Ok(items.remove(idx))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_int_bounds() {
        let mut rng = SeededRng::new(42);
        for _ in 0..1000 {
            let n = rng.int(3, 10);
            assert!((3..10).contains(&n));
        }
    }

    #[test]
    fn test_empty_range_returns_min() {
        let mut rng = SeededRng::new(42);
        assert_eq!(rng.int(5, 5), 5);
        assert_eq!(rng.int(7, 3), 7);
        assert_eq!(rng.real_range(2.0, 2.0), 2.0);
    }

    #[test]
    fn test_element_empty_pool() {
        let mut rng = SeededRng::new(42);
        let empty: Vec<u32> = vec![];
        assert_eq!(rng.element(&empty), Err(DrawError::EmptyPool));

        let mut empty = Vec::<u32>::new();
        assert_eq!(rng.remove_element(&mut empty), Err(DrawError::EmptyPool));
    }

    #[test]
    fn test_remove_element_shrinks() {
        let mut rng = SeededRng::new(42);
        let mut pool = vec![1, 2, 3, 4];
        let drawn = rng.remove_element(&mut pool).unwrap();
        assert_eq!(pool.len(), 3);
        assert!(!pool.contains(&drawn) || pool.iter().filter(|&&v| v == drawn).count() < 2);
    }

    #[test]
    fn test_serde_roundtrip_restarts_sequence() {
        let mut rng = SeededRng::new(1234);
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SeededRng = serde_json::from_str(&json).unwrap();

        let mut fresh = SeededRng::new(1234);
        for _ in 0..50 {
            assert_eq!(restored.int(0, 1000), fresh.int(0, 1000));
        }
        // The original keeps advancing independently of the copy.
        let _ = rng.int(0, 1000);
    }

    proptest! {
        #[test]
        fn prop_reproducible(seed in any::<u64>()) {
            let mut a = SeededRng::new(seed);
            let mut b = SeededRng::new(seed);
            for _ in 0..20 {
                prop_assert_eq!(a.int(0, 100), b.int(0, 100));
                prop_assert!((a.real() - b.real()).abs() < f64::EPSILON);
            }
        }
    }
}
