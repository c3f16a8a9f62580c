// Divesim - Dive-site telemetry engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Random source abstraction
//!
//! Every stochastic term in the engine draws from an explicit
//! [`RandomSource`]. Any [`rand::Rng`] is a random source, so a seeded
//! `StdRng` gives reproducible readings.

use rand::Rng;

/// Source of randomness threaded through generators and the event injector
pub trait RandomSource {
    /// Uniform real in `[low, high]`. Returns `low` when the range is empty.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Bernoulli trial with probability `p`.
    fn chance(&mut self, p: f64) -> bool;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn choose_index(&mut self, len: usize) -> usize;

    /// Uniform choice from a non-empty slice.
    fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T
    where
        Self: Sized,
    {
        &items[self.choose_index(items.len())]
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.gen_bool(p.clamp(0.0, 1.0))
    }

    fn choose_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = rng.uniform(-0.1, 0.1);
            assert!((-0.1..=0.1).contains(&v));
        }
    }

    #[test]
    fn test_uniform_empty_range() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
        assert!(rng.chance(4.0));
    }

    #[test]
    fn test_choose_covers_all() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = ["a", "b", "c"];
        let mut seen = [false; 3];
        for _ in 0..200 {
            let idx = rng.choose_index(items.len());
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert!(items.contains(rng.choose(&items)));
    }
}
