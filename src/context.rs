use std::cell::{Cell, RefCell};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::property::PropertyManager;

/// Per-simulation evaluation context: the shared property namespace, the
/// cycle counter that scopes function caching, and the random source for the
/// `random`/`urandom` operations.
///
/// One context per simulation instance; passed explicitly to the builder and
/// held by every function, so multiple independent simulations can coexist in
/// one process. Single-threaded by design.
pub struct SimContext {
    properties: PropertyManager,
    cycle: Cell<u64>,
    rng: RefCell<ChaCha8Rng>,
}

impl SimContext {
    /// A context with a fixed default seed; runs are reproducible unless the
    /// host reseeds.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            properties: PropertyManager::new(),
            cycle: Cell::new(0),
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn properties(&self) -> &PropertyManager {
        &self.properties
    }

    /// The current simulation cycle. Cached function values are valid only
    /// within the cycle they were computed in.
    pub fn cycle(&self) -> u64 {
        self.cycle.get()
    }

    /// Marks the start of a new simulation step, invalidating every cached
    /// function value.
    pub fn advance_cycle(&self) {
        self.cycle.set(self.cycle.get() + 1);
    }

    pub fn reseed(&self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Standard Gaussian sample (mean 0, unit variance), via Box-Muller.
    pub fn gaussian(&self) -> f64 {
        let mut rng = self.rng.borrow_mut();
        // 1 - u keeps the log argument in (0, 1].
        let u1: f64 = 1.0 - rng.gen_range(0.0..1.0);
        let u2: f64 = rng.gen_range(0.0..1.0);
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Uniform sample in [-1, +1].
    pub fn uniform(&self) -> f64 {
        self.rng.borrow_mut().gen_range(-1.0..=1.0)
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_advances_monotonically() {
        let ctx = SimContext::new();
        assert_eq!(ctx.cycle(), 0);
        ctx.advance_cycle();
        ctx.advance_cycle();
        assert_eq!(ctx.cycle(), 2);
    }

    #[test]
    fn same_seed_reproduces_samples() {
        let a = SimContext::with_seed(42);
        let b = SimContext::with_seed(42);
        for _ in 0..16 {
            assert_eq!(a.uniform(), b.uniform());
            assert_eq!(a.gaussian(), b.gaussian());
        }
    }

    #[test]
    fn uniform_stays_in_range() {
        let ctx = SimContext::with_seed(7);
        for _ in 0..512 {
            let v = ctx.uniform();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn gaussian_has_plausible_moments() {
        let ctx = SimContext::with_seed(7);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| ctx.gaussian()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.1);
    }
}
