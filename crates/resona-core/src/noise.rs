//! White noise from a 32-bit linear congruential generator.
//!
//! Audio noise does not need cryptographic quality; it needs to be cheap,
//! seedable, and owned per consumer so that one voice's draws never
//! perturb another's sequence.

/// Numerical-Recipes LCG white noise source.
#[derive(Debug, Clone)]
pub struct White {
    seed: u32,
}

impl White {
    /// Create a generator with the given seed.
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Re-seed, restarting the sequence.
    pub fn seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// Next raw 32-bit state. Useful for seeding child generators.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        self.seed
    }

    /// Next sample, uniformly distributed in [-1, 1].
    #[inline]
    pub fn process(&mut self) -> f32 {
        2.0 * (self.next_u32() as f32 / u32::MAX as f32) - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_in_range() {
        let mut rng = White::new(0);
        for _ in 0..10000 {
            let x = rng.process();
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = White::new(42);
        let mut b = White::new(42);
        for _ in 0..100 {
            assert_eq!(a.process(), b.process());
        }
    }

    #[test]
    fn reseed_restarts() {
        let mut rng = White::new(7);
        let first = rng.process();
        rng.process();
        rng.seed(7);
        assert_eq!(rng.process(), first);
    }

    #[test]
    fn roughly_zero_mean() {
        let mut rng = White::new(123);
        let mut acc = 0.0f64;
        let n = 100_000;
        for _ in 0..n {
            acc += f64::from(rng.process());
        }
        let mean = acc / f64::from(n);
        assert!(mean.abs() < 0.01, "mean {}", mean);
    }
}
