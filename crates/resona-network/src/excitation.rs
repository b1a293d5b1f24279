//! Stochastic excitation: the "stick on a half-closed hi-hat" noise.
//!
//! A jittered impulse train sets a gain that decays exponentially between
//! impulses; each impulse re-rolls the gain from a normal distribution.
//! The carrier is uniform noise cubed (denser around zero than plain
//! white), and a [`Highpass2`] keeps the rumble out of whatever resonator
//! this feeds.

use libm::{cosf, logf, sqrtf};

use resona_core::noise::White;

use crate::serial_allpass::Highpass2;

/// Standard normal deviate via Box-Muller.
fn normal(rng: &mut White) -> f32 {
    // Map to (0, 1]; the offset keeps log() finite.
    let u1 = (f64::from(rng.next_u32()) + 1.0) / (f64::from(u32::MAX) + 1.0);
    let u2 = f64::from(rng.next_u32()) / (f64::from(u32::MAX) + 1.0);
    sqrtf(-2.0 * logf(u1 as f32)) * cosf(core::f32::consts::TAU * u2 as f32)
}

/// Impulse-train noise with exponential inter-impulse decay.
#[derive(Debug, Clone)]
pub struct HalfClosedNoise {
    phase: f32,
    gain: f32,
    decay: f32,
    rng: White,
    highpass: Highpass2,
}

impl Default for HalfClosedNoise {
    fn default() -> Self {
        Self {
            phase: 0.0,
            gain: 1.0,
            decay: 0.0,
            rng: White::new(0),
            highpass: Highpass2::default(),
        }
    }
}

impl HalfClosedNoise {
    /// Re-seed the owned noise source.
    pub fn seed(&mut self, seed: u32) {
        self.rng.seed(seed);
    }

    /// Clear signal state; decay setting stays.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.gain = 1.0;
        self.highpass.reset();
    }

    /// Set the inter-impulse decay time. Times under one sample decay
    /// instantly.
    pub fn set_decay(&mut self, time_in_samples: f32) {
        self.decay = if time_in_samples < 1.0 {
            0.0
        } else {
            libm::powf(f32::EPSILON, 1.0 / time_in_samples)
        };
    }

    /// Advance one sample.
    ///
    /// * `density` - inverse of the average samples between impulses.
    /// * `random_gain` - 0 keeps every impulse at unit gain, 1 fully
    ///   randomizes it.
    /// * `highpass_normalized` - safety highpass cutoff / sample rate.
    pub fn process(&mut self, density: f32, random_gain: f32, highpass_normalized: f32) -> f32 {
        let jitter = 0.5 * (self.rng.process() + 1.0);
        self.phase += jitter * density;
        if self.phase >= 1.0 {
            self.phase -= libm::floorf(self.phase);
            let deviate = normal(&mut self.rng) / 3.0;
            self.gain = 1.0 + random_gain * (deviate - 1.0);
        } else {
            self.gain *= self.decay;
        }

        let noise = self.rng.process();
        self.highpass
            .process(noise * noise * noise * self.gain, highpass_normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_bounded() {
        let mut noise = HalfClosedNoise::default();
        noise.seed(5);
        noise.set_decay(480.0);
        for _ in 0..48000 {
            let out = noise.process(0.01, 1.0, 300.0 / 48000.0);
            assert!(out.is_finite());
            assert!(out.abs() < 4.0, "out {}", out);
        }
    }

    #[test]
    fn zero_density_decays_to_silence() {
        let mut noise = HalfClosedNoise::default();
        noise.seed(11);
        noise.set_decay(100.0);
        let mut late = 0.0f32;
        for i in 0..10000 {
            let out = noise.process(0.0, 0.0, 300.0 / 48000.0);
            if i > 5000 {
                late = late.max(out.abs());
            }
        }
        assert!(late < 1e-4, "did not decay: {}", late);
    }

    #[test]
    fn density_sets_impulse_rate() {
        // Higher density keeps the gain refreshed, so long-run output
        // power is larger than at a sparse setting.
        let power = |density: f32| {
            let mut noise = HalfClosedNoise::default();
            noise.seed(21);
            noise.set_decay(50.0);
            let mut acc = 0.0f64;
            for _ in 0..48000 {
                let out = noise.process(density, 0.0, 20.0 / 48000.0);
                acc += f64::from(out * out);
            }
            acc
        };
        assert!(power(0.05) > 4.0 * power(0.0005));
    }

    #[test]
    fn deterministic_per_seed() {
        let run = || {
            let mut noise = HalfClosedNoise::default();
            noise.seed(77);
            noise.set_decay(200.0);
            (0..64)
                .map(|_| noise.process(0.02, 0.5, 0.01))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
