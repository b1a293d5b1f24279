//! Feedback delay network with an identity-blended Householder matrix.
//!
//! `N` delay lines feed back through the Householder reflection
//! `H = I - (2/N)·J` (J all-ones), which is orthogonal for any `N` and
//! costs one sum per sample. [`FeedbackDelayNetwork::matrix_blend`]
//! crossfades between no coupling (each line rings on its own) and the
//! full reflection (dense, reverb-like mixing); every blend in between is
//! still non-expanding, since the blended matrix's eigenvalues stay within
//! the unit circle.
//!
//! An energy guard watches the running loop energy and scales the
//! effective feedback down when it exceeds a bound, so feedback settings
//! at or above 1 ring essentially forever without running away.

use resona_core::delay::Delay;
use resona_core::math::{flush_denormal, safe_clip};
use resona_core::smoother::EmaFilter;

/// Loop energy (mean square per line) above which the guard starts
/// reining in the feedback.
const ENERGY_BOUND: f32 = 4.0;

/// N-line feedback delay network.
#[derive(Debug, Clone)]
pub struct FeedbackDelayNetwork<const N: usize> {
    delay: [Delay; N],
    lowpass: [EmaFilter; N],
    highpass: [EmaFilter; N],
    buffer: [f32; N],
    energy: EmaFilter,

    /// Per-line delay times in samples.
    pub time_in_samples: [f32; N],
    /// 0 = uncoupled lines, 1 = full Householder reflection.
    pub matrix_blend: f32,
}

impl<const N: usize> Default for FeedbackDelayNetwork<N> {
    fn default() -> Self {
        let mut energy = EmaFilter::default();
        // Slow tracker; reacts over hundreds of samples so the guard
        // shapes the loop gain, not the waveform.
        energy.set_p(0.002);
        Self {
            delay: core::array::from_fn(|_| Delay::default()),
            lowpass: core::array::from_fn(|_| EmaFilter::default()),
            highpass: core::array::from_fn(|_| EmaFilter::default()),
            buffer: [0.0; N],
            energy,
            time_in_samples: [0.0; N],
            matrix_blend: 1.0,
        }
    }
}

impl<const N: usize> FeedbackDelayNetwork<N> {
    /// Allocate every line for `max_time_samples`.
    pub fn setup(&mut self, max_time_samples: usize) {
        for d in &mut self.delay {
            d.setup(max_time_samples);
        }
    }

    /// Set the per-line damping coefficients: `lowpass_kp` darkens the
    /// tail, `highpass_kp` blocks DC build-up (0 disables it).
    pub fn set_damping(&mut self, lowpass_kp: f32, highpass_kp: f32) {
        for f in &mut self.lowpass {
            f.set_p(lowpass_kp);
        }
        for f in &mut self.highpass {
            f.set_p(highpass_kp);
        }
    }

    /// Clear all signal state; times, blend and damping stay.
    pub fn reset(&mut self) {
        for d in &mut self.delay {
            d.reset();
        }
        for f in &mut self.lowpass {
            f.reset(0.0);
        }
        for f in &mut self.highpass {
            f.reset(0.0);
        }
        self.buffer = [0.0; N];
        self.energy.reset(0.0);
    }

    /// Advance one sample; returns the average of the line outputs.
    #[inline]
    pub fn process(&mut self, input: f32, feedback: f32) -> f32 {
        let n = N as f32;

        let mean_sq = self.buffer.iter().map(|x| x * x).sum::<f32>() / n;
        let energy = self.energy.process(mean_sq);
        let guard = if energy > ENERGY_BOUND {
            ENERGY_BOUND / energy
        } else {
            1.0
        };
        let fb = (feedback * guard).clamp(0.0, 0.999);

        let sum: f32 = self.buffer.iter().sum();
        let reflect = self.matrix_blend * 2.0 / n * sum;

        let mut output = 0.0;
        for i in 0..N {
            let routed = self.buffer[i] - reflect;
            let damped = self.lowpass[i].process(routed);
            let leveled = damped - self.highpass[i].process(damped);
            let x = safe_clip(input + fb * leveled);
            self.buffer[i] = flush_denormal(self.delay[i].process(x, self.time_in_samples[i]));
            output += self.buffer[i];
        }
        output / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_fdn() -> FeedbackDelayNetwork<4> {
        let mut fdn = FeedbackDelayNetwork::<4>::default();
        fdn.setup(512);
        fdn.time_in_samples = [149.0, 211.0, 263.0, 331.0];
        fdn.set_damping(0.6, 0.002);
        fdn
    }

    #[test]
    fn impulse_decays_at_moderate_feedback() {
        let mut fdn = seeded_fdn();
        let mut early = 0.0f32;
        let mut late = 0.0f32;
        for i in 0..48000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let out = fdn.process(x, 0.7).abs();
            if i < 4800 {
                early = early.max(out);
            } else if i >= 43200 {
                late = late.max(out);
            }
        }
        assert!(early > 1e-6, "network did not ring");
        assert!(late < 1e-3, "tail did not decay: {}", late);
    }

    #[test]
    fn bounded_at_unity_feedback() {
        let mut fdn = seeded_fdn();
        let mut peak = 0.0f32;
        for i in 0..96000 {
            let x = if i % 4800 == 0 { 1.0 } else { 0.0 };
            let out = fdn.process(x, 1.0);
            assert!(out.is_finite());
            peak = peak.max(out.abs());
        }
        assert!(peak < 100.0, "energy ran away: {}", peak);
    }

    #[test]
    fn matrix_blend_zero_keeps_lines_independent() {
        // With no coupling and only line 0 excited via direct input, all
        // lines still receive the input; instead check that blend 0 and
        // blend 1 produce different mixes of the same impulse.
        let mut a = seeded_fdn();
        let mut b = seeded_fdn();
        a.matrix_blend = 0.0;
        b.matrix_blend = 1.0;
        let mut diff = 0.0f32;
        for i in 0..4000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            diff = diff.max((a.process(x, 0.8) - b.process(x, 0.8)).abs());
        }
        assert!(diff > 1e-6, "blend had no effect");
    }

    #[test]
    fn reset_silences() {
        let mut fdn = seeded_fdn();
        fdn.process(1.0, 0.9);
        fdn.process(0.0, 0.9);
        fdn.reset();
        for _ in 0..1000 {
            assert_eq!(fdn.process(0.0, 0.9), 0.0);
        }
    }
}
