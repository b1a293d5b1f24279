//! Wave-folding nonlinearity with 16× oversampled processing.
//!
//! [`FoldShaper`] reflects the signal back from ±1 each time `gain` pushes
//! it past an integer boundary, scaling successive folds by `multiply`.
//! Folding is heavily discontinuous in slope, so the shaper is normally run
//! through [`process_16x`](FoldShaper::process_16x), which evaluates the
//! fold at 16× the base rate between the polyphase upsampler and the
//! decimation chain from [`crate::multirate`].

use libm::{copysignf, fabsf, floorf, powf};

use crate::effect::Effect;
use crate::math::safe_clip;
use crate::multirate::{DecimationLowpass, FirUpSampler16, HalfBandIir, SOS_16_FOLD};

/// Wave folder with oversampled and raw entry points.
#[derive(Debug, Clone)]
pub struct FoldShaper {
    /// Input gain; values above 1 drive the signal into the folds.
    pub gain: f32,
    /// Per-fold amplitude ratio. Must be greater than 0.
    pub multiply: f32,
    /// Clamp input to ±1 before folding.
    pub hardclip: bool,

    up_sampler: FirUpSampler16,
    lowpass: DecimationLowpass<8>,
    halfband: HalfBandIir,
}

impl Default for FoldShaper {
    fn default() -> Self {
        Self {
            gain: 1.0,
            multiply: 1.0,
            hardclip: true,
            up_sampler: FirUpSampler16::default(),
            lowpass: DecimationLowpass::new(&SOS_16_FOLD),
            halfband: HalfBandIir::default(),
        }
    }
}

impl FoldShaper {
    /// End-to-end latency of [`process_16x`](Self::process_16x) in
    /// base-rate samples: the FIR's integer delay plus the measured group
    /// delay of the decimation IIRs around the folded band.
    pub const LATENCY: usize = FirUpSampler16::INT_DELAY + 5;

    /// Memoryless fold. Output always passes [`safe_clip`].
    #[inline]
    pub fn shape(&self, input: f32) -> f32 {
        let x0 = if self.hardclip {
            input.clamp(-1.0, 1.0)
        } else {
            input
        };
        let absed = fabsf(x0 * self.gain);
        let floored = floorf(absed);
        let mul = powf(self.multiply, floored);

        let output = if (floored as i32) % 2 == 1 {
            copysignf(1.0, x0) - copysignf(mul * (absed - floored), x0)
        } else if floored >= 1.0 {
            copysignf(mul * (absed - floored) + (1.0 - mul / self.multiply), x0)
        } else {
            copysignf(mul * (absed - floored) + (1.0 - mul), x0)
        };
        safe_clip(output)
    }

    /// Fold at 16× the base rate: upsample, shape each phase, decimate.
    #[inline]
    pub fn process_16x(&mut self, input: f32) -> f32 {
        let phases = self.up_sampler.process(input);

        for &p in &phases[..8] {
            self.lowpass.push(self.shape(p));
        }
        let s0 = self.lowpass.output();
        for &p in &phases[8..] {
            self.lowpass.push(self.shape(p));
        }
        let s1 = self.lowpass.output();

        self.halfband.process([s0, s1])
    }
}

impl Effect for FoldShaper {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.process_16x(input)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {
        // The fold and its fixed-coefficient multirate chain are
        // rate-independent.
    }

    fn reset(&mut self) {
        self.up_sampler.reset();
        self.lowpass.reset();
        self.halfband.reset();
    }

    fn latency_samples(&self) -> usize {
        Self::LATENCY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_below_first_fold() {
        let shaper = FoldShaper::default();
        for &x in &[0.0, 0.25, -0.5, 0.999, -0.999] {
            assert!((shaper.shape(x) - x).abs() < 1e-6, "x = {}", x);
        }
    }

    #[test]
    fn fold_reflects_at_unity() {
        let mut shaper = FoldShaper::default();
        shaper.gain = 1.0;
        shaper.hardclip = false;
        // 1.25 folds back to 0.75, mirrored for the negative side.
        assert!((shaper.shape(1.25) - 0.75).abs() < 1e-6);
        assert!((shaper.shape(-1.25) + 0.75).abs() < 1e-6);
    }

    #[test]
    fn hardclip_freezes_beyond_unity() {
        let shaper = FoldShaper::default();
        assert_eq!(shaper.shape(5.0), shaper.shape(1.0));
        assert_eq!(shaper.shape(-5.0), shaper.shape(-1.0));
    }

    #[test]
    fn output_is_bounded_for_wild_settings() {
        let mut shaper = FoldShaper::default();
        shaper.hardclip = false;
        shaper.gain = 100.0;
        shaper.multiply = 3.0;
        for i in 0..1000 {
            let x = (i as f32 / 500.0) - 1.0;
            let out = shaper.shape(x * 10.0);
            assert!(out.is_finite());
            assert!(out.abs() <= 1024.0);
        }
    }

    #[test]
    fn non_finite_input_is_silenced() {
        let mut shaper = FoldShaper::default();
        shaper.hardclip = false;
        assert_eq!(shaper.shape(f32::NAN), 0.0);
        assert_eq!(shaper.shape(f32::INFINITY), 0.0);
    }

    #[test]
    fn oversampled_impulse_peaks_at_reported_latency() {
        let mut shaper = FoldShaper::default();
        let mut peak = 0.0f32;
        let mut peak_index = 0usize;
        for n in 0..100 {
            let x = if n == 0 { 0.5 } else { 0.0 };
            let out = shaper.process_16x(x);
            if out.abs() > peak {
                peak = out.abs();
                peak_index = n;
            }
        }
        let latency = shaper.latency_samples();
        assert!(
            peak_index.abs_diff(latency) <= 1,
            "peak at {}, latency {}",
            peak_index,
            latency
        );
    }

    #[test]
    fn oversampled_dc_follows_shape() {
        // A constant below the first fold must pass at unity gain.
        let mut shaper = FoldShaper::default();
        let mut out = 0.0;
        for _ in 0..2000 {
            out = shaper.process_16x(0.5);
        }
        assert!((out - 0.5).abs() < 1e-3, "dc {}", out);
    }
}
