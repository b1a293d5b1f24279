//! First-order lowpass and highpass filters.
//!
//! Both filters come from the bilinear transform of an analog one-pole, so
//! the response stays correct up close to Nyquist (an EMA-style one-pole
//! droops there). Cutoff is given normalized to the sample rate and clamped
//! to `[MIN_CUTOFF, MAX_CUTOFF]`.

use libm::tanf;

/// Lowest accepted normalized cutoff.
pub const MIN_CUTOFF: f32 = 1e-5;
/// Highest accepted normalized cutoff, just under Nyquist to keep
/// `tan(π·cutoff)` finite.
pub const MAX_CUTOFF: f32 = 0.49998;

#[inline]
fn warp(cutoff_normalized: f32) -> f32 {
    // k = 1 / tan(π·fc), shared by both filter types.
    1.0 / tanf(core::f32::consts::PI * cutoff_normalized.clamp(MIN_CUTOFF, MAX_CUTOFF))
}

/// First-order bilinear lowpass.
#[derive(Debug, Clone, Default)]
pub struct Lp1 {
    b: f32,
    a1: f32,
    x1: f32,
    y1: f32,
}

impl Lp1 {
    /// Set the normalized cutoff (cutoff_hz / sample_rate).
    pub fn set_cutoff(&mut self, cutoff_normalized: f32) {
        let k = warp(cutoff_normalized);
        let a0 = 1.0 + k;
        self.b = 1.0 / a0;
        self.a1 = (k - 1.0) / a0;
    }

    /// Clear filter history, keeping coefficients.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self, x0: f32) -> f32 {
        self.y1 = self.b * (x0 + self.x1) + self.a1 * self.y1;
        self.x1 = x0;
        self.y1
    }
}

/// First-order bilinear highpass.
#[derive(Debug, Clone, Default)]
pub struct Hp1 {
    b: f32,
    a1: f32,
    x1: f32,
    y1: f32,
}

impl Hp1 {
    /// Set the normalized cutoff (cutoff_hz / sample_rate).
    pub fn set_cutoff(&mut self, cutoff_normalized: f32) {
        let k = warp(cutoff_normalized);
        let a0 = 1.0 + k;
        self.b = k / a0;
        self.a1 = (k - 1.0) / a0;
    }

    /// Clear filter history, keeping coefficients.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self, x0: f32) -> f32 {
        self.y1 = self.b * (x0 - self.x1) + self.a1 * self.y1;
        self.x1 = x0;
        self.y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lp1_unity_dc_gain() {
        let mut lp = Lp1::default();
        lp.set_cutoff(1000.0 / 48000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "dc gain {}", out);
    }

    #[test]
    fn hp1_rejects_dc() {
        let mut hp = Hp1::default();
        hp.set_cutoff(100.0 / 48000.0);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hp.process(1.0);
        }
        assert!(out.abs() < 1e-4, "dc leak {}", out);
    }

    #[test]
    fn hp1_passes_high_frequency() {
        // Nyquist-rate alternation through a low-cutoff highpass keeps
        // nearly full amplitude.
        let mut hp = Hp1::default();
        hp.set_cutoff(20.0 / 48000.0);
        let mut peak = 0.0f32;
        for i in 0..2000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let out = hp.process(x);
            if i > 1000 {
                peak = peak.max(out.abs());
            }
        }
        assert!(peak > 0.99, "peak {}", peak);
    }

    #[test]
    fn cutoff_is_clamped() {
        // Out-of-range cutoffs must not produce non-finite coefficients.
        let mut lp = Lp1::default();
        lp.set_cutoff(0.0);
        assert!(lp.process(1.0).is_finite());
        lp.set_cutoff(2.0);
        assert!(lp.process(1.0).is_finite());
    }

    #[test]
    fn reset_clears_state() {
        let mut lp = Lp1::default();
        lp.set_cutoff(0.1);
        lp.process(1.0);
        lp.reset();
        assert_eq!(lp.process(0.0), 0.0);
    }
}
