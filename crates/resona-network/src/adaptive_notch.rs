//! Adaptive notch filter with constrained poles and zeros.
//!
//! A gradient (LMS) update steers a single notch onto the dominant
//! sinusoid of the input, which is how a resonator network keeps its
//! loudest mode from swamping the mix. The single adapted coefficient
//! `alpha` relates to the notch frequency by `alpha = -2·cos(2πf/fs)`.
//!
//! Adaptation is only reliable when the target sits roughly in
//! `[0.01, 0.12]` of the sample rate and `narrowness` is in `[0.3, 0.9]`;
//! outside that envelope the estimate can bias or wander. Callers are
//! expected to keep the network's modes in that band.

/// Constrained-poles-and-zeros adaptive notch.
#[derive(Debug, Clone)]
pub struct AdaptiveNotch {
    alpha: f32,
    v1: f32,
    v2: f32,
}

impl Default for AdaptiveNotch {
    fn default() -> Self {
        Self {
            alpha: -2.0,
            v1: 0.0,
            v2: 0.0,
        }
    }
}

impl AdaptiveNotch {
    /// LMS step size.
    pub const MU: f32 = 2.0 / 1024.0;

    /// Current notch coefficient, in [-2, 2]; `-2·cos(2πf/fs)` at
    /// convergence.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Restart adaptation from 0 Hz and clear filter state.
    pub fn reset(&mut self) {
        self.alpha = -2.0;
        self.v1 = 0.0;
        self.v2 = 0.0;
    }

    /// Filter one sample and adapt.
    ///
    /// `narrowness` is the pole radius in [0, 1): larger values make a
    /// tighter notch but slower, noisier adaptation.
    #[inline]
    pub fn process(&mut self, input: f32, narrowness: f32) -> f32 {
        let a1 = narrowness * self.alpha;
        let a2 = narrowness * narrowness;
        // Normalize passband gain; the notch polynomial peaks at whichever
        // end of the spectrum is farther from the notch.
        let gain = if self.alpha >= 0.0 {
            (1.0 + a1 + a2) / (2.0 + self.alpha)
        } else {
            (1.0 - a1 + a2) / (2.0 - self.alpha)
        };

        const CLIP: f32 = 1.0 / f32::EPSILON;
        let x0 = input.clamp(-CLIP, CLIP);
        let v0 = x0 - a1 * self.v1 - a2 * self.v2;
        let y0 = v0 + self.alpha * self.v1 + self.v2;
        let s0 = (1.0 - narrowness) * v0 - narrowness * (1.0 - narrowness) * self.v2;
        self.alpha = (self.alpha - y0 * s0 * Self::MU).clamp(-2.0, 2.0);

        self.v2 = self.v1;
        self.v1 = v0;

        y0 * gain
    }
}
