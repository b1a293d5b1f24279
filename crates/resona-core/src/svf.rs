//! State-variable filter bank with runtime response selection.
//!
//! Topology-preserving-transform SVF after the Faust `filters.lib`
//! formulation: two integrator states, coefficients recomputed every sample
//! from the incoming cutoff and Q. The response is picked by [`SvfKind`],
//! so one struct serves the whole filter bank.
//!
//! `shelf_gain_amp` only affects the Bell and shelf responses; other kinds
//! ignore it.

use libm::{sqrtf, tanf};

use crate::one_pole::{MAX_CUTOFF, MIN_CUTOFF};

/// Filter response selector for [`Svf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvfKind {
    /// 12 dB/oct lowpass.
    Lowpass,
    /// 12 dB/oct highpass.
    Highpass,
    /// Unity-peak bandpass.
    Bandpass,
    /// Band-reject.
    Notch,
    /// Peaking response (LP minus HP).
    Peak,
    /// Second-order allpass.
    Allpass,
    /// Parametric bell, boost/cut set by `shelf_gain_amp`.
    Bell,
    /// Low shelf, gain set by `shelf_gain_amp`.
    LowShelf,
    /// High shelf, gain set by `shelf_gain_amp`.
    HighShelf,
}

/// Topology-preserving-transform state-variable filter.
///
/// Per-sample coefficient computation keeps fast cutoff modulation stable;
/// the two integrator states are the only memory.
#[derive(Debug, Clone)]
pub struct Svf {
    kind: SvfKind,
    s1: f32,
    s2: f32,
}

impl Svf {
    /// Create a filter with the given response.
    pub fn new(kind: SvfKind) -> Self {
        Self {
            kind,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Response currently selected.
    pub fn kind(&self) -> SvfKind {
        self.kind
    }

    /// Change the response without touching state.
    pub fn set_kind(&mut self, kind: SvfKind) {
        self.kind = kind;
    }

    /// Zero both integrator states.
    pub fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    /// Advance one sample.
    ///
    /// * `cutoff_normalized` - cutoff_hz / sample_rate, clamped internally.
    /// * `q` - resonance (must be > 0; 1/sqrt(2) is Butterworth).
    /// * `shelf_gain_amp` - linear gain for Bell/LowShelf/HighShelf; pass
    ///   1.0 for the other kinds.
    #[inline]
    pub fn process(
        &mut self,
        v0: f32,
        cutoff_normalized: f32,
        q: f32,
        shelf_gain_amp: f32,
    ) -> f32 {
        let uses_shelf = matches!(
            self.kind,
            SvfKind::Bell | SvfKind::LowShelf | SvfKind::HighShelf
        );
        let a = if uses_shelf { sqrtf(shelf_gain_amp) } else { 1.0 };

        let mut g = tanf(cutoff_normalized.clamp(MIN_CUTOFF, MAX_CUTOFF) * core::f32::consts::PI);
        match self.kind {
            SvfKind::LowShelf => g /= sqrtf(a),
            SvfKind::HighShelf => g *= sqrtf(a),
            _ => {}
        }

        let mut k = 1.0 / q;
        if self.kind == SvfKind::Bell {
            k /= a;
        }

        let v1 = (self.s1 + g * (v0 - self.s2)) / (1.0 + g * (g + k));
        let v2 = self.s2 + g * v1;

        self.s1 = 2.0 * v1 - self.s1;
        self.s2 = 2.0 * v2 - self.s2;

        match self.kind {
            SvfKind::Lowpass => v2,
            SvfKind::Bandpass => v1,
            SvfKind::Highpass => v0 - k * v1 - v2,
            SvfKind::Notch => v0 - k * v1,
            SvfKind::Peak => v0 - k * v1 - 2.0 * v2,
            SvfKind::Allpass => v0 - 2.0 * k * v1,
            SvfKind::Bell => v0 + k * (a * a - 1.0) * v1,
            SvfKind::LowShelf => v0 + (a - 1.0) * k * v1 + (a * a - 1.0) * v2,
            SvfKind::HighShelf => a * a * (v0 - k * v1 - v2) + a * k * v1 + v2,
        }
    }
}
