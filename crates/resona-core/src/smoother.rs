//! Exponential smoothing for parameters and control signals.
//!
//! Audio parameters need smooth transitions to avoid audible zipper noise.
//! This module provides two one-pole smoothers:
//!
//! - [`EmaFilter`] - exponential moving average used as a control-rate
//!   lowpass inside voices (exciter tone, shelving filters).
//! - [`ExpSmoother`] - value/target pair for parameter smoothing, with the
//!   coefficient owned per instance.
//!
//! Both use the same coefficient mapping: [`cutoff_to_p`] converts a cutoff
//! frequency into the feedback coefficient of `y += kp * (x - y)` so that
//! the -3 dB point of the smoother lands on the requested frequency.

use libm::{cosf, sqrtf};

/// Convert a cutoff frequency to the one-pole EMA coefficient `kp`.
///
/// Exact mapping for the filter `y[n] = y[n-1] + kp * (x[n] - y[n-1])`:
/// with `ω = 2π·cutoff/fs`, `y = 1 - cos(ω)`, then
/// `kp = sqrt((y + 2)·y) - y`. The cutoff is clamped to Nyquist.
#[inline]
pub fn cutoff_to_p(sample_rate: f32, cutoff_hz: f32) -> f32 {
    let omega = core::f32::consts::TAU * (cutoff_hz / sample_rate).clamp(0.0, 0.5);
    let y = 1.0 - cosf(omega);
    sqrtf((y + 2.0) * y) - y
}

/// One-state exponential moving average filter.
///
/// Used as a cheap lowpass for control signals and as the core of the EMA
/// shelving filters. Call [`set_cutoff`](Self::set_cutoff) (or
/// [`set_p`](Self::set_p) with a precomputed coefficient), then
/// [`process`](Self::process) per sample.
#[derive(Debug, Clone)]
pub struct EmaFilter {
    kp: f32,
    value: f32,
}

impl Default for EmaFilter {
    fn default() -> Self {
        Self { kp: 1.0, value: 0.0 }
    }
}

impl EmaFilter {
    /// Set the smoothing coefficient from a cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, sample_rate: f32, cutoff_hz: f32) {
        self.kp = cutoff_to_p(sample_rate, cutoff_hz);
    }

    /// Set the smoothing coefficient directly (0 = frozen, 1 = bypass).
    pub fn set_p(&mut self, kp: f32) {
        self.kp = kp.clamp(0.0, 1.0);
    }

    /// Current coefficient.
    pub fn kp(&self) -> f32 {
        self.kp
    }

    /// Reset the state to a value (default 0).
    pub fn reset(&mut self, value: f32) {
        self.value = value;
    }

    /// Current filter state without advancing.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.value += self.kp * (input - self.value);
        self.value
    }
}

/// A parameter value smoothed exponentially toward a target.
///
/// Unlike a plain [`EmaFilter`], this keeps the target explicit so callers
/// can either snap ([`reset_to`](Self::reset_to)) or glide
/// ([`push`](Self::push)) through a single code path, then call
/// [`process`](Self::process) once per sample.
///
/// Each smoother owns its coefficient; there is no shared global smoothing
/// configuration.
#[derive(Debug, Clone)]
pub struct ExpSmoother {
    value: f32,
    target: f32,
    kp: f32,
}

impl Default for ExpSmoother {
    fn default() -> Self {
        Self {
            value: 0.0,
            target: 0.0,
            kp: 1.0,
        }
    }
}

impl ExpSmoother {
    /// Set the coefficient from a smoothing time in seconds.
    ///
    /// The smoother's -3 dB cutoff is placed at `1/seconds` Hz. Zero or
    /// negative time disables smoothing (instant response).
    pub fn set_kp_from_time(&mut self, sample_rate: f32, seconds: f32) {
        if seconds <= 0.0 {
            self.kp = 1.0;
        } else {
            self.kp = cutoff_to_p(sample_rate, 1.0 / seconds);
        }
    }

    /// Set the coefficient directly.
    pub fn set_p(&mut self, kp: f32) {
        self.kp = kp.clamp(0.0, 1.0);
    }

    /// Snap value and target to `v` immediately.
    #[inline]
    pub fn reset_to(&mut self, v: f32) {
        self.value = v;
        self.target = v;
    }

    /// Set a new target; the value glides toward it on subsequent
    /// [`process`](Self::process) calls.
    #[inline]
    pub fn push(&mut self, target: f32) {
        self.target = target;
    }

    /// Current smoothed value without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Current target.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.value += self.kp * (self.target - self.value);
        self.value
    }
}
