//! Mathematical utility functions for DSP.
//!
//! Allocation-free helpers shared across the workspace. Everything here is
//! `no_std` compatible, using `libm` where the standard library would need
//! `std`.

use libm::{expf, logf};

/// Hard bound applied by [`safe_clip`]. Signals inside feedback structures
/// stay far below this; hitting it means something upstream blew up.
pub const SAFE_CLIP_BOUND: f32 = 1024.0;

/// Clamp a sample to ±[`SAFE_CLIP_BOUND`], flushing non-finite values to 0.
///
/// Feedback networks and waveshapers call this on every output so a NaN or
/// infinity can never propagate into a delay buffer and persist there.
#[inline]
pub fn safe_clip(x: f32) -> f32 {
    if x.is_finite() {
        x.clamp(-SAFE_CLIP_BOUND, SAFE_CLIP_BOUND)
    } else {
        0.0
    }
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Subnormal floats cause severe CPU performance degradation on most
/// architectures. This replaces values below 1e-20 with zero, providing
/// margin before the IEEE 754 subnormal range begins.
///
/// Use this in feedback loops (allpass chains, delay networks) where signal
/// can decay indefinitely toward zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Linear interpolation between two values.
///
/// # Arguments
/// * `a` - Start value (at t=0)
/// * `b` - End value (at t=1)
/// * `t` - Interpolation factor (0.0 to 1.0)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert decibels to linear gain.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Input is floored at 1e-10 to keep the log finite.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}
