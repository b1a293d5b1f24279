//! Serial allpass resonator chain with per-stage shelving.
//!
//! This is the "body" of a struck-metal voice: a loop of N fractional
//! delays in an allpass configuration, each stage preceded by an EMA
//! high shelf (damps the top) and an EMA low shelf (thins the bottom).
//! Delay times self-modulate by the stage's own amplitude, which is what
//! bends the partials of a hard strike — the characteristic cymbal chirp.
//! Out-of-range modulated times are clamped by the delay line rather than
//! slew-limited.
//!
//! Optional [`AdaptiveNotch`] stages after the chain pull the loudest mode
//! out of the sum.

use libm::{fabsf, tanf};

use resona_core::delay::Delay;
use resona_core::math::lerp;
use resona_core::one_pole::{MAX_CUTOFF, MIN_CUTOFF};

use crate::adaptive_notch::AdaptiveNotch;

/// EMA-based high shelf: unity below the EMA cutoff, `shelving_gain`
/// above it.
#[derive(Debug, Clone, Default)]
pub struct EmaHighShelf {
    value: f32,
}

impl EmaHighShelf {
    /// Clear state.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Advance one sample. `kp` is the EMA coefficient, `shelving_gain`
    /// the linear gain above the cutoff.
    #[inline]
    pub fn process(&mut self, input: f32, kp: f32, shelving_gain: f32) -> f32 {
        self.value += kp * (input - self.value);
        lerp(self.value, input, shelving_gain)
    }
}

/// EMA-based low shelf: `shelving_gain` below the EMA cutoff, unity
/// above it.
#[derive(Debug, Clone, Default)]
pub struct EmaLowShelf {
    value: f32,
}

impl EmaLowShelf {
    /// Clear state.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self, input: f32, kp: f32, shelving_gain: f32) -> f32 {
        self.value += kp * (input - self.value);
        lerp(input - self.value, input, shelving_gain)
    }
}

/// Fixed-Q (Butterworth) TPT highpass with per-sample cutoff.
///
/// Used as a safety filter: it strips the DC and rumble that feedback
/// structures accumulate, with no resonance of its own.
#[derive(Debug, Clone, Default)]
pub struct Highpass2 {
    ic1eq: f32,
    ic2eq: f32,
}

impl Highpass2 {
    // 1/sqrt(2): Butterworth damping, no resonant peak.
    const K: f32 = core::f32::consts::FRAC_1_SQRT_2;

    /// Clear both integrator states.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self, input: f32, cutoff_normalized: f32) -> f32 {
        let g = tanf(core::f32::consts::PI * cutoff_normalized.clamp(MIN_CUTOFF, MAX_CUTOFF));
        let v1 = (self.ic1eq + g * (input - self.ic2eq)) / (1.0 + g * (g + Self::K));
        let v2 = self.ic2eq + g * v1;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        input - Self::K * v1 - v2
    }
}

/// Parameters for one [`SerialAllpass::process`] call.
///
/// Everything is per-sample so the caller can smooth each field at
/// whatever rate it likes.
#[derive(Debug, Clone, Copy)]
pub struct SerialAllpassParams {
    /// EMA coefficient of the per-stage high shelf.
    pub high_shelf_cut: f32,
    /// Linear gain of the per-stage high shelf.
    pub high_shelf_gain: f32,
    /// EMA coefficient of the per-stage low shelf.
    pub low_shelf_cut: f32,
    /// Linear gain of the per-stage low shelf.
    pub low_shelf_gain: f32,
    /// Allpass feedback gain, |gain| < 1 for a decaying resonance.
    pub gain: f32,
    /// Divides every delay time; 2 plays an octave up.
    pub pitch_ratio: f32,
    /// Samples of delay-time reduction per unit of stage amplitude.
    pub time_mod_amount: f32,
    /// How many of the notch stages actually run (0..=N_NOTCH).
    pub n_notch: usize,
    /// Dry/notch blend for the notch stages.
    pub notch_mix: f32,
    /// Pole radius of the notch stages.
    pub notch_narrowness: f32,
}

/// Chain of `N_ALLPASS` first-order (delay-based) allpasses with up to
/// `N_NOTCH` adaptive notches on the output.
#[derive(Debug, Clone)]
pub struct SerialAllpass<const N_ALLPASS: usize, const N_NOTCH: usize> {
    buffer: [f32; N_ALLPASS],
    delay: [Delay; N_ALLPASS],
    lowpass: [EmaHighShelf; N_ALLPASS],
    highpass: [EmaLowShelf; N_ALLPASS],
    notch: [AdaptiveNotch; N_NOTCH],

    /// Per-stage delay times in samples, written directly by the owner.
    pub time_in_samples: [f32; N_ALLPASS],
}

impl<const N_ALLPASS: usize, const N_NOTCH: usize> Default for SerialAllpass<N_ALLPASS, N_NOTCH> {
    fn default() -> Self {
        Self {
            buffer: [0.0; N_ALLPASS],
            delay: core::array::from_fn(|_| Delay::default()),
            lowpass: core::array::from_fn(|_| EmaHighShelf::default()),
            highpass: core::array::from_fn(|_| EmaLowShelf::default()),
            notch: core::array::from_fn(|_| AdaptiveNotch::default()),
            time_in_samples: [0.0; N_ALLPASS],
        }
    }
}

impl<const N_ALLPASS: usize, const N_NOTCH: usize> SerialAllpass<N_ALLPASS, N_NOTCH> {
    /// Allocate every delay for `max_time_samples`.
    pub fn setup(&mut self, max_time_samples: usize) {
        for d in &mut self.delay {
            d.setup(max_time_samples);
        }
    }

    /// Longest delay time, in samples, the stages can represent.
    pub fn max_time(&self) -> usize {
        self.delay[0].max_time()
    }

    /// Clear all signal state; delay times and allocation stay.
    pub fn reset(&mut self) {
        self.buffer = [0.0; N_ALLPASS];
        for d in &mut self.delay {
            d.reset();
        }
        for f in &mut self.lowpass {
            f.reset();
        }
        for f in &mut self.highpass {
            f.reset();
        }
        for n in &mut self.notch {
            n.reset();
        }
    }

    /// Scale the ringing stored in every delay buffer.
    pub fn apply_gain(&mut self, gain: f32) {
        for d in &mut self.delay {
            d.apply_gain(gain);
        }
    }

    /// Tap sum of all stages.
    ///
    /// `alt_sign_mix` crossfades between the direct sum (full, dark) and
    /// the alternating-sign sum (hollow, comb-like); the result is
    /// normalized by `2·N_ALLPASS`.
    pub fn sum(&self, alt_sign_mix: f32) -> f32 {
        let mut sum_alt = 0.0;
        let mut sign = 1.0;
        for &x in &self.buffer {
            sum_alt += x * sign;
            sign = -sign;
        }
        let sum_direct: f32 = self.buffer.iter().sum();
        lerp(sum_direct, sum_alt, alt_sign_mix) / (2.0 * N_ALLPASS as f32)
    }

    /// Advance the chain by one sample.
    #[inline]
    pub fn process(&mut self, mut input: f32, params: &SerialAllpassParams) -> f32 {
        for idx in 0..N_ALLPASS {
            let mut x0 =
                self.lowpass[idx].process(input, params.high_shelf_cut, params.high_shelf_gain);
            x0 = self.highpass[idx].process(x0, params.low_shelf_cut, params.low_shelf_gain);
            x0 -= params.gain * self.buffer[idx];
            input = self.buffer[idx] + params.gain * x0;
            let time = self.time_in_samples[idx] / params.pitch_ratio
                - params.time_mod_amount * fabsf(x0);
            self.buffer[idx] = self.delay[idx].process(x0, time);
        }

        for idx in 0..params.n_notch.min(N_NOTCH) {
            input += params.notch_mix * (self.notch[idx].process(input, params.notch_narrowness) - input);
        }

        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resona_core::noise::White;

    fn test_params() -> SerialAllpassParams {
        SerialAllpassParams {
            high_shelf_cut: 0.2,
            high_shelf_gain: 0.8,
            low_shelf_cut: 0.01,
            low_shelf_gain: 0.9,
            gain: 0.98,
            pitch_ratio: 1.0,
            time_mod_amount: 0.0,
            n_notch: 0,
            notch_mix: 0.0,
            notch_narrowness: 0.5,
        }
    }

    fn seeded_chain() -> SerialAllpass<4, 2> {
        let mut chain = SerialAllpass::<4, 2>::default();
        chain.setup(256);
        chain.time_in_samples = [37.0, 59.0, 83.0, 113.0];
        chain
    }

    #[test]
    fn ema_high_shelf_limits() {
        // Gain 1 is bypass.
        let mut shelf = EmaHighShelf::default();
        for i in 0..100 {
            let x = (i % 3) as f32 - 1.0;
            assert_eq!(shelf.process(x, 0.3, 1.0), x);
        }
        // Gain 0 with a slow EMA removes fast alternation.
        let mut shelf = EmaHighShelf::default();
        let mut out = 1.0f32;
        for i in 0..2000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            out = shelf.process(x, 0.01, 0.0);
        }
        assert!(out.abs() < 0.1, "residual {}", out);
    }

    #[test]
    fn ema_low_shelf_removes_dc_at_zero_gain() {
        let mut shelf = EmaLowShelf::default();
        let mut out = 1.0f32;
        for _ in 0..5000 {
            out = shelf.process(1.0, 0.05, 0.0);
        }
        assert!(out.abs() < 1e-3, "dc leak {}", out);
    }

    #[test]
    fn highpass2_rejects_dc() {
        let mut hp = Highpass2::default();
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hp.process(1.0, 300.0 / 48000.0);
        }
        assert!(out.abs() < 1e-4, "dc leak {}", out);
    }

    #[test]
    fn impulse_rings_and_decays() {
        let mut chain = seeded_chain();
        let params = test_params();
        let mut early = 0.0f32;
        let mut late = 0.0f32;
        for i in 0..48000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            chain.process(x, &params);
            let out = chain.sum(0.0).abs();
            if i < 4800 {
                early = early.max(out);
            } else if i >= 43200 {
                late = late.max(out);
            }
        }
        assert!(early > 1e-4, "chain did not ring: {}", early);
        assert!(late < early, "chain did not decay: {} vs {}", late, early);
    }

    #[test]
    fn bounded_under_noise_drive() {
        let mut chain = seeded_chain();
        let mut params = test_params();
        params.time_mod_amount = 4.0;
        params.n_notch = 2;
        params.notch_mix = 0.5;
        let mut rng = White::new(99);
        for _ in 0..48000 {
            let out = chain.process(rng.process(), &params);
            assert!(out.is_finite());
            assert!(out.abs() < 1e3, "output {}", out);
        }
    }

    #[test]
    fn apply_gain_quiets_ringing() {
        let mut chain = seeded_chain();
        let params = test_params();
        chain.process(1.0, &params);
        for _ in 0..200 {
            chain.process(0.0, &params);
        }
        let mut loud = 0.0f32;
        let mut probe = chain.clone();
        for _ in 0..200 {
            probe.process(0.0, &params);
            loud = loud.max(probe.sum(0.0).abs());
        }
        chain.apply_gain(0.01);
        let mut quiet = 0.0f32;
        for _ in 0..200 {
            chain.process(0.0, &params);
            quiet = quiet.max(chain.sum(0.0).abs());
        }
        assert!(quiet < loud, "apply_gain had no effect: {} vs {}", quiet, loud);
    }

    #[test]
    fn sum_normalization() {
        let mut chain = SerialAllpass::<4, 0>::default();
        chain.setup(64);
        chain.buffer = [1.0, 1.0, 1.0, 1.0];
        // Direct sum: 4 / (2 * 4) = 0.5; alternating sum: 0.
        assert!((chain.sum(0.0) - 0.5).abs() < 1e-6);
        assert!(chain.sum(1.0).abs() < 1e-6);
    }
}
