//! Envelope generators for percussive voices.
//!
//! All of these are built on multiplying decays: `alpha = ε^(1/n)` decays
//! from 1 to machine epsilon in `n` samples, which reads as "silence after
//! `n` samples" while staying a single multiply per sample.
//!
//! [`ExpAdEnvelope`] is the interesting one: a full attack-decay shape
//! `(1 - e^(-a·t))·e^(-d·t)` whose rates are solved in closed form from
//! the requested peak time, using the real `W₋₁` branch of the Lambert W
//! function. The transcendental work happens once per trigger; per sample
//! it is still two multiplies.

use libm::{exp, expm1, log, powf};

/// Decay-to-epsilon coefficient: value reaches `f32::EPSILON` after
/// `n` samples of multiplication.
#[inline]
fn epsilon_alpha(decay_time_in_samples: f32) -> f32 {
    powf(f32::EPSILON, 1.0 / decay_time_in_samples)
}

/// One-segment exponential decay.
#[derive(Debug, Clone, Default)]
pub struct ExpDecay {
    value: f32,
    alpha: f32,
}

impl ExpDecay {
    /// Set the time to decay from 1 to epsilon.
    pub fn set_time(&mut self, decay_time_in_samples: f32) {
        self.alpha = epsilon_alpha(decay_time_in_samples);
    }

    /// Silence the envelope.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Restart from `gain`.
    pub fn trigger(&mut self, gain: f32) {
        self.value = gain;
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.value *= self.alpha;
        self.value
    }
}

/// Decay-sustain-release envelope from two epsilon decays.
///
/// While held, the value falls from 1 toward `sustain_level`; on
/// [`release`](Self::release) the whole remainder decays to silence.
#[derive(Debug, Clone)]
pub struct ExpDsrEnvelope {
    value: f32,
    alpha_decay: f32,
    alpha_release: f32,
    offset: f32,
    state: DsrState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DsrState {
    Decay,
    Release,
}

impl Default for ExpDsrEnvelope {
    fn default() -> Self {
        Self {
            value: 0.0,
            alpha_decay: 0.0,
            alpha_release: 0.0,
            offset: 0.0,
            state: DsrState::Release,
        }
    }
}

impl ExpDsrEnvelope {
    /// Set both segment times in samples.
    pub fn set_time(&mut self, decay_time_in_samples: f32, release_time_in_samples: f32) {
        self.alpha_decay = epsilon_alpha(decay_time_in_samples);
        self.alpha_release = epsilon_alpha(release_time_in_samples);
    }

    /// Silence and return to the released state.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.offset = 0.0;
        self.state = DsrState::Release;
    }

    /// Start a note: jump to 1 and decay toward `sustain_level`.
    pub fn trigger(&mut self, sustain_level: f32) {
        self.state = DsrState::Decay;
        self.value = 1.0 - sustain_level;
        self.offset = sustain_level;
    }

    /// End the sustain; the current level decays to silence.
    pub fn release(&mut self) {
        if self.state == DsrState::Decay {
            // Fold the sustain offset back into the decaying part.
            self.value += self.offset;
        }
        self.state = DsrState::Release;
        self.offset = 0.0;
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        match self.state {
            DsrState::Decay => {
                self.value *= self.alpha_decay;
                self.offset + self.value
            }
            DsrState::Release => {
                self.value *= self.alpha_release;
                self.value
            }
        }
    }
}

/// Additive release tail for spliced voices.
///
/// When a voice is cut off mid-sound, [`prepare`](Self::prepare) captures
/// the current output level; the smoother then emits an exponential tail
/// that the caller adds to subsequent output. Multiple prepares
/// accumulate.
#[derive(Debug, Clone, Default)]
pub struct TransitionReleaseSmoother {
    v0: f32,
    decay: f32,
}

impl TransitionReleaseSmoother {
    /// Set the tail length in samples.
    pub fn setup(&mut self, decay_time_in_samples: f32) {
        self.decay = epsilon_alpha(decay_time_in_samples);
    }

    /// Drop any pending tail.
    pub fn reset(&mut self) {
        self.v0 = 0.0;
    }

    /// Add `value` to the tail and set its decay time.
    pub fn prepare(&mut self, value: f32, decay_time_in_samples: f32) {
        self.v0 += value;
        self.decay = epsilon_alpha(decay_time_in_samples);
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.v0 *= self.decay;
        self.v0
    }
}

/// Real `W₋₁` branch of the Lambert W function on `[-1/e, 0)`.
///
/// Log-based initial guess refined by Halley iteration; converges to
/// double precision in a handful of steps. Called once per trigger.
fn lambert_w_m1(x: f64) -> f64 {
    const BRANCH_POINT: f64 = -0.36787944117144233; // -1/e
    if x <= BRANCH_POINT {
        return -1.0;
    }
    let l1 = log(-x);
    let mut w = if l1 < -1.0 { l1 - log(-l1) } else { -1.0 };
    for _ in 0..16 {
        let ew = exp(w);
        let f = w * ew - x;
        let wp1 = w + 1.0;
        let denom = ew * wp1 - (w + 2.0) * f / (2.0 * wp1);
        if denom == 0.0 {
            break;
        }
        let next = w - f / denom;
        if (next - w).abs() < 1e-12 * next.abs().max(1.0) {
            return next;
        }
        w = next;
    }
    w
}

/// Closed-form attack-decay envelope, `(1 - e^(-a·t))·e^(-d·t)`.
///
/// [`trigger`](Self::trigger) solves `a` and `d` so the curve peaks at
/// `peak_seconds` and has audibly released `release_seconds` later, then
/// normalizes so the peak value equals `velocity · peak_gain`.
#[derive(Debug, Clone)]
pub struct ExpAdEnvelope {
    target_gain: f32,
    velocity: f32,
    gain: f32,
    smoothing_kp: f32,
    value_a: f32,
    alpha_a: f32,
    value_d: f32,
    alpha_d: f32,
}

impl Default for ExpAdEnvelope {
    fn default() -> Self {
        Self {
            target_gain: 0.0,
            velocity: 0.0,
            gain: 1.0,
            smoothing_kp: 1.0,
            value_a: 0.0,
            alpha_a: 0.0,
            value_d: 0.0,
            alpha_d: 0.0,
        }
    }
}

impl ExpAdEnvelope {
    /// Decay state below which the voice counts as silent.
    const TERMINATION_THRESHOLD: f32 = 1e-3;
    /// Attack residue above which the voice counts as still rising.
    const ATTACK_THRESHOLD: f32 = 1e-2;

    /// Set the coefficient smoothing the gain normalization on retrigger
    /// (1 = no smoothing).
    pub fn setup(&mut self, smoothing_kp: f32) {
        self.smoothing_kp = smoothing_kp;
    }

    /// True when the decay segment has run its course.
    pub fn is_terminated(&self) -> bool {
        self.value_d <= Self::TERMINATION_THRESHOLD
    }

    /// True while the attack segment still dominates.
    pub fn is_attacking(&self) -> bool {
        self.value_a > Self::ATTACK_THRESHOLD
    }

    /// Silence the envelope.
    pub fn reset(&mut self) {
        self.target_gain = 0.0;
        self.gain = 1.0;
        self.value_a = 0.0;
        self.alpha_a = 0.0;
        self.value_d = 0.0;
        self.alpha_d = 0.0;
    }

    /// Start the envelope.
    ///
    /// * `peak_seconds` - time of the maximum.
    /// * `release_seconds` - additional time until the tail is inaudible.
    /// * `peak_gain` - level of the maximum before velocity scaling.
    pub fn trigger(
        &mut self,
        sample_rate: f32,
        peak_seconds: f32,
        release_seconds: f32,
        peak_gain: f32,
        velocity: f32,
    ) {
        self.velocity = velocity;
        self.value_a = 1.0;
        self.value_d = 1.0;

        let eps = f64::from(f32::EPSILON);
        let peak = f64::from(peak_seconds.max(1e-5));
        // A zero release puts d·peak exactly at -1, the W₋₁ branch point,
        // which degenerates into a silent envelope; keep it strictly off.
        let release = f64::from(release_seconds.max(1e-3));
        let sr = f64::from(sample_rate);

        let decay_seconds = release - log(eps) * peak;
        let d = log(eps) / decay_seconds;
        let x = d * peak;
        let a = lambert_w_m1(x * exp(x)) / peak - d;

        self.alpha_a = exp(a / sr) as f32;
        self.alpha_d = exp(d / sr) as f32;
        self.target_gain =
            (f64::from(peak_gain) / (-expm1(a * peak) * exp(d * peak))) as f32;
    }

    /// Advance one sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.gain += self.smoothing_kp * (self.target_gain - self.gain);
        self.value_a *= self.alpha_a;
        self.value_d *= self.alpha_d;
        self.velocity * self.gain * (1.0 - self.value_a) * self.value_d
    }
}
