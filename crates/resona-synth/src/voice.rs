//! One polyphonic voice: stochastic excitation into a resonant allpass
//! body.
//!
//! Signal path per sample:
//!
//! ```text
//! strike noise ──┐
//!                ├─ exciter lowpass ─ SerialAllpass<8, 2> ─ AD envelope
//! sustain noise ─┘                                            │
//!                             safety highpass ── pan ─────────┘
//! ```
//!
//! The strike is a velocity-scaled white burst with an epsilon decay; the
//! sustain layer is [`HalfClosedNoise`] shaped by a decay-sustain-release
//! envelope, so holding the note keeps the resonator lightly excited.

use libm::exp2f;

use resona_core::noise::White;
use resona_core::smoother::EmaFilter;
use resona_network::excitation::HalfClosedNoise;
use resona_network::serial_allpass::{Highpass2, SerialAllpass, SerialAllpassParams};

use crate::engine::SynthParams;
use crate::envelope::{ExpAdEnvelope, ExpDecay, ExpDsrEnvelope, TransitionReleaseSmoother};

/// Convert a MIDI note number (possibly fractional) to Hz.
#[inline]
pub fn midi_to_freq(note: f32) -> f32 {
    440.0 * exp2f((note - 69.0) / 12.0)
}

/// Frequency ratio of a (possibly fractional) semitone offset.
#[inline]
pub fn semitone_ratio(semitones: f32) -> f32 {
    exp2f(semitones / 12.0)
}

/// Lifecycle of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteState {
    /// Note is held.
    Active,
    /// Note-off received; the tail is ringing out.
    Release,
    /// Silent and available for allocation.
    #[default]
    Rest,
}

/// Per-sample control values handed to every voice.
///
/// The engine builds one of these per sample from its smoothers, so all
/// voices see identical, click-free parameter trajectories.
#[derive(Debug, Clone, Copy)]
pub struct NoteContext {
    /// EMA coefficient of the exciter tone lowpass.
    pub exciter_lowpass_kp: f32,
    /// Impulse density of the sustain noise, per sample.
    pub noise_density: f32,
    /// Gain randomization of the sustain noise, 0..1.
    pub noise_random_gain: f32,
    /// Normalized cutoff of the sustain noise safety highpass.
    pub noise_highpass: f32,
    /// Parameters of the allpass body.
    pub allpass: SerialAllpassParams,
    /// Straight/alternating crossfade of the body tap sum.
    pub alt_sign_mix: f32,
    /// Normalized cutoff of the output safety highpass.
    pub safety_highpass: f32,
}

/// Relative delay times of the eight body stages, longest first.
/// Irrational spacing keeps the partials from lining up harmonically.
static BODY_TIME_SPREAD: [f32; 8] = [
    1.0, 0.61803, 0.43157, 0.31416, 0.27183, 0.19472, 0.14142, 0.09733,
];

/// How hard a retriggered body is ducked before the new strike.
const RETRIGGER_ATTENUATION: f32 = 0.02;

/// One voice of the polyphonic engine.
#[derive(Debug, Clone)]
pub struct Voice {
    /// Current lifecycle state.
    pub state: NoteState,
    /// External note id; -1 when free.
    pub id: i32,

    sample_rate: f32,
    velocity: f32,
    pan: f32,
    last_gain: f32,

    rng: White,
    exciter_decay: ExpDecay,
    exciter_lowpass: EmaFilter,
    sustain_noise: HalfClosedNoise,
    noise_env: ExpDsrEnvelope,
    body: SerialAllpass<8, 2>,
    envelope: ExpAdEnvelope,
    safety_highpass: Highpass2,
    release_smoother: TransitionReleaseSmoother,
    last_output: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            state: NoteState::Rest,
            id: -1,
            sample_rate: 44100.0,
            velocity: 0.0,
            pan: 0.5,
            last_gain: 0.0,
            rng: White::new(0),
            exciter_decay: ExpDecay::default(),
            exciter_lowpass: EmaFilter::default(),
            sustain_noise: HalfClosedNoise::default(),
            noise_env: ExpDsrEnvelope::default(),
            body: SerialAllpass::default(),
            envelope: ExpAdEnvelope::default(),
            safety_highpass: Highpass2::default(),
            release_smoother: TransitionReleaseSmoother::default(),
            last_output: 0.0,
        }
    }
}

impl Voice {
    /// Allocate buffers for `sample_rate`. Call before any processing.
    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        // Longest stage: one period of the lowest playable note (~10 Hz).
        self.body.setup((sample_rate / 10.0) as usize);
        self.release_smoother.setup(0.01 * sample_rate);
        self.reset();
    }

    /// Silence everything and mark the voice free.
    pub fn reset(&mut self) {
        self.state = NoteState::Rest;
        self.id = -1;
        self.velocity = 0.0;
        self.last_gain = 0.0;
        self.last_output = 0.0;
        self.exciter_decay.reset();
        self.exciter_lowpass.reset(0.0);
        self.sustain_noise.reset();
        self.noise_env.reset();
        self.body.reset();
        self.envelope.reset();
        self.safety_highpass.reset();
        self.release_smoother.reset();
    }

    /// Start a note. `seed_rng` is the engine's allocator rng, drawn from
    /// once so this voice's own sequence is independent and reproducible.
    pub fn note_on(
        &mut self,
        id: i32,
        pitch_semitones: f32,
        velocity: f32,
        pan: f32,
        params: &SynthParams,
        seed_rng: &mut White,
    ) {
        if self.state != NoteState::Rest {
            // Splice: duck the old ringing and let a short additive tail
            // cover the discontinuity.
            self.release_smoother
                .prepare(self.last_output, 0.01 * self.sample_rate);
            self.body.apply_gain(RETRIGGER_ATTENUATION);
        }

        self.rng.seed(seed_rng.next_u32());
        self.sustain_noise.seed(seed_rng.next_u32());

        self.state = NoteState::Active;
        self.id = id;
        self.velocity = velocity;
        self.pan = pan.clamp(0.0, 1.0);

        let freq = midi_to_freq(pitch_semitones);
        let base_time = self.sample_rate / freq.max(10.0);
        let max_time = self.body.max_time() as f32;
        for (time, spread) in self
            .body
            .time_in_samples
            .iter_mut()
            .zip(BODY_TIME_SPREAD.iter())
        {
            let jitter = 1.0 + params.delay_time_jitter * self.rng.process();
            *time = (base_time * spread * jitter).clamp(2.0, max_time);
        }

        self.exciter_decay
            .set_time(params.exciter_decay_seconds * self.sample_rate);
        self.exciter_decay.trigger(velocity);

        self.sustain_noise
            .set_decay(params.noise_decay_seconds * self.sample_rate);
        self.noise_env.set_time(
            params.noise_decay_seconds * self.sample_rate,
            params.noise_decay_seconds * self.sample_rate,
        );
        self.noise_env.trigger(params.noise_sustain);

        self.envelope.setup(1.0);
        self.envelope.trigger(
            self.sample_rate,
            params.envelope_peak_seconds,
            params.envelope_release_seconds,
            params.envelope_peak_gain,
            velocity,
        );
    }

    /// Note-off: stop sustaining and ring out.
    pub fn release(&mut self) {
        if self.state == NoteState::Active {
            self.state = NoteState::Release;
            self.noise_env.release();
        }
    }

    /// Force the voice silent and free.
    pub fn rest(&mut self) {
        self.state = NoteState::Rest;
        self.id = -1;
    }

    /// Current envelope level, used by the allocator to find the
    /// quietest voice.
    pub fn gain(&self) -> f32 {
        self.last_gain
    }

    /// True while the gain envelope is still rising; such voices are
    /// protected from stealing.
    pub fn is_attacking(&self) -> bool {
        self.envelope.is_attacking()
    }

    /// Render one stereo frame.
    pub fn process(&mut self, ctx: &NoteContext) -> [f32; 2] {
        if self.state == NoteState::Rest {
            return [0.0, 0.0];
        }

        let burst = self.rng.process() * self.exciter_decay.process();
        let sustain = self.sustain_noise.process(
            ctx.noise_density,
            ctx.noise_random_gain,
            ctx.noise_highpass,
        ) * self.noise_env.process();
        let excite = {
            self.exciter_lowpass.set_p(ctx.exciter_lowpass_kp);
            self.exciter_lowpass.process(burst + sustain)
        };

        self.body.process(excite, &ctx.allpass);
        let mono = self.body.sum(ctx.alt_sign_mix);

        let env = self.envelope.process();
        self.last_gain = env;

        let shaped = self.safety_highpass.process(mono * env, ctx.safety_highpass)
            + self.release_smoother.process();
        self.last_output = shaped;

        if self.state == NoteState::Release && self.envelope.is_terminated() {
            self.rest();
        }

        [shaped * (1.0 - self.pan), shaped * self.pan]
    }
}
