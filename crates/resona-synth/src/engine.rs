//! Polyphonic engine: voice allocation, parameter smoothing, and the
//! master output path.
//!
//! The engine owns up to [`MAX_VOICE`] voices, a frame-stamped MIDI
//! event queue, and one [`ExpSmoother`] per audible parameter. All
//! parameter changes funnel through [`Engine::apply_parameters`]; the
//! per-sample loop drains due MIDI events, advances the smoothers,
//! builds one [`NoteContext`] shared by every voice, and mixes the
//! voices into the stereo output.
//!
//! Voice stealing renders the victim into a short crossfade buffer
//! before it is retriggered, so a steal never clicks.

use alloc::vec;
use alloc::vec::Vec;

use resona_core::effect::Effect;
use resona_core::noise::White;
use resona_core::shaper::FoldShaper;
use resona_core::smoother::{cutoff_to_p, ExpSmoother};
use resona_network::serial_allpass::SerialAllpassParams;

use crate::voice::{NoteContext, NoteState, Voice};

/// Upper bound on polyphony.
pub const MAX_VOICE: usize = 16;

/// Length of the steal crossfade, in seconds.
const TRANSITION_SECONDS: f32 = 0.01;

/// Smoothing time applied to every smoothed parameter.
const SMOOTHING_SECONDS: f32 = 0.2;

/// How parameter values reach the smoothers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Snap; used at setup, reset, and transport jumps.
    Immediate,
    /// Glide over the smoothing time; used for live edits.
    Smooth,
}

/// A frame-stamped note event.
#[derive(Debug, Clone, Copy)]
pub struct MidiNote {
    /// True for note-on, false for note-off.
    pub is_note_on: bool,
    /// Offset into the current processing block, in samples.
    pub frame: u32,
    /// Caller-chosen id matching note-on to note-off.
    pub id: i32,
    /// MIDI note number, fractional values allowed.
    pub pitch_semitones: f32,
    /// Normalized velocity, 0..1.
    pub velocity: f32,
}

/// Full parameter set of the engine.
#[derive(Debug, Clone)]
pub struct SynthParams {
    /// Master output gain, linear.
    pub gain: f32,
    /// Seed of the engine rng; voices derive their seeds from it.
    pub seed: u32,
    /// Number of usable voices, 1..=[`MAX_VOICE`].
    pub n_voice: usize,
    /// Global pitch ratio applied inside the body delays (pitch bend).
    pub pitch_ratio: f32,
    /// Random detune of the body delay times, 0 disables.
    pub delay_time_jitter: f32,

    /// Cutoff of the exciter tone lowpass in Hz.
    pub exciter_lowpass_hz: f32,
    /// Decay time of the strike burst in seconds.
    pub exciter_decay_seconds: f32,

    /// Sustain level of the hold-noise envelope, 0 disables sustain.
    pub noise_sustain: f32,
    /// Decay/release time of the hold noise in seconds.
    pub noise_decay_seconds: f32,
    /// Impulse rate of the hold noise in Hz.
    pub noise_density_hz: f32,
    /// Gain randomization of the hold noise, 0..1.
    pub noise_random_gain: f32,
    /// Safety highpass of the hold noise in Hz.
    pub noise_highpass_hz: f32,

    /// Body high shelf crossover in Hz.
    pub high_shelf_hz: f32,
    /// Body high shelf gain, 0..1.
    pub high_shelf_gain: f32,
    /// Body low shelf crossover in Hz.
    pub low_shelf_hz: f32,
    /// Body low shelf gain, 0..1.
    pub low_shelf_gain: f32,
    /// Allpass feedback gain of the body.
    pub body_gain: f32,
    /// Self-modulation depth of the body delay times.
    pub time_mod_amount: f32,
    /// Active adaptive notches per voice, 0..=2.
    pub n_notch: usize,
    /// Notch blend, 0 bypasses.
    pub notch_mix: f32,
    /// Notch narrowness, 0.3..=0.9.
    pub notch_narrowness: f32,
    /// Straight/alternating crossfade of the body tap sum.
    pub alt_sign_mix: f32,

    /// Envelope time to peak in seconds.
    pub envelope_peak_seconds: f32,
    /// Envelope release tail in seconds.
    pub envelope_release_seconds: f32,
    /// Envelope peak level, linear.
    pub envelope_peak_gain: f32,

    /// Output safety highpass in Hz.
    pub safety_highpass_hz: f32,

    /// Enable the oversampled wave folder on the master bus.
    pub fold_enabled: bool,
    /// Folder drive.
    pub fold_gain: f32,
    /// Folder reflection blend.
    pub fold_multiply: f32,
    /// Clamp instead of folding past the first reflection.
    pub fold_hardclip: bool,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            gain: 0.5,
            seed: 0,
            n_voice: MAX_VOICE,
            pitch_ratio: 1.0,
            delay_time_jitter: 0.02,
            exciter_lowpass_hz: 4000.0,
            exciter_decay_seconds: 0.02,
            noise_sustain: 0.0,
            noise_decay_seconds: 0.1,
            noise_density_hz: 500.0,
            noise_random_gain: 0.5,
            noise_highpass_hz: 300.0,
            high_shelf_hz: 8000.0,
            high_shelf_gain: 0.85,
            low_shelf_hz: 100.0,
            low_shelf_gain: 0.95,
            body_gain: 0.98,
            time_mod_amount: 0.0,
            n_notch: 0,
            notch_mix: 0.1,
            notch_narrowness: 0.5,
            alt_sign_mix: 0.0,
            envelope_peak_seconds: 0.005,
            envelope_release_seconds: 1.0,
            envelope_peak_gain: 1.0,
            safety_highpass_hz: 20.0,
            fold_enabled: false,
            fold_gain: 1.0,
            fold_multiply: 1.0,
            fold_hardclip: true,
        }
    }
}

/// The polyphonic engine.
#[derive(Debug, Clone)]
pub struct Engine {
    sample_rate: f32,
    params: SynthParams,
    rng: White,
    voices: Vec<Voice>,
    midi_notes: Vec<MidiNote>,

    s_gain: ExpSmoother,
    s_pitch_ratio: ExpSmoother,
    s_body_gain: ExpSmoother,
    s_time_mod: ExpSmoother,
    s_notch_mix: ExpSmoother,
    s_notch_narrowness: ExpSmoother,
    s_alt_sign_mix: ExpSmoother,
    s_high_shelf_gain: ExpSmoother,
    s_low_shelf_gain: ExpSmoother,
    s_noise_density: ExpSmoother,
    s_noise_random_gain: ExpSmoother,

    // Cutoff-derived coefficients, updated on apply, not smoothed.
    exciter_lowpass_kp: f32,
    high_shelf_cut: f32,
    low_shelf_cut: f32,
    noise_highpass: f32,
    safety_highpass: f32,

    transition_buffer: Vec<[f32; 2]>,
    tr_index: usize,
    tr_stop: usize,
    is_transitioning: bool,

    fold: [FoldShaper; 2],
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            params: SynthParams::default(),
            rng: White::new(0),
            voices: Vec::new(),
            midi_notes: Vec::new(),
            s_gain: ExpSmoother::default(),
            s_pitch_ratio: ExpSmoother::default(),
            s_body_gain: ExpSmoother::default(),
            s_time_mod: ExpSmoother::default(),
            s_notch_mix: ExpSmoother::default(),
            s_notch_narrowness: ExpSmoother::default(),
            s_alt_sign_mix: ExpSmoother::default(),
            s_high_shelf_gain: ExpSmoother::default(),
            s_low_shelf_gain: ExpSmoother::default(),
            s_noise_density: ExpSmoother::default(),
            s_noise_random_gain: ExpSmoother::default(),
            exciter_lowpass_kp: 1.0,
            high_shelf_cut: 1.0,
            low_shelf_cut: 1.0,
            noise_highpass: 0.01,
            safety_highpass: 0.001,
            transition_buffer: Vec::new(),
            tr_index: 0,
            tr_stop: 0,
            is_transitioning: false,
            fold: [FoldShaper::default(), FoldShaper::default()],
        }
    }
}

impl Engine {
    /// Allocate for `sample_rate` and snap parameters. Call once before
    /// processing and again on sample-rate changes.
    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;

        self.voices.clear();
        self.voices.resize_with(MAX_VOICE, Voice::default);
        for voice in &mut self.voices {
            voice.setup(sample_rate);
        }

        let tr_len = ((TRANSITION_SECONDS * sample_rate) as usize).max(1);
        self.transition_buffer = vec![[0.0; 2]; tr_len];

        for s in self.smoothers() {
            s.set_kp_from_time(sample_rate, SMOOTHING_SECONDS);
        }

        for f in &mut self.fold {
            f.set_sample_rate(sample_rate);
        }

        let params = self.params.clone();
        self.apply_parameters(&params, ApplyMode::Immediate);
        self.reset();

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, n_voice = self.params.n_voice, "engine setup");
    }

    /// Silence everything; allocation and parameter targets stay.
    pub fn reset(&mut self) {
        self.rng.seed(self.params.seed);
        self.midi_notes.clear();
        for voice in &mut self.voices {
            voice.reset();
        }
        for frame in &mut self.transition_buffer {
            *frame = [0.0; 2];
        }
        self.tr_index = 0;
        self.tr_stop = 0;
        self.is_transitioning = false;
        for f in &mut self.fold {
            f.reset();
        }
        for s in self.smoothers() {
            let target = s.target();
            s.reset_to(target);
        }
    }

    /// Latency of the master path in samples.
    pub fn latency_samples(&self) -> usize {
        if self.params.fold_enabled {
            FoldShaper::LATENCY
        } else {
            0
        }
    }

    /// Push the full parameter set. `Immediate` snaps, `Smooth` glides.
    pub fn apply_parameters(&mut self, params: &SynthParams, mode: ApplyMode) {
        self.params = params.clone();
        let sr = self.sample_rate;

        let assign = |s: &mut ExpSmoother, v: f32| match mode {
            ApplyMode::Immediate => s.reset_to(v),
            ApplyMode::Smooth => s.push(v),
        };
        assign(&mut self.s_gain, params.gain);
        assign(&mut self.s_pitch_ratio, params.pitch_ratio.max(0.01));
        assign(&mut self.s_body_gain, params.body_gain);
        assign(&mut self.s_time_mod, params.time_mod_amount);
        assign(&mut self.s_notch_mix, params.notch_mix);
        assign(
            &mut self.s_notch_narrowness,
            params.notch_narrowness.clamp(0.3, 0.9),
        );
        assign(&mut self.s_alt_sign_mix, params.alt_sign_mix);
        assign(&mut self.s_high_shelf_gain, params.high_shelf_gain);
        assign(&mut self.s_low_shelf_gain, params.low_shelf_gain);
        assign(&mut self.s_noise_density, params.noise_density_hz / sr);
        assign(&mut self.s_noise_random_gain, params.noise_random_gain);

        self.exciter_lowpass_kp = cutoff_to_p(sr, params.exciter_lowpass_hz);
        self.high_shelf_cut = cutoff_to_p(sr, params.high_shelf_hz);
        self.low_shelf_cut = cutoff_to_p(sr, params.low_shelf_hz);
        self.noise_highpass = (params.noise_highpass_hz / sr).clamp(0.0, 0.4999);
        self.safety_highpass = (params.safety_highpass_hz / sr).clamp(0.0, 0.4999);

        for f in &mut self.fold {
            f.gain = params.fold_gain;
            f.multiply = params.fold_multiply;
            f.hardclip = params.fold_hardclip;
        }
    }

    /// Queue a note event for a frame inside the next `process` call.
    pub fn push_midi_note(&mut self, note: MidiNote) {
        self.midi_notes.push(note);
    }

    /// Start a note immediately (frame 0 of the current sample).
    ///
    /// No-op before [`setup`](Self::setup) has allocated the voices.
    pub fn note_on(&mut self, id: i32, pitch_semitones: f32, velocity: f32) {
        if self.voices.is_empty() {
            return;
        }
        let n_voice = self.params.n_voice.clamp(1, MAX_VOICE);
        let free = self.voices[..n_voice]
            .iter()
            .position(|v| v.state == NoteState::Rest);
        let idx = match free {
            Some(idx) => idx,
            None => {
                let idx = self.quietest_voice(n_voice);
                self.fill_transition_buffer(idx);
                // The buffer now owns the tail; restart the voice clean so
                // the splice is not added twice.
                self.voices[idx].reset();
                #[cfg(feature = "tracing")]
                tracing::debug!(voice = idx, note_id = id, "stealing voice");
                idx
            }
        };
        let pan = 0.5 + 0.35 * self.rng.process();
        self.voices[idx].note_on(id, pitch_semitones, velocity, pan, &self.params, &mut self.rng);
    }

    /// Release every voice holding `id`.
    pub fn note_off(&mut self, id: i32) {
        for voice in &mut self.voices {
            if voice.id == id {
                voice.release();
            }
        }
    }

    /// Render `length` samples into `out0`/`out1`. Queued MIDI events
    /// fire at their frame offsets; leftovers past `length` fire at
    /// frame 0 of the next call.
    pub fn process(&mut self, length: usize, out0: &mut [f32], out1: &mut [f32]) {
        if self.voices.is_empty() {
            // Not set up yet; deliver silence instead of indexing nothing.
            let n = length.min(out0.len()).min(out1.len());
            out0[..n].fill(0.0);
            out1[..n].fill(0.0);
            return;
        }
        let n_voice = self.params.n_voice.clamp(1, MAX_VOICE);
        for i in 0..length.min(out0.len()).min(out1.len()) {
            self.process_midi_note(i as u32);

            let ctx = self.advance_context();
            let mut frame = [0.0f32; 2];
            for voice in &mut self.voices[..n_voice] {
                let [l, r] = voice.process(&ctx);
                frame[0] += l;
                frame[1] += r;
            }

            if self.is_transitioning {
                frame[0] += self.transition_buffer[self.tr_index][0];
                frame[1] += self.transition_buffer[self.tr_index][1];
                self.transition_buffer[self.tr_index] = [0.0; 2];
                self.tr_index += 1;
                if self.tr_index >= self.transition_buffer.len() {
                    self.tr_index = 0;
                }
                if self.tr_index == self.tr_stop {
                    self.is_transitioning = false;
                }
            }

            let gain = self.s_gain.process();
            if self.params.fold_enabled {
                frame[0] = self.fold[0].process_16x(frame[0]);
                frame[1] = self.fold[1].process_16x(frame[1]);
            }
            out0[i] = gain * frame[0];
            out1[i] = gain * frame[1];
        }

        // Re-stamp stragglers so they fire first thing next block.
        for note in &mut self.midi_notes {
            note.frame = note.frame.saturating_sub(length as u32);
        }
    }

    fn smoothers(&mut self) -> [&mut ExpSmoother; 11] {
        [
            &mut self.s_gain,
            &mut self.s_pitch_ratio,
            &mut self.s_body_gain,
            &mut self.s_time_mod,
            &mut self.s_notch_mix,
            &mut self.s_notch_narrowness,
            &mut self.s_alt_sign_mix,
            &mut self.s_high_shelf_gain,
            &mut self.s_low_shelf_gain,
            &mut self.s_noise_density,
            &mut self.s_noise_random_gain,
        ]
    }

    fn process_midi_note(&mut self, frame: u32) {
        let mut i = 0;
        while i < self.midi_notes.len() {
            if self.midi_notes[i].frame == frame {
                let note = self.midi_notes.remove(i);
                if note.is_note_on {
                    self.note_on(note.id, note.pitch_semitones, note.velocity);
                } else {
                    self.note_off(note.id);
                }
            } else {
                i += 1;
            }
        }
    }

    /// Advance every smoother one sample and build the shared context.
    fn advance_context(&mut self) -> NoteContext {
        self.s_pitch_ratio.process();
        self.s_body_gain.process();
        self.s_time_mod.process();
        self.s_notch_mix.process();
        self.s_notch_narrowness.process();
        self.s_alt_sign_mix.process();
        self.s_high_shelf_gain.process();
        self.s_low_shelf_gain.process();
        self.s_noise_density.process();
        self.s_noise_random_gain.process();
        self.context_from_values()
    }

    /// Build a context from the smoothers' current values, without
    /// advancing them. Used for the steal crossfade render.
    fn context_from_values(&self) -> NoteContext {
        NoteContext {
            exciter_lowpass_kp: self.exciter_lowpass_kp,
            noise_density: self.s_noise_density.value(),
            noise_random_gain: self.s_noise_random_gain.value(),
            noise_highpass: self.noise_highpass,
            allpass: SerialAllpassParams {
                high_shelf_cut: self.high_shelf_cut,
                high_shelf_gain: self.s_high_shelf_gain.value(),
                low_shelf_cut: self.low_shelf_cut,
                low_shelf_gain: self.s_low_shelf_gain.value(),
                gain: self.s_body_gain.value(),
                pitch_ratio: self.s_pitch_ratio.value(),
                time_mod_amount: self.s_time_mod.value(),
                n_notch: self.params.n_notch,
                notch_mix: self.s_notch_mix.value(),
                notch_narrowness: self.s_notch_narrowness.value(),
            },
            alt_sign_mix: self.s_alt_sign_mix.value(),
            safety_highpass: self.safety_highpass,
        }
    }

    /// Index of the quietest voice that is not in its attack. Falls back
    /// to the overall quietest when every voice is attacking.
    fn quietest_voice(&self, n_voice: usize) -> usize {
        let mut best = usize::MAX;
        let mut best_gain = f32::INFINITY;
        for (idx, voice) in self.voices[..n_voice].iter().enumerate() {
            if voice.is_attacking() {
                continue;
            }
            if voice.gain() < best_gain {
                best_gain = voice.gain();
                best = idx;
            }
        }
        if best != usize::MAX {
            return best;
        }
        let mut best = 0;
        let mut best_gain = f32::INFINITY;
        for (idx, voice) in self.voices[..n_voice].iter().enumerate() {
            if voice.gain() < best_gain {
                best_gain = voice.gain();
                best = idx;
            }
        }
        best
    }

    /// Render the victim's tail into the crossfade buffer with a linear
    /// fade-out, added on top of whatever transition is already pending.
    fn fill_transition_buffer(&mut self, idx: usize) {
        let len = self.transition_buffer.len();
        if len == 0 {
            return;
        }
        let ctx = self.context_from_values();
        self.is_transitioning = true;
        self.tr_stop = self.tr_index;
        for offset in 0..len {
            let fade = 1.0 - offset as f32 / len as f32;
            let frame = self.voices[idx].process(&ctx);
            let pos = (self.tr_index + offset) % len;
            self.transition_buffer[pos][0] += fade * frame[0];
            self.transition_buffer[pos][1] += fade * frame[1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_engine() -> Engine {
        let mut engine = Engine::default();
        engine.setup(48000.0);
        engine
    }

    fn render(engine: &mut Engine, length: usize) -> (Vec<f32>, Vec<f32>) {
        let mut out0 = vec![0.0; length];
        let mut out1 = vec![0.0; length];
        engine.process(length, &mut out0, &mut out1);
        (out0, out1)
    }

    #[test]
    fn usable_before_setup_without_panicking() {
        let mut engine = Engine::default();
        engine.note_on(1, 60.0, 0.8);
        let mut out0 = [1.0f32; 64];
        let mut out1 = [1.0f32; 64];
        engine.process(64, &mut out0, &mut out1);
        assert!(out0.iter().all(|&x| x == 0.0));
        assert!(out1.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn silent_without_notes() {
        let mut engine = ready_engine();
        let (out0, out1) = render(&mut engine, 512);
        assert!(out0.iter().all(|&x| x == 0.0));
        assert!(out1.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn note_on_produces_sound() {
        let mut engine = ready_engine();
        engine.note_on(1, 60.0, 0.8);
        let (out0, out1) = render(&mut engine, 4800);
        let peak = out0
            .iter()
            .chain(out1.iter())
            .fold(0.0f32, |m, &x| m.max(x.abs()));
        assert!(peak > 1e-5, "engine is silent");
        assert!(peak.is_finite());
    }

    #[test]
    fn midi_note_fires_at_frame_offset() {
        let mut engine = ready_engine();
        engine.push_midi_note(MidiNote {
            is_note_on: true,
            frame: 100,
            id: 3,
            pitch_semitones: 64.0,
            velocity: 0.9,
        });
        let (out0, out1) = render(&mut engine, 512);
        assert!(out0[..100].iter().all(|&x| x == 0.0));
        assert!(out1[..100].iter().all(|&x| x == 0.0));
        let after: f32 = out0[100..]
            .iter()
            .chain(out1[100..].iter())
            .map(|x| x.abs())
            .sum();
        assert!(after > 0.0);
    }

    #[test]
    fn midi_note_past_block_carries_over() {
        let mut engine = ready_engine();
        engine.push_midi_note(MidiNote {
            is_note_on: true,
            frame: 600,
            id: 3,
            pitch_semitones: 64.0,
            velocity: 0.9,
        });
        let (out0, _) = render(&mut engine, 512);
        assert!(out0.iter().all(|&x| x == 0.0));
        // The event was re-stamped to frame 88 of the next block.
        let (out0, _) = render(&mut engine, 512);
        assert!(out0[..88].iter().all(|&x| x == 0.0));
        assert!(out0[88..].iter().map(|x| x.abs()).sum::<f32>() > 0.0);
    }

    #[test]
    fn note_off_releases_matching_id() {
        let mut engine = ready_engine();
        engine.note_on(7, 60.0, 0.8);
        render(&mut engine, 256);
        engine.note_off(7);
        assert_eq!(engine.voices[0].state, NoteState::Release);
    }

    #[test]
    fn steal_prefers_quietest_voice() {
        let mut engine = ready_engine();
        let params = SynthParams {
            n_voice: 2,
            envelope_peak_seconds: 0.001,
            envelope_release_seconds: 0.05,
            ..SynthParams::default()
        };
        engine.apply_parameters(&params, ApplyMode::Immediate);

        // Voice 0 decays for 0.1 s while voice 1 is near its peak.
        engine.note_on(1, 60.0, 1.0);
        render(&mut engine, 4800);
        engine.note_on(2, 64.0, 1.0);
        render(&mut engine, 480);
        assert!(engine.voices[0].gain() < engine.voices[1].gain());

        engine.note_on(3, 67.0, 1.0);
        assert_eq!(engine.voices[0].id, 3, "quietest voice was not stolen");
        assert_eq!(engine.voices[1].id, 2);
    }

    #[test]
    fn steal_fills_transition_buffer() {
        let mut engine = ready_engine();
        let params = SynthParams {
            n_voice: 1,
            ..SynthParams::default()
        };
        engine.apply_parameters(&params, ApplyMode::Immediate);
        engine.note_on(1, 48.0, 1.0);
        render(&mut engine, 9600);
        engine.note_on(2, 52.0, 1.0);
        assert!(engine.is_transitioning);
        let energy: f32 = engine
            .transition_buffer
            .iter()
            .map(|f| f[0].abs() + f[1].abs())
            .sum();
        assert!(energy > 0.0, "transition buffer is empty");
        let len = engine.transition_buffer.len();
        render(&mut engine, len);
        assert!(!engine.is_transitioning);
    }

    #[test]
    fn reset_silences_and_is_repeatable() {
        let mut engine = ready_engine();
        engine.note_on(1, 60.0, 0.8);
        render(&mut engine, 1024);
        engine.reset();
        let (out0, out1) = render(&mut engine, 512);
        assert!(out0.iter().all(|&x| x == 0.0));
        assert!(out1.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn double_reset_matches_single_reset() {
        let run = |resets: usize| {
            let mut engine = ready_engine();
            engine.note_on(1, 60.0, 0.8);
            render(&mut engine, 512);
            for _ in 0..resets {
                engine.reset();
            }
            engine.note_on(2, 64.0, 0.6);
            render(&mut engine, 512)
        };
        assert_eq!(run(1), run(2));
    }

    #[test]
    fn same_seed_renders_identically() {
        let run = || {
            let mut engine = ready_engine();
            engine.note_on(1, 60.0, 0.8);
            render(&mut engine, 1024).0
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn fold_latency_reported() {
        let mut engine = ready_engine();
        assert_eq!(engine.latency_samples(), 0);
        let params = SynthParams {
            fold_enabled: true,
            ..SynthParams::default()
        };
        engine.apply_parameters(&params, ApplyMode::Immediate);
        assert_eq!(engine.latency_samples(), FoldShaper::LATENCY);
    }

    #[test]
    fn smooth_apply_glides_gain() {
        let mut engine = ready_engine();
        let params = SynthParams {
            gain: 1.0,
            ..SynthParams::default()
        };
        engine.apply_parameters(&params, ApplyMode::Smooth);
        // Value moves toward the target but does not jump.
        assert!((engine.s_gain.value() - 0.5).abs() < 1e-6);
        render(&mut engine, 4800);
        let v = engine.s_gain.value();
        assert!(v > 0.5 && v < 1.0, "gain did not glide: {}", v);
    }
}
