//! Resona Synth - the polyphonic percussion synthesizer.
//!
//! Ties the `resona-core` primitives and `resona-network` resonators
//! into a playable instrument:
//!
//! - [`Engine`] - voice allocation, frame-stamped MIDI queue, parameter
//!   smoothing, master wave folder
//! - [`Voice`] - stochastic excitation into a serial-allpass body with
//!   an attack-decay gain envelope
//! - [`envelope`] - the exponential envelope family, including the
//!   Lambert-W derived attack-decay envelope
//!
//! Hosts drive it with [`Engine::setup`], [`Engine::apply_parameters`],
//! [`Engine::push_midi_note`], and [`Engine::process`]. Rendering is
//! deterministic for a given seed and event sequence.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod engine;
pub mod envelope;
pub mod voice;

pub use engine::{ApplyMode, Engine, MidiNote, SynthParams, MAX_VOICE};
pub use envelope::{ExpAdEnvelope, ExpDecay, ExpDsrEnvelope, TransitionReleaseSmoother};
pub use voice::{midi_to_freq, semitone_ratio, NoteContext, NoteState, Voice};
