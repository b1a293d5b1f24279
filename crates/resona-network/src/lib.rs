//! Resona Network - modal and resonant delay structures
//!
//! Builds the resonating "bodies" of the synth out of the primitives in
//! `resona-core`:
//!
//! - [`SerialAllpass`] - chain of self-modulated allpass delays with
//!   per-stage shelving, the metallic resonator
//! - [`AdaptiveNotch`] - LMS-adapted notch that tames the dominant mode
//! - [`FeedbackDelayNetwork`] - Householder-coupled delay lines with an
//!   energy guard, the diffuse tail
//! - [`HalfClosedNoise`] - stochastic impulse-train excitation
//! - [`EmaHighShelf`] / [`EmaLowShelf`] / [`Highpass2`] - the small
//!   filters those structures are built from
//!
//! Everything is allocation-free after `setup` and `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod adaptive_notch;
pub mod excitation;
pub mod fdn;
pub mod serial_allpass;

pub use adaptive_notch::AdaptiveNotch;
pub use excitation::HalfClosedNoise;
pub use fdn::FeedbackDelayNetwork;
pub use serial_allpass::{EmaHighShelf, EmaLowShelf, Highpass2, SerialAllpass, SerialAllpassParams};
