//! Resona Core - DSP primitives for resonator synthesis
//!
//! This crate provides the foundational building blocks shared by the
//! resona workspace, designed for real-time audio processing with zero
//! allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for all audio processors
//!
//! ## Smoothing
//!
//! - [`EmaFilter`] - One-state exponential moving average
//! - [`ExpSmoother`] - Value/target parameter smoother with per-instance
//!   coefficient
//!
//! ## Filters
//!
//! - [`Lp1`] / [`Hp1`] - Bilinear one-pole low/highpass
//! - [`Svf`] - TPT state-variable filter, response picked by [`SvfKind`]
//!
//! ## Delay
//!
//! - [`Delay`] - Fractional delay with 3rd-order Lagrange interpolation
//!
//! ## Multirate / Anti-Aliasing
//!
//! - [`FirUpSampler16`] - 16-phase polyphase FIR upsampler
//! - [`DecimationLowpass`], [`HalfBandIir`] - decimation filters
//! - [`Decimator8`] / [`Decimator16`] / [`Decimator64`] - composed
//!   frame-to-sample decimators
//! - [`FoldShaper`] - wave folder with 16× oversampled processing
//!
//! ## Utilities
//!
//! - [`White`] - seedable LCG noise
//! - [`safe_clip`], [`flush_denormal`], [`lerp`], dB conversions
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded audio applications.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! resona-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod delay;
pub mod effect;
pub mod math;
pub mod multirate;
pub mod noise;
pub mod one_pole;
pub mod shaper;
pub mod smoother;
pub mod svf;

// Re-export main types at crate root
pub use delay::{Delay, lagrange3_interp};
pub use effect::Effect;
pub use math::{SAFE_CLIP_BOUND, db_to_linear, flush_denormal, lerp, linear_to_db, safe_clip};
pub use multirate::{
    Decimator8, Decimator16, Decimator64, DecimationLowpass, FirUpSampler16, HalfBandIir,
    SOS_8_FOLD, SOS_16_FOLD, SOS_64_FOLD,
};
pub use noise::White;
pub use one_pole::{Hp1, Lp1, MAX_CUTOFF, MIN_CUTOFF};
pub use shaper::FoldShaper;
pub use smoother::{EmaFilter, ExpSmoother, cutoff_to_p};
pub use svf::{Svf, SvfKind};
