//! Core Effect trait.
//!
//! The [`Effect`] trait is the foundation of the DSP framework. All audio
//! processors implement this trait, providing a consistent interface for
//! single-sample and block-based processing.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: Single `f32` input/output. Stereo processors are
//!   built from two mono instances or expose their own stereo entry points.
//!
//! - **Object-safe**: The trait allows `dyn Effect` for runtime dispatch.
//!   Generic/static dispatch is preferred for maximum performance.
//!
//! - **No allocations**: All methods are designed to be called in real-time
//!   audio contexts with zero heap allocations.

/// Core trait for all audio processors.
///
/// Processors consume audio samples, either one at a time or in blocks.
/// The trait is designed to be object-safe while supporting efficient
/// static dispatch when used with generics.
pub trait Effect {
    /// Process a single sample.
    ///
    /// This is the core processing function. For processors with internal
    /// state (filters, delays, etc.), this advances the state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// Default implementation calls `process()` for each sample.
    ///
    /// # Panics
    /// Default implementation panics in debug builds if
    /// `input.len() != output.len()`.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in-place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate.
    ///
    /// Called when the sample rate changes. Processors should recalculate
    /// any sample-rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Reset internal state.
    ///
    /// Clears all internal state (delay lines, filter history, etc.)
    /// without changing parameters.
    fn reset(&mut self);

    /// Report processing latency in samples.
    ///
    /// Most processors have zero latency; oversampled nonlinearities with
    /// linear-phase upsamplers are the exception here.
    fn latency_samples(&self) -> usize {
        0
    }
}
