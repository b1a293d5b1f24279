//! Fractional delay line with 3rd-order Lagrange interpolation.
//!
//! [`Delay`] is the building block of the resonator networks: a circular
//! buffer written one sample ahead of the read taps, read back at a
//! possibly fractional delay through [`lagrange3_interp`]. Out-of-range
//! delay times are clamped silently, so a self-modulated time can swing
//! past the buffer edges without faulting.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// 3rd-order Lagrange interpolation in divided-difference form.
///
/// `t` in [0, 1] interpolates between `y1` (t = 0 reads one sample past
/// `y0`) and `y2`; `y0` and `y3` are the outer support points.
#[inline]
pub fn lagrange3_interp(y0: f32, y1: f32, y2: f32, y3: f32, t: f32) -> f32 {
    let u = 1.0 + t;
    let d0 = y0 - y1;
    let d1 = d0 - (y1 - y2);
    let d2 = d1 - ((y1 - y2) - (y2 - y3));
    y0 - u * (d0 + (1.0 - u) / 2.0 * (d1 + (2.0 - u) / 3.0 * d2))
}

/// Circular-buffer delay with fractional read.
///
/// `process(input, time_in_samples)` delays by `time_in_samples` exactly
/// (including the fraction) for times in `[2, len - 3]`; outside that the
/// time is clamped. The write pointer advances before the write, so a
/// time of 0 can never read the sample being written.
#[derive(Debug, Clone)]
pub struct Delay {
    wptr: usize,
    buf: Vec<f32>,
}

impl Default for Delay {
    fn default() -> Self {
        let mut d = Self {
            wptr: 0,
            buf: Vec::new(),
        };
        d.setup(1);
        d
    }
}

impl Delay {
    /// Allocate for a maximum delay of `max_time_samples`. Also clears.
    ///
    /// This is the only allocating call; do it at initialization, not in
    /// the audio path.
    pub fn setup(&mut self, max_time_samples: usize) {
        self.buf.clear();
        self.buf.resize(max_time_samples.max(1) + 4, 0.0);
        self.wptr = 0;
    }

    /// Zero the buffer without reallocating.
    pub fn reset(&mut self) {
        self.buf.fill(0.0);
    }

    /// Scale everything currently in the buffer.
    ///
    /// Used to duck a resonator's ringing when its voice is stolen.
    pub fn apply_gain(&mut self, gain: f32) {
        for x in &mut self.buf {
            *x *= gain;
        }
    }

    /// Maximum usable delay time in samples.
    pub fn max_time(&self) -> usize {
        self.buf.len().saturating_sub(4)
    }

    /// Write `input`, read back `time_in_samples` behind it.
    #[inline]
    pub fn process(&mut self, input: f32, time_in_samples: f32) -> f32 {
        let size = self.buf.len() as i32;

        let clamped = (time_in_samples - 1.0).clamp(1.0, (size - 4) as f32);
        let time_int = clamped as i32;
        let fraction = clamped - time_int as f32;

        self.wptr += 1;
        if self.wptr >= self.buf.len() {
            self.wptr = 0;
        }
        self.buf[self.wptr] = input;

        let mut r0 = self.wptr as i32 - time_int;
        let mut r1 = r0 - 1;
        let mut r2 = r0 - 2;
        let mut r3 = r0 - 3;
        if r0 < 0 {
            r0 += size;
        }
        if r1 < 0 {
            r1 += size;
        }
        if r2 < 0 {
            r2 += size;
        }
        if r3 < 0 {
            r3 += size;
        }
        lagrange3_interp(
            self.buf[r0 as usize],
            self.buf[r1 as usize],
            self.buf[r2 as usize],
            self.buf[r3 as usize],
            fraction,
        )
    }
}
