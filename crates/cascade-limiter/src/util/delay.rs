// SPDX-License-Identifier: LGPL-3.0-or-later

//! Crossfading dual-tap delay line.
//!
//! Implements a mono delay line designed for click-free and Doppler-free
//! delay changes:
//! - One circular buffer shared by two integer read taps
//! - Fixed-width `u16` heads whose natural wrap-around provides the
//!   modular indexing (capacity is the full head space, 65536 samples)
//! - A linear crossfade between the two taps; a requested delay is adopted
//!   by the inactive tap and faded in, so the audible delay never slews
//!   through fractional values and never pitch-shifts the signal
//!
//! While a crossfade is in progress neither tap delay changes; a new
//! target is latched and takes effect once the transition completes.

use crate::sample::Sample;

/// Buffer capacity in samples: the full `u16` head space.
pub const CAPACITY: usize = 1 << 16;

/// Default crossfade length in samples.
const DEFAULT_INTERP_TIME: usize = 1024;

/// Crossfading dual-tap delay line.
///
/// The write head advances once per sample; the two read heads trail it by
/// `lower_delay` and `upper_delay` samples. The output is the linear blend
/// of the two taps at the current crossfade position. Requesting a new
/// delay while the crossfade sits at either endpoint starts a transition
/// towards the opposite tap, which has been retargeted to the new delay.
///
/// # Examples
/// ```
/// use cascade_limiter::util::delay::SmoothDelay;
///
/// let mut delay = SmoothDelay::<f32>::new();
/// delay.set_delay(100);
/// delay.set_interpolation_time(1000);
///
/// let input = vec![1.0f32; 64];
/// let mut output = vec![0.0f32; 64];
/// delay.process(&mut output, &input);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothDelay<R> {
    /// Circular buffer storage, shared by both taps.
    buffer: Vec<R>,
    /// Write head.
    write: u16,
    /// Read head of the lower tap (`write - lower_delay`).
    lower_read: u16,
    /// Read head of the upper tap (`write - upper_delay`).
    upper_read: u16,
    /// Requested delay, adopted by the inactive tap at the next endpoint.
    target_delay: u16,
    /// Current delay of the lower tap in samples.
    lower_delay: u16,
    /// Current delay of the upper tap in samples.
    upper_delay: u16,
    /// Crossfade length in samples.
    interp_time: usize,
    /// Per-sample crossfade increment magnitude (`1 / interp_time`).
    interp_step: R,
    /// Crossfade position in [0, 1]; 0 = lower tap only, 1 = upper tap only.
    interpolation: R,
    /// Signed crossfade rate currently in effect.
    increment: R,
}

impl<R: Sample> Default for SmoothDelay<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Sample> SmoothDelay<R> {
    /// Create a new delay line with zero delay and a cleared buffer.
    pub fn new() -> Self {
        let interp_step = R::one() / R::from_usize(DEFAULT_INTERP_TIME);
        Self {
            buffer: vec![R::zero(); CAPACITY],
            write: 0,
            lower_read: 0,
            upper_read: 0,
            target_delay: 0,
            lower_delay: 0,
            upper_delay: 0,
            interp_time: DEFAULT_INTERP_TIME,
            interp_step,
            interpolation: R::zero(),
            increment: interp_step,
        }
    }

    /// Request a new delay in samples.
    ///
    /// The delay must be below [`CAPACITY`]; out-of-range requests are
    /// clamped. The new value is latched and becomes the inactive tap's
    /// delay when the current crossfade (if any) reaches an endpoint.
    ///
    /// # Arguments
    /// * `delay` - Delay in samples, `0 <= delay < CAPACITY`
    pub fn set_delay(&mut self, delay: usize) {
        debug_assert!(delay < CAPACITY, "delay {delay} exceeds capacity");
        self.target_delay = delay.min(CAPACITY - 1) as u16;
    }

    /// Set the crossfade length in samples.
    ///
    /// An in-flight crossfade keeps its current rate; the new length
    /// applies from the next transition.
    ///
    /// # Arguments
    /// * `time` - Crossfade length in samples, at least 1
    pub fn set_interpolation_time(&mut self, time: usize) {
        debug_assert!(time >= 1, "interpolation time must be at least 1 sample");
        let time = time.max(1);
        self.interp_time = time;
        self.interp_step = R::one() / R::from_usize(time);
    }

    /// Get the requested delay in samples.
    pub fn delay(&self) -> usize {
        self.target_delay as usize
    }

    /// Get the crossfade length in samples.
    pub fn interpolation_time(&self) -> usize {
        self.interp_time
    }

    /// Clear the buffer and return heads and crossfade to the initial state.
    ///
    /// The requested delay and interpolation time are configuration and
    /// survive a reset.
    pub fn reset(&mut self) {
        self.buffer.fill(R::zero());
        self.write = 0;
        self.lower_read = 0;
        self.upper_read = 0;
        self.lower_delay = 0;
        self.upper_delay = 0;
        self.interpolation = R::zero();
        self.increment = self.interp_step;
    }

    /// Process a single sample through the delay line.
    ///
    /// # Arguments
    /// * `x` - Input sample
    ///
    /// # Returns
    /// The crossfaded blend of the two delay taps
    #[inline]
    pub fn process_sample(&mut self, x: R) -> R {
        self.buffer[self.write as usize] = x;

        // A transition may start only at an endpoint; the inactive tap
        // adopts the latched target, and the crossfade rate flips towards it.
        let at_lower = self.interpolation == R::zero();
        let at_upper = self.interpolation == R::one();
        if at_upper && self.target_delay != self.upper_delay {
            self.increment = -self.interp_step;
            self.lower_delay = self.target_delay;
        } else if at_lower && self.target_delay != self.lower_delay {
            self.increment = self.interp_step;
            self.upper_delay = self.target_delay;
        }

        // Unsigned wrap-around does the modular arithmetic.
        self.lower_read = self.write.wrapping_sub(self.lower_delay);
        self.upper_read = self.write.wrapping_sub(self.upper_delay);
        self.write = self.write.wrapping_add(1);

        self.interpolation = (self.interpolation + self.increment)
            .max(R::zero())
            .min(R::one());

        let lower = self.buffer[self.lower_read as usize];
        let upper = self.buffer[self.upper_read as usize];
        lower + self.interpolation * (upper - lower)
    }

    /// Process a block of samples.
    ///
    /// # Arguments
    /// * `dst` - Output buffer
    /// * `src` - Input buffer, same length as `dst`
    pub fn process(&mut self, dst: &mut [R], src: &[R]) {
        assert_eq!(dst.len(), src.len());
        for (d, &s) in dst.iter_mut().zip(src.iter()) {
            *d = self.process_sample(s);
        }
    }

    /// Process a block of samples in place.
    ///
    /// # Arguments
    /// * `buf` - Buffer used as both input and output
    pub fn process_in_place(&mut self, buf: &mut [R]) {
        for s in buf.iter_mut() {
            *s = self.process_sample(*s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let delay = SmoothDelay::<f64>::new();
        assert_eq!(delay.buffer.len(), CAPACITY);
        assert_eq!(delay.delay(), 0);
        assert_eq!(delay.interpolation_time(), DEFAULT_INTERP_TIME);
        assert_eq!(delay.interpolation, 0.0);
    }

    #[test]
    fn test_exact_integer_delay() {
        let mut delay = SmoothDelay::<f64>::new();
        delay.set_delay(4);
        delay.set_interpolation_time(1);

        // With a one-sample crossfade the upper tap is active from the
        // second sample on, so the line settles to an exact 4-sample delay
        // immediately.
        for i in 0..64i64 {
            let y = delay.process_sample(i as f64);
            if i >= 4 {
                assert_eq!(y, (i - 4) as f64, "wrong sample at {i}");
            } else {
                assert_eq!(y, 0.0, "expected initial zeros at {i}");
            }
        }
    }

    #[test]
    fn test_delay_exact_after_head_wrap() {
        let mut delay = SmoothDelay::<f32>::new();
        delay.set_delay(10);
        delay.set_interpolation_time(1);

        // Run for more than the full head space to cross the u16 wrap.
        for i in 0..(CAPACITY + 500) {
            let y = delay.process_sample(i as f32);
            if i >= 20 {
                assert_eq!(y, (i - 10) as f32, "wrong sample after wrap at {i}");
            }
        }
    }

    #[test]
    fn test_set_delay_clamps_to_capacity() {
        let mut delay = SmoothDelay::<f32>::new();
        // Out of range in release builds clamps to the largest legal delay.
        if cfg!(not(debug_assertions)) {
            delay.set_delay(CAPACITY + 123);
            assert_eq!(delay.delay(), CAPACITY - 1);
        }
    }

    #[test]
    fn test_crossfade_interlock() {
        let mut delay = SmoothDelay::<f64>::new();
        delay.set_delay(10);
        delay.set_interpolation_time(100);

        // Starts an upward transition towards delay 10.
        delay.process_sample(0.0);
        assert_eq!(delay.upper_delay, 10);
        assert!(delay.interpolation > 0.0 && delay.interpolation < 1.0);

        // Retarget mid-crossfade: taps must not move until the endpoint.
        delay.set_delay(20);
        for _ in 0..50 {
            delay.process_sample(0.0);
            assert_eq!(delay.lower_delay, 0);
            assert_eq!(delay.upper_delay, 10);
        }

        // Finish the crossfade: the transition spans 100 samples in total,
        // and 51 of them have already elapsed.
        for _ in 0..49 {
            delay.process_sample(0.0);
        }
        assert_eq!(delay.interpolation, 1.0);
        assert_eq!(delay.lower_delay, 0);

        // The next sample latches the new target into the (now inactive)
        // lower tap and fades back down.
        delay.process_sample(0.0);
        assert_eq!(delay.lower_delay, 20);
        assert_eq!(delay.upper_delay, 10);
    }

    #[test]
    fn test_glitchless_delay_change() {
        let sr = 48000.0f64;
        let freq = 220.0f64;
        let mut delay = SmoothDelay::<f64>::new();
        delay.set_delay(100);
        delay.set_interpolation_time(1000);

        let sine =
            |n: usize| (std::f64::consts::TAU * freq * n as f64 / sr).sin();

        let mut prev = 0.0f64;
        for n in 0..6000 {
            if n == 1000 {
                delay.set_delay(500);
            }
            let y = delay.process_sample(sine(n));
            if n > 0 {
                // Bounded by the sine slope plus the crossfade slope; a
                // discontinuity at a transition boundary would exceed this
                // by orders of magnitude.
                let diff = (y - prev).abs();
                assert!(diff < 0.05, "discontinuity at sample {n}: {diff}");
            }
            prev = y;
        }
        assert_eq!(delay.delay(), 500);
    }

    #[test]
    fn test_blend_stays_within_tap_range() {
        let mut delay = SmoothDelay::<f64>::new();
        delay.set_delay(300);
        delay.set_interpolation_time(64);

        for n in 0..2000 {
            let x = if n % 2 == 0 { 1.0 } else { -1.0 };
            let y = delay.process_sample(x);
            assert!((-1.0..=1.0).contains(&y), "blend escaped tap range: {y}");
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut delay = SmoothDelay::<f64>::new();
        delay.set_delay(50);
        delay.set_interpolation_time(10);
        for i in 0..500 {
            delay.process_sample(i as f64);
        }

        delay.reset();
        assert!(delay.buffer.iter().all(|&v| v == 0.0));
        assert_eq!(delay.write, 0);
        assert_eq!(delay.lower_delay, 0);
        assert_eq!(delay.upper_delay, 0);
        assert_eq!(delay.interpolation, 0.0);
        // Configuration survives.
        assert_eq!(delay.delay(), 50);
        assert_eq!(delay.interpolation_time(), 10);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut a = SmoothDelay::<f32>::new();
        a.set_delay(7);
        for i in 0..100 {
            a.process_sample(i as f32);
        }
        a.reset();
        let mut b = a.clone();
        b.reset();

        for i in 0..200 {
            assert_eq!(a.process_sample(i as f32), b.process_sample(i as f32));
        }
    }
}
