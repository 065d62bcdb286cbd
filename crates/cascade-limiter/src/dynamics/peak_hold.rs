// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cascaded peak-hold sections.
//!
//! A single peak-holder holds a detected peak for its full hold period and
//! is blind to smaller peaks arriving inside that window. Cascading
//! `STAGES` sections, each holding for `1/STAGES` of the period, keeps the
//! rising edge of the composite envelope while still surfacing secondary
//! peaks at the later stages. More stages reduce staircase artefacts at
//! the cost of latency.

use crate::consts::DEFAULT_SAMPLE_RATE;
use crate::sample::Sample;

/// Series cascade of `STAGES` peak-hold sections.
///
/// Each section outputs the most recent local maximum of its input and
/// holds it for `hold_time / STAGES` seconds; a new peak (input at or above
/// the held value) or a timer expiry restarts the hold. The cascade output
/// approximates the maximum of the input over the trailing hold window.
///
/// # Examples
/// ```
/// use cascade_limiter::dynamics::peak_hold::PeakHoldCascade;
///
/// let mut holder = PeakHoldCascade::<f32, 8>::new();
/// holder.set_sample_rate(48000.0);
/// holder.set_hold_time(0.01);
///
/// let input = vec![0.0f32, 0.9, 0.1, -0.4, 0.0, 0.2];
/// let mut envelope = vec![0.0f32; 6];
/// holder.process(&mut envelope, &input);
/// ```
#[derive(Debug, Clone)]
pub struct PeakHoldCascade<R, const STAGES: usize> {
    sample_rate: R,
    hold_time: R,
    /// Hold period of each section in samples.
    hold_samples: usize,
    /// Samples elapsed since the last peak, per section.
    timer: [usize; STAGES],
    /// Last held peak, per section.
    output: [R; STAGES],
}

impl<R: Sample, const STAGES: usize> Default for PeakHoldCascade<R, STAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Sample, const STAGES: usize> PeakHoldCascade<R, STAGES> {
    /// Create a new cascade with zero hold time at the default sample rate.
    pub fn new() -> Self {
        Self {
            sample_rate: R::from_f64(DEFAULT_SAMPLE_RATE),
            hold_time: R::zero(),
            hold_samples: 0,
            timer: [0; STAGES],
            output: [R::zero(); STAGES],
        }
    }

    /// Set the sample rate in Hz and rebuild the per-section hold period.
    pub fn set_sample_rate(&mut self, sr: R) {
        debug_assert!(sr > R::zero() && sr.is_finite());
        self.sample_rate = sr.max(R::min_positive_value());
        self.update_hold_samples();
    }

    /// Set the total hold time in seconds.
    pub fn set_hold_time(&mut self, hold_time: R) {
        debug_assert!(hold_time >= R::zero() && hold_time.is_finite());
        self.hold_time = hold_time.max(R::zero());
        self.update_hold_samples();
    }

    /// Get the configured sample rate in Hz.
    pub fn sample_rate(&self) -> R {
        self.sample_rate
    }

    /// Get the configured total hold time in seconds.
    pub fn hold_time(&self) -> R {
        self.hold_time
    }

    /// Get the per-section hold period in samples.
    pub fn hold_samples(&self) -> usize {
        self.hold_samples
    }

    /// Zero all timers and held peaks.
    pub fn reset(&mut self) {
        self.timer = [0; STAGES];
        self.output = [R::zero(); STAGES];
    }

    fn update_hold_samples(&mut self) {
        self.hold_samples =
            (self.hold_time / R::from_usize(STAGES) * self.sample_rate).round_usize();
    }

    /// Process a single sample, returning the cascaded peak envelope.
    #[inline]
    pub fn process_sample(&mut self, x: R) -> R {
        let mut input = x.abs();
        for stage in 0..STAGES {
            // Release on a new peak or a timer expiry; hold otherwise.
            let is_new_peak = input >= self.output[stage];
            let is_timeout = self.timer[stage] >= self.hold_samples;
            if is_new_peak || is_timeout {
                self.output[stage] = input;
                self.timer[stage] = 0;
            } else {
                self.timer[stage] += 1;
            }
            input = self.output[stage];
        }
        self.output[STAGES - 1]
    }

    /// Process a block of samples.
    ///
    /// # Arguments
    /// * `dst` - Output envelope buffer
    /// * `src` - Input buffer, same length as `dst`
    pub fn process(&mut self, dst: &mut [R], src: &[R]) {
        assert_eq!(dst.len(), src.len());
        for (d, &s) in dst.iter_mut().zip(src.iter()) {
            *d = self.process_sample(s);
        }
    }

    /// Process a block of samples in place.
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
    fn test_hold_samples_rounding() {
        let mut holder = PeakHoldCascade::<f64, 8>::new();
        holder.set_sample_rate(48000.0);
        holder.set_hold_time(0.01);
        // 0.01 / 8 * 48000 = 60
        assert_eq!(holder.hold_samples(), 60);

        holder.set_hold_time(0.008);
        assert_eq!(holder.hold_samples(), 48);
    }

    #[test]
    fn test_tracks_rising_input() {
        let mut holder = PeakHoldCascade::<f64, 4>::new();
        holder.set_sample_rate(48000.0);
        holder.set_hold_time(0.01);

        // A new peak propagates through every section within one sample.
        assert_eq!(holder.process_sample(0.3), 0.3);
        assert_eq!(holder.process_sample(0.5), 0.5);
        assert_eq!(holder.process_sample(-0.9), 0.9);
    }

    #[test]
    fn test_holds_peak_after_input_drops() {
        let mut holder = PeakHoldCascade::<f64, 8>::new();
        holder.set_sample_rate(48000.0);
        holder.set_hold_time(0.001); // 6 samples per section, 48 total
        let per_stage = holder.hold_samples();
        assert_eq!(per_stage, 6);

        for _ in 0..100 {
            assert_eq!(holder.process_sample(1.0), 1.0);
        }

        // After the input drops, the cascade keeps the peak alive for the
        // full hold window (sections expire one after another).
        let total_hold = per_stage * 8;
        for n in 0..total_hold {
            assert_eq!(holder.process_sample(0.0), 1.0, "dropped early at {n}");
        }
        assert_eq!(holder.process_sample(0.0), 0.0);
    }

    #[test]
    fn test_secondary_peak_recovery() {
        // An impulse followed by a smaller impulse inside the hold window:
        // the later sections surface the secondary peak once the primary
        // hold expires, instead of collapsing straight to zero.
        let mut holder = PeakHoldCascade::<f64, 8>::new();
        holder.set_sample_rate(48000.0);
        holder.set_hold_time(0.008); // 48 samples per section

        let mut input = vec![0.0f64; 600];
        input[0] = 1.0;
        input[96] = 0.5; // 0.002 s later
        let mut envelope = vec![0.0f64; 600];
        holder.process(&mut envelope, &input);

        // 0.004 s after the second impulse the envelope still covers it.
        assert!(envelope[288] >= 0.5);
        // Once the primary peak has expired the secondary one is exposed.
        assert_eq!(envelope[400], 0.5);
        // And eventually everything expires.
        assert_eq!(envelope[599], 0.0);
    }

    #[test]
    fn test_zero_hold_follows_absolute_value() {
        let mut holder = PeakHoldCascade::<f32, 8>::new();
        holder.set_sample_rate(48000.0);
        holder.set_hold_time(0.0);

        // With no hold period every sample times out immediately.
        let input = [0.5f32, -0.25, 0.1, -0.9, 0.0];
        for &x in &input {
            assert_eq!(holder.process_sample(x), x.abs());
        }
    }

    #[test]
    fn test_reset_clears_all_sections() {
        let mut holder = PeakHoldCascade::<f64, 8>::new();
        holder.set_sample_rate(48000.0);
        holder.set_hold_time(0.01);
        for _ in 0..32 {
            holder.process_sample(0.8);
        }

        holder.reset();
        assert!(holder.output.iter().all(|&v| v == 0.0));
        assert!(holder.timer.iter().all(|&t| t == 0));
        assert_eq!(holder.process_sample(0.0), 0.0);
    }
}
