// SPDX-License-Identifier: LGPL-3.0-or-later

//! Sine oscillator.
//!
//! A minimal phase-accumulator sine source for test signals. The phasor
//! wraps in [0, 1) and is advanced by `frequency / sample_rate` per sample.

use crate::consts::DEFAULT_SAMPLE_RATE;
use crate::sample::Sample;

/// Phase-accumulator sine oscillator.
///
/// # Examples
/// ```
/// use cascade_limiter::util::oscillator::Oscillator;
///
/// let mut osc = Oscillator::<f32>::new();
/// osc.set_sample_rate(48000.0);
/// osc.set_frequency(1000.0);
///
/// let mut buf = vec![0.0f32; 480];
/// osc.process(&mut buf);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator<R> {
    sample_rate: R,
    frequency: R,
    phasor: R,
    increment: R,
}

impl<R: Sample> Default for Oscillator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Sample> Oscillator<R> {
    /// Default frequency (Hz).
    const DEFAULT_FREQ: f64 = 1000.0;

    /// Create a new oscillator at 1 kHz and the default sample rate.
    pub fn new() -> Self {
        let sample_rate = R::from_f64(DEFAULT_SAMPLE_RATE);
        let frequency = R::from_f64(Self::DEFAULT_FREQ);
        Self {
            sample_rate,
            frequency,
            phasor: R::zero(),
            increment: frequency / sample_rate,
        }
    }

    /// Set the sample rate in Hz.
    pub fn set_sample_rate(&mut self, sr: R) {
        debug_assert!(sr > R::zero() && sr.is_finite());
        self.sample_rate = sr.max(R::min_positive_value());
        self.increment = self.frequency / self.sample_rate;
    }

    /// Set the oscillation frequency in Hz.
    pub fn set_frequency(&mut self, freq: R) {
        debug_assert!(freq.is_finite());
        self.frequency = freq;
        self.increment = self.frequency / self.sample_rate;
    }

    /// Restart the phase.
    pub fn reset(&mut self) {
        self.phasor = R::zero();
    }

    /// Generate a single sample.
    #[inline]
    pub fn process_single(&mut self) -> R {
        self.phasor = self.phasor + self.increment;
        self.phasor = self.phasor - self.phasor.floor();
        (R::TAU() * self.phasor).sin()
    }

    /// Fill a buffer with the sine signal.
    pub fn process(&mut self, dst: &mut [R]) {
        for d in dst.iter_mut() {
            *d = self.process_single();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_bounded() {
        let mut osc = Oscillator::<f64>::new();
        osc.set_frequency(440.0);
        let mut buf = vec![0.0f64; 4800];
        osc.process(&mut buf);
        assert!(buf.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_period_matches_frequency() {
        let mut osc = Oscillator::<f64>::new();
        osc.set_sample_rate(48000.0);
        osc.set_frequency(1000.0);

        // One full cycle spans 48 samples; sample 48 must line up with
        // sample 0 of the next cycle.
        let mut buf = vec![0.0f64; 96];
        osc.process(&mut buf);
        assert!((buf[48] - buf[0]).abs() < 1e-9);
        assert!((buf[95] - buf[47]).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restarts_phase() {
        let mut osc = Oscillator::<f32>::new();
        let first: f32 = osc.process_single();
        for _ in 0..100 {
            osc.process_single();
        }
        osc.reset();
        assert_eq!(osc.process_single(), first);
    }
}
