// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cascaded branching one-pole exponential smoothers.
//!
//! Each section is the one-pole recurrence `y = x + c * (y - x)` with the
//! coefficient chosen per sample: the attack coefficient while the input
//! exceeds the section state, the release coefficient otherwise. The
//! per-stage branching makes the cascade a non-linear envelope follower,
//! which is what keeps harmonic distortion low on asymmetric signals.
//!
//! Cascading `STAGES` identical one-poles shifts the composite −3 dB
//! point, so the per-stage time constant is rescaled by
//! `1 / sqrt(2^(1/STAGES) − 1)` to keep the composite rise and fall times
//! at the configured attack and release values.

use crate::consts::{DEFAULT_SAMPLE_RATE, TIME_MIN};
use crate::sample::Sample;

/// Series cascade of `STAGES` branching one-pole smoothers.
///
/// # Examples
/// ```
/// use cascade_limiter::dynamics::smoother::ExpSmootherCascade;
///
/// let mut smoother = ExpSmootherCascade::<f32, 4>::new();
/// smoother.set_sample_rate(48000.0);
/// smoother.set_attack_time(0.01);
/// smoother.set_release_time(0.05);
///
/// let input = vec![1.0f32; 256];
/// let mut output = vec![0.0f32; 256];
/// smoother.process(&mut output, &input);
/// ```
#[derive(Debug, Clone)]
pub struct ExpSmootherCascade<R, const STAGES: usize> {
    sample_rate: R,
    /// Sampling period (`1 / sample_rate`).
    period: R,
    attack_time: R,
    release_time: R,
    /// Release and attack coefficients, indexed by the attack-phase flag.
    coeff: [R; 2],
    /// Last output of each section.
    state: [R; STAGES],
}

impl<R: Sample, const STAGES: usize> Default for ExpSmootherCascade<R, STAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Sample, const STAGES: usize> ExpSmootherCascade<R, STAGES> {
    /// Default attack time (s).
    const DEFAULT_ATTACK: f64 = 0.001;
    /// Default release time (s).
    const DEFAULT_RELEASE: f64 = 0.01;

    /// Create a new cascade with default time constants at the default
    /// sample rate.
    pub fn new() -> Self {
        let sample_rate = R::from_f64(DEFAULT_SAMPLE_RATE);
        let mut smoother = Self {
            sample_rate,
            period: sample_rate.recip(),
            attack_time: R::from_f64(Self::DEFAULT_ATTACK),
            release_time: R::from_f64(Self::DEFAULT_RELEASE),
            coeff: [R::zero(); 2],
            state: [R::zero(); STAGES],
        };
        smoother.update_coeffs();
        smoother
    }

    /// Correction factor keeping the composite time constants of the
    /// cascade equal to the per-call configuration.
    fn correction() -> R {
        let stages = R::from_usize(STAGES);
        (R::from_f64(2.0).powf(stages.recip()) - R::one())
            .sqrt()
            .recip()
    }

    fn update_coeffs(&mut self) {
        let k = -R::TAU() * self.period * Self::correction();
        self.coeff[1] = (k / self.attack_time).exp();
        self.coeff[0] = (k / self.release_time).exp();
    }

    /// Set the sample rate in Hz and rebuild both coefficients.
    pub fn set_sample_rate(&mut self, sr: R) {
        debug_assert!(sr > R::zero() && sr.is_finite());
        self.sample_rate = sr.max(R::min_positive_value());
        self.period = self.sample_rate.recip();
        self.update_coeffs();
    }

    /// Set the attack time in seconds.
    pub fn set_attack_time(&mut self, attack: R) {
        debug_assert!(attack > R::zero() && attack.is_finite());
        self.attack_time = attack.max(R::from_f64(TIME_MIN));
        self.update_coeffs();
    }

    /// Set the release time in seconds.
    pub fn set_release_time(&mut self, release: R) {
        debug_assert!(release > R::zero() && release.is_finite());
        self.release_time = release.max(R::from_f64(TIME_MIN));
        self.update_coeffs();
    }

    /// Get the configured attack time in seconds.
    pub fn attack_time(&self) -> R {
        self.attack_time
    }

    /// Get the configured release time in seconds.
    pub fn release_time(&self) -> R {
        self.release_time
    }

    /// Get the per-stage attack coefficient.
    pub fn attack_coeff(&self) -> R {
        self.coeff[1]
    }

    /// Get the per-stage release coefficient.
    pub fn release_coeff(&self) -> R {
        self.coeff[0]
    }

    /// Zero the state of every section.
    pub fn reset(&mut self) {
        self.state = [R::zero(); STAGES];
    }

    /// Process a single sample, returning the cascaded smoothed envelope.
    #[inline]
    pub fn process_sample(&mut self, x: R) -> R {
        let mut input = x;
        for stage in 0..STAGES {
            let is_attack_phase = input > self.state[stage];
            let c = self.coeff[usize::from(is_attack_phase)];
            self.state[stage] = input + c * (self.state[stage] - input);
            input = self.state[stage];
        }
        self.state[STAGES - 1]
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
