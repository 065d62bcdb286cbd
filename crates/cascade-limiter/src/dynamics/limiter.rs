// SPDX-License-Identifier: LGPL-3.0-or-later

//! Stereo look-ahead peak limiter.
//!
//! The limiter keeps the instantaneous absolute value of its output below
//! a configured ceiling while introducing as little harmonic distortion as
//! possible. Per block it:
//!
//! 1. Applies the smoothed pre-gain to both channels
//! 2. Derives a mono side-chain from the channel-wise absolute maximum
//! 3. Runs the side-chain through the peak-hold cascade
//! 4. Clips the envelope at the smoothed threshold
//! 5. Smooths the clipped envelope through the exponential smoother cascade
//! 6. Divides the threshold by the envelope to obtain the attenuation gain
//! 7. Delays the pre-gained channels by the look-ahead
//! 8. Multiplies the delayed channels by the attenuation gain
//!
//! The look-ahead is quantised to a multiple of the peak-hold stage count
//! so that the delay and the peak-hold window stay exactly aligned: every
//! peak entering the side-chain has been detected by the time its delayed
//! copy reaches the output. Pre-gain and threshold automation is smoothed
//! with a 20 Hz one-pole, so parameter changes never click.
//!
//! With heavy pre-gain the limiter operates as a loudness maximiser.

use crate::consts::{
    DEFAULT_ATTACK_TIME, DEFAULT_HOLD_TIME, DEFAULT_PRE_GAIN_DB, DEFAULT_RELEASE_TIME,
    DEFAULT_SAMPLE_RATE, DEFAULT_THRESHOLD_DB, FLOAT_SAT_N_INF, FLOAT_SAT_P_INF,
    PARAM_SMOOTH_FREQ, TIME_MIN,
};
use crate::dynamics::peak_hold::PeakHoldCascade;
use crate::dynamics::smoother::ExpSmootherCascade;
use crate::sample::Sample;
use crate::units::db_to_gain;
use crate::util::delay::{self, SmoothDelay};

/// Number of series peak-hold sections in the side-chain.
pub const PEAK_HOLD_STAGES: usize = 8;

/// Number of series one-pole smoother sections in the side-chain.
pub const SMOOTH_STAGES: usize = 4;

/// Internal processing granularity; larger blocks are split into chunks of
/// this size so scratch memory stays fixed.
const BUF_GRANULARITY: usize = 8192;

/// Stereo look-ahead peak limiter.
///
/// Both channels share the envelope chain (peak-hold, smoother, gain
/// vector) but keep independent delay lines, so the same attenuation is
/// applied to both and the stereo image is preserved.
///
/// `process` is synchronous, causal, and allocation-free; state persists
/// across calls until [`reset`](Limiter::reset). One instance serves one
/// stream; it is not meant for concurrent invocation.
///
/// # Examples
/// ```
/// use cascade_limiter::dynamics::limiter::Limiter;
///
/// let mut limiter = Limiter::<f64>::new();
/// limiter.set_sample_rate(48000.0);
/// limiter.set_attack_time(0.01);
/// limiter.set_release_time(0.05);
/// limiter.set_threshold(-0.3);
///
/// let src = vec![0.8f64; 1024];
/// let mut out_l = vec![0.0f64; 1024];
/// let mut out_r = vec![0.0f64; 1024];
/// limiter.process(&mut out_l, &mut out_r, &src, &src);
/// ```
#[derive(Debug, Clone)]
pub struct Limiter<R> {
    sample_rate: R,
    /// Sampling period (`1 / sample_rate`).
    period: R,
    attack: R,
    hold: R,
    release: R,
    pre_gain_db: R,
    /// Linear pre-gain.
    pre_gain: R,
    threshold_db: R,
    /// Linear threshold.
    threshold: R,
    /// One-pole state tracking the linear pre-gain.
    smooth_pre_gain: R,
    /// One-pole state tracking the linear threshold.
    smooth_threshold: R,
    /// Coefficient of the 20 Hz parameter-smoothing one-pole.
    param_coeff: R,
    /// Look-ahead delay in samples, a multiple of [`PEAK_HOLD_STAGES`].
    lookahead: usize,

    delay_left: SmoothDelay<R>,
    delay_right: SmoothDelay<R>,
    peak_holder: PeakHoldCascade<R, PEAK_HOLD_STAGES>,
    smoother: ExpSmootherCascade<R, SMOOTH_STAGES>,

    // Preallocated per-chunk scratch
    env_buf: Vec<R>,
    thr_buf: Vec<R>,
    left_buf: Vec<R>,
    right_buf: Vec<R>,
}

impl<R: Sample> Default for Limiter<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Sample> Limiter<R> {
    /// Create a limiter with the default configuration (48 kHz, 10 ms
    /// attack, no hold, 50 ms release, −0.3 dB threshold, no pre-gain).
    pub fn new() -> Self {
        Self::with_config(
            R::from_f64(DEFAULT_SAMPLE_RATE),
            R::from_f64(DEFAULT_PRE_GAIN_DB),
            R::from_f64(DEFAULT_ATTACK_TIME),
            R::from_f64(DEFAULT_HOLD_TIME),
            R::from_f64(DEFAULT_RELEASE_TIME),
            R::from_f64(DEFAULT_THRESHOLD_DB),
        )
    }

    /// Create a limiter with an explicit configuration.
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `pre_gain_db` - Pre-gain in dB
    /// * `attack` - Attack time in seconds
    /// * `hold` - Hold time in seconds
    /// * `release` - Release time in seconds
    /// * `threshold_db` - Limiting threshold in dB
    pub fn with_config(
        sample_rate: R,
        pre_gain_db: R,
        attack: R,
        hold: R,
        release: R,
        threshold_db: R,
    ) -> Self {
        let mut limiter = Self {
            sample_rate: R::from_f64(DEFAULT_SAMPLE_RATE),
            period: R::from_f64(DEFAULT_SAMPLE_RATE).recip(),
            attack: R::from_f64(DEFAULT_ATTACK_TIME),
            hold: R::from_f64(DEFAULT_HOLD_TIME),
            release: R::from_f64(DEFAULT_RELEASE_TIME),
            pre_gain_db: R::zero(),
            pre_gain: R::one(),
            threshold_db: R::zero(),
            threshold: R::one(),
            smooth_pre_gain: R::zero(),
            smooth_threshold: R::zero(),
            param_coeff: R::zero(),
            lookahead: 0,
            delay_left: SmoothDelay::new(),
            delay_right: SmoothDelay::new(),
            peak_holder: PeakHoldCascade::new(),
            smoother: ExpSmootherCascade::new(),
            env_buf: vec![R::zero(); BUF_GRANULARITY],
            thr_buf: vec![R::zero(); BUF_GRANULARITY],
            left_buf: vec![R::zero(); BUF_GRANULARITY],
            right_buf: vec![R::zero(); BUF_GRANULARITY],
        };
        limiter.set_sample_rate(sample_rate);
        limiter.set_pre_gain(pre_gain_db);
        limiter.set_hold_time(hold);
        limiter.set_attack_time(attack);
        limiter.set_release_time(release);
        limiter.set_threshold(threshold_db);
        limiter
    }

    /// Set the sample rate in Hz and rebuild every rate-dependent quantity:
    /// the parameter-smoothing coefficient, the smoother coefficients, the
    /// peak-hold period, and the look-ahead delay.
    pub fn set_sample_rate(&mut self, sr: R) {
        debug_assert!(sr > R::zero() && sr.is_finite());
        self.sample_rate = sr.max(R::min_positive_value());
        self.period = self.sample_rate.recip();
        self.param_coeff =
            (-R::TAU() * R::from_f64(PARAM_SMOOTH_FREQ) * self.period).exp();
        self.peak_holder.set_sample_rate(self.sample_rate);
        self.smoother.set_sample_rate(self.sample_rate);
        self.update_lookahead();
    }

    /// Set the attack time in seconds.
    ///
    /// The look-ahead delay, the delay crossfade time, the peak-hold period
    /// and the smoother attack all derive from it.
    pub fn set_attack_time(&mut self, attack: R) {
        debug_assert!(attack > R::zero() && attack.is_finite());
        self.attack = attack.max(R::from_f64(TIME_MIN));
        self.update_lookahead();
        self.smoother.set_attack_time(self.attack);
        self.peak_holder.set_hold_time(self.attack + self.hold);
    }

    /// Set the hold time in seconds.
    ///
    /// The hold time extends the peak-hold period past the attack time,
    /// improving convergence to the target amplitude; useful to reduce
    /// distortion at low frequencies.
    pub fn set_hold_time(&mut self, hold: R) {
        debug_assert!(hold >= R::zero() && hold.is_finite());
        self.hold = hold.max(R::zero());
        self.peak_holder.set_hold_time(self.attack + self.hold);
    }

    /// Set the release time in seconds.
    pub fn set_release_time(&mut self, release: R) {
        debug_assert!(release > R::zero() && release.is_finite());
        self.release = release.max(R::from_f64(TIME_MIN));
        self.smoother.set_release_time(self.release);
    }

    /// Set the limiting threshold in dB.
    pub fn set_threshold(&mut self, threshold_db: R) {
        debug_assert!(threshold_db.is_finite());
        self.threshold_db = threshold_db
            .max(R::from_f64(FLOAT_SAT_N_INF))
            .min(R::from_f64(FLOAT_SAT_P_INF));
        self.threshold = db_to_gain(self.threshold_db).max(R::min_positive_value());
    }

    /// Set the pre-gain in dB, applied to the input before envelope
    /// detection.
    pub fn set_pre_gain(&mut self, pre_gain_db: R) {
        debug_assert!(pre_gain_db.is_finite());
        self.pre_gain_db = pre_gain_db
            .max(R::from_f64(FLOAT_SAT_N_INF))
            .min(R::from_f64(FLOAT_SAT_P_INF));
        self.pre_gain = db_to_gain(self.pre_gain_db);
    }

    /// Get the configured sample rate in Hz.
    pub fn sample_rate(&self) -> R {
        self.sample_rate
    }

    /// Get the configured attack time in seconds.
    pub fn attack_time(&self) -> R {
        self.attack
    }

    /// Get the configured hold time in seconds.
    pub fn hold_time(&self) -> R {
        self.hold
    }

    /// Get the configured release time in seconds.
    pub fn release_time(&self) -> R {
        self.release
    }

    /// Get the configured threshold in dB.
    pub fn threshold_db(&self) -> R {
        self.threshold_db
    }

    /// Get the configured pre-gain in dB.
    pub fn pre_gain_db(&self) -> R {
        self.pre_gain_db
    }

    /// Get the latency in samples, equal to the current look-ahead delay.
    pub fn latency(&self) -> usize {
        self.lookahead
    }

    /// Return every component and smoothing state to the zero initial
    /// state. Configuration is untouched.
    pub fn reset(&mut self) {
        self.delay_left.reset();
        self.delay_right.reset();
        self.peak_holder.reset();
        self.smoother.reset();
        self.smooth_pre_gain = R::zero();
        self.smooth_threshold = R::zero();
    }

    // The look-ahead matches the peak-hold window: it is quantised to a
    // multiple of the stage count so the maximum of the whole window is
    // known when the attenuation is applied. The crossfade time equals the
    // delay for minimum overshoot during attack variations.
    fn update_lookahead(&mut self) {
        let per_section =
            (self.attack / R::from_usize(PEAK_HOLD_STAGES) * self.sample_rate).round_usize();
        let max_sections = (delay::CAPACITY - 1) / PEAK_HOLD_STAGES;
        debug_assert!(per_section <= max_sections, "attack exceeds delay capacity");
        self.lookahead = per_section.min(max_sections) * PEAK_HOLD_STAGES;

        let interp_time = self.lookahead.max(1);
        self.delay_left.set_delay(self.lookahead);
        self.delay_left.set_interpolation_time(interp_time);
        self.delay_right.set_delay(self.lookahead);
        self.delay_right.set_interpolation_time(interp_time);
    }

    /// Process a stereo block.
    ///
    /// The output is the input delayed by [`latency`](Limiter::latency)
    /// samples, scaled so its absolute value stays at or below the
    /// threshold once the envelope has settled. All four buffers must have
    /// the same length; blocks of any length are accepted.
    ///
    /// # Arguments
    /// * `dst_left` - Left output buffer
    /// * `dst_right` - Right output buffer
    /// * `src_left` - Left input buffer
    /// * `src_right` - Right input buffer
    pub fn process(
        &mut self,
        dst_left: &mut [R],
        dst_right: &mut [R],
        src_left: &[R],
        src_right: &[R],
    ) {
        assert_eq!(dst_left.len(), dst_right.len());
        assert_eq!(dst_left.len(), src_left.len());
        assert_eq!(dst_left.len(), src_right.len());

        let mut offset = 0;
        let mut remaining = dst_left.len();
        while remaining > 0 {
            let to_do = remaining.min(BUF_GRANULARITY);
            self.process_chunk(
                &mut dst_left[offset..offset + to_do],
                &mut dst_right[offset..offset + to_do],
                &src_left[offset..offset + to_do],
                &src_right[offset..offset + to_do],
            );
            offset += to_do;
            remaining -= to_do;
        }
    }

    fn process_chunk(
        &mut self,
        dst_left: &mut [R],
        dst_right: &mut [R],
        src_left: &[R],
        src_right: &[R],
    ) {
        let n = dst_left.len();

        // Apply the smoothed pre-gain to both channels.
        let pre_gain = self.pre_gain;
        let coeff = self.param_coeff;
        let mut gain = self.smooth_pre_gain;
        for i in 0..n {
            gain = pre_gain + coeff * (gain - pre_gain);
            self.left_buf[i] = src_left[i] * gain;
            self.right_buf[i] = src_right[i] * gain;
        }
        self.smooth_pre_gain = gain;

        // Mono side-chain: channel-wise absolute maximum.
        for i in 0..n {
            self.env_buf[i] = self.left_buf[i].abs().max(self.right_buf[i].abs());
        }

        // Peak-hold envelope over the look-ahead window.
        self.peak_holder.process_in_place(&mut self.env_buf[..n]);

        // Clip the envelope at the smoothed threshold so signals below it
        // stay unaltered, recording the threshold sequence for the gain
        // computation below.
        let threshold = self.threshold;
        let mut smooth_thr = self.smooth_threshold;
        for i in 0..n {
            smooth_thr = threshold + coeff * (smooth_thr - threshold);
            self.thr_buf[i] = smooth_thr;
            self.env_buf[i] = self.env_buf[i].max(smooth_thr);
        }
        self.smooth_threshold = smooth_thr;

        // Smooth the clipped envelope.
        self.smoother.process_in_place(&mut self.env_buf[..n]);

        // Attenuation gain: threshold over envelope, never above unity.
        for i in 0..n {
            self.env_buf[i] = (self.thr_buf[i] / self.env_buf[i]).min(R::one());
        }

        // Synchronise the audio path with the attenuation gain.
        self.delay_left.process_in_place(&mut self.left_buf[..n]);
        self.delay_right.process_in_place(&mut self.right_buf[..n]);

        // Apply the shared gain to the delayed channels.
        for i in 0..n {
            dst_left[i] = self.env_buf[i] * self.left_buf[i];
            dst_right[i] = self.env_buf[i] * self.right_buf[i];
        }
    }
}
