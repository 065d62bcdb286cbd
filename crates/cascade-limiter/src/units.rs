// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unit conversion functions.
//!
//! Conversions between decibels and linear gain, and between time and
//! sample counts, generic over the working [`Sample`] type.

use crate::sample::Sample;

/// Convert decibels to linear gain (amplitude ratio).
///
/// # Arguments
/// * `db` - Level in decibels
///
/// # Returns
/// Linear gain (amplitude ratio)
#[inline]
pub fn db_to_gain<R: Sample>(db: R) -> R {
    (db * (R::LN_10() / R::from_f64(20.0))).exp()
}

/// Convert linear gain (amplitude ratio) to decibels.
///
/// # Arguments
/// * `gain` - Linear gain (amplitude ratio)
///
/// # Returns
/// Level in decibels
#[inline]
pub fn gain_to_db<R: Sample>(gain: R) -> R {
    R::from_f64(20.0) * gain.log10()
}

/// Convert seconds to sample count.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `time` - Time in seconds
///
/// # Returns
/// Number of samples
#[inline]
pub fn seconds_to_samples<R: Sample>(sr: R, time: R) -> R {
    time * sr
}

/// Convert sample count to seconds.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `samples` - Number of samples
///
/// # Returns
/// Time in seconds
#[inline]
pub fn samples_to_seconds<R: Sample>(sr: R, samples: R) -> R {
    samples / sr
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_db_gain_conversion() {
        // 0 dB = gain of 1.0
        assert!((db_to_gain(0.0f64) - 1.0).abs() < EPSILON);
        assert!((gain_to_db(1.0f64) - 0.0).abs() < EPSILON);

        // +6.02 dB ≈ gain of 2.0
        assert!((db_to_gain(6.0206f64) - 2.0).abs() < 1e-4);
        assert!((gain_to_db(2.0f64) - 6.0206).abs() < 1e-3);

        // Roundtrip
        let db = -0.3f64;
        assert!((gain_to_db(db_to_gain(db)) - db).abs() < EPSILON);
    }

    #[test]
    fn test_db_gain_f32() {
        assert!((db_to_gain(-6.0f32) - 0.5012).abs() < 1e-3);
        assert!((db_to_gain(60.0f32) - 1000.0).abs() < 0.1);
    }

    #[test]
    fn test_samples_time_conversion() {
        let sr = 48000.0f64;

        // 1 second at 48 kHz = 48000 samples
        assert!((seconds_to_samples(sr, 1.0) - 48000.0).abs() < EPSILON);
        assert!((samples_to_seconds(sr, 48000.0) - 1.0).abs() < EPSILON);

        // Roundtrip
        let time = 0.01;
        let samples = seconds_to_samples(sr, time);
        assert!((samples_to_seconds(sr, samples) - time).abs() < EPSILON);
    }

    #[test]
    fn test_gain_to_db_edge_cases() {
        // Zero gain is -inf dB
        let db = gain_to_db(0.0f64);
        assert!(db.is_infinite() && db.is_sign_negative());

        // Negative gain has no dB representation
        assert!(gain_to_db(-1.0f64).is_nan());
    }
}
