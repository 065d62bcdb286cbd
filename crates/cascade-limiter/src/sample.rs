// SPDX-License-Identifier: LGPL-3.0-or-later

//! Generic floating-point sample type.
//!
//! Every processor in this crate is generic over [`Sample`], which covers
//! `f32` and `f64`. Coefficients, states, and time constants all share the
//! sample type, so coefficient precomputation happens at the same precision
//! as the audio path.

use num_traits::{Float, FloatConst};

/// Floating-point scalar usable as audio sample, coefficient, and state.
pub trait Sample: Float + FloatConst {
    /// Widen an integer sample count into the sample domain.
    fn from_usize(n: usize) -> Self;

    /// Widen an `f64` configuration constant into the sample domain.
    fn from_f64(v: f64) -> Self;

    /// Round to the nearest whole sample count, saturating at zero.
    fn round_usize(self) -> usize;
}

impl Sample for f32 {
    #[inline]
    fn from_usize(n: usize) -> Self {
        n as f32
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn round_usize(self) -> usize {
        self.round().max(0.0) as usize
    }
}

impl Sample for f64 {
    #[inline]
    fn from_usize(n: usize) -> Self {
        n as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn round_usize(self) -> usize {
        self.round().max(0.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_usize() {
        assert_eq!(f32::from_usize(480), 480.0);
        assert_eq!(f64::from_usize(65536), 65536.0);
    }

    #[test]
    fn test_round_usize() {
        assert_eq!(480.4f64.round_usize(), 480);
        assert_eq!(480.5f64.round_usize(), 481);
        assert_eq!(0.49f32.round_usize(), 0);
    }

    #[test]
    fn test_round_usize_saturates_at_zero() {
        assert_eq!((-3.0f64).round_usize(), 0);
        assert_eq!(f32::NAN.round_usize(), 0);
    }
}
