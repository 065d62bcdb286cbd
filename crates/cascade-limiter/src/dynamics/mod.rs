// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dynamics processing: the look-ahead limiter and its envelope subsystems.
//!
//! The [`limiter::Limiter`] derives its attenuation from a
//! [`peak_hold::PeakHoldCascade`] (moving-maximum approximation over the
//! look-ahead window) followed by a [`smoother::ExpSmootherCascade`]
//! (low-distortion envelope smoothing with independent attack and release).

pub mod limiter;
pub mod peak_hold;
pub mod smoother;
