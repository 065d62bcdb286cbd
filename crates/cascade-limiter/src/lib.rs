// SPDX-License-Identifier: LGPL-3.0-or-later

//! # cascade-limiter
//!
//! A real-time stereo look-ahead peak limiter built from an IIR envelope
//! profiler: cascaded peak-hold sections approximate a moving maximum over
//! the look-ahead window, and cascaded branching one-pole smoothers turn
//! that staircase into a low-distortion attenuation envelope. The audio
//! path is delayed through a crossfading dual-tap delay line, so attack
//! changes never produce clicks or pitch shifts.
//!
//! The crate provides:
//!
//! - **Dynamics**: the [`Limiter`](dynamics::limiter::Limiter) orchestrator,
//!   plus its envelope subsystems
//!   ([`PeakHoldCascade`](dynamics::peak_hold::PeakHoldCascade),
//!   [`ExpSmootherCascade`](dynamics::smoother::ExpSmootherCascade))
//! - **Utilities**: the crossfading [`SmoothDelay`](util::delay::SmoothDelay)
//!   and a sine [`Oscillator`](util::oscillator::Oscillator)
//! - **Noise**: an [`Lcg`](noise::Lcg) white-noise source for driving the
//!   block API in tests, benches, and examples
//!
//! All processors are generic over the [`Sample`](sample::Sample) scalar
//! (`f32` or `f64`), process blocks synchronously on the caller's thread,
//! and allocate nothing after construction.
//!
//! ## Example
//!
//! ```
//! use cascade_limiter::dynamics::limiter::Limiter;
//!
//! let mut limiter = Limiter::<f32>::new();
//! limiter.set_sample_rate(48000.0);
//! limiter.set_pre_gain(12.0);
//! limiter.set_threshold(-0.3);
//!
//! let src = vec![0.5f32; 512];
//! let mut out_l = vec![0.0f32; 512];
//! let mut out_r = vec![0.0f32; 512];
//! limiter.process(&mut out_l, &mut out_r, &src, &src);
//! ```

// Foundational modules
pub mod consts;
pub mod sample;
pub mod units;

// Processing modules
pub mod dynamics;
pub mod noise;
pub mod util;
