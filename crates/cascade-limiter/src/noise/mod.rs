// SPDX-License-Identifier: LGPL-3.0-or-later

//! Noise generation.
//!
//! A linear congruential white-noise source used to exercise the block
//! processing API from tests, benchmarks, and examples.

pub mod lcg;

// Re-export the commonly used type
pub use lcg::Lcg;
