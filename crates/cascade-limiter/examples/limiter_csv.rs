// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dump one block of limited noise as CSV.
//!
//! Runs a loudness-maximiser configuration over seeded white noise and
//! prints `index,in_left,in_right,out_left,out_right` rows to stdout:
//!
//! ```text
//! cargo run --example limiter_csv > limiter.csv
//! ```

use std::io::{self, BufWriter, Write};

use cascade_limiter::dynamics::limiter::Limiter;
use cascade_limiter::noise::Lcg;

const VEC_LEN: usize = 4096;

fn main() -> io::Result<()> {
    let sample_rate = 48000.0;
    let attack = 0.01;
    let hold = 0.01;
    let release = 0.1;
    let pre_gain_db = 60.0;
    let threshold_db = -0.3;

    let mut limiter = Limiter::<f64>::with_config(
        sample_rate,
        pre_gain_db,
        attack,
        hold,
        release,
        threshold_db,
    );

    let mut lcg = Lcg::new();
    let mut in_left = vec![0.0f64; VEC_LEN];
    let mut in_right = vec![0.0f64; VEC_LEN];
    lcg.process_overwrite(&mut in_left);
    lcg.process_overwrite(&mut in_right);

    let mut out_left = vec![0.0f64; VEC_LEN];
    let mut out_right = vec![0.0f64; VEC_LEN];
    limiter.process(&mut out_left, &mut out_right, &in_left, &in_right);

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for i in 0..VEC_LEN {
        writeln!(
            writer,
            "{i},{:.17},{:.17},{:.17},{:.17}",
            in_left[i], in_right[i], out_left[i], out_right[i]
        )?;
    }
    writer.flush()
}
