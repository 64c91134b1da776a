//! Synthetic state trace for trying the viewer without a file

use crate::constants::colors::SERIES_PALETTE;
use crate::downsample::{Dataset, DatasetMeta, LineStyle, PlotPoint, StatePoint};

const DEMO_STATES: [&str; 4] = ["IDLE", "ACTIVE", "BUSY", "ERROR"];

/// Samples between artificial dropouts
const DROPOUT_EVERY: usize = 200_000;

/// Deterministic state trace of `n` samples, one per millisecond
///
/// Run lengths vary from 1 to 64 samples, so any zoom level shows a mix of
/// collapsed columns and multi-state markers. A gap is inserted every
/// 200k samples.
pub fn demo_states(n: usize) -> Dataset {
    profiling::scope!("demo_states");

    let mut points = Vec::with_capacity(n + n / DROPOUT_EVERY);
    // xorshift64
    let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };

    let mut state = 0usize;
    let mut run_left = 0u64;
    for i in 0..n {
        if i > 0 && i % DROPOUT_EVERY == 0 {
            points.push(PlotPoint::Gap);
        }
        if run_left == 0 {
            state = (next() % DEMO_STATES.len() as u64) as usize;
            run_left = next() % 64 + 1;
        }
        run_left -= 1;

        let point = StatePoint::new(i as f64 * 1e-3, state as f64)
            .with_label(DEMO_STATES[state])
            .with_color(SERIES_PALETTE[state]);
        points.push(point.into());
    }

    let meta = DatasetMeta::new("demo state", SERIES_PALETTE[0]).with_line_style(LineStyle::Steps);
    Dataset::new(meta, points)
}
