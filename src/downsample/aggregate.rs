//! Pixel-column aggregation of state samples
//!
//! Samples are bucketed by the pixel column they fall in. A column that saw a
//! single state collapses to one point; a column that saw several becomes a
//! `States` marker followed by the state current at the end of the column.

use serde::{Deserialize, Serialize};

use super::viewport::{calculate_intervals, Viewport};
use super::Sample;
use crate::constants::downsample::{BUFFER_RATIO, MIN_POINTS_PER_PIXEL};

/// One aggregator output point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputPoint {
    /// Refers back to the original sample at `index`
    Sample { x: f64, index: usize },
    /// Distinct states seen in one column, in first-occurrence order
    States { x: f64, states: Vec<String> },
}

impl OutputPoint {
    pub fn x(&self) -> f64 {
        match self {
            OutputPoint::Sample { x, .. } | OutputPoint::States { x, .. } => *x,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            OutputPoint::Sample { index, .. } => Some(*index),
            OutputPoint::States { .. } => None,
        }
    }

    pub fn states(&self) -> Option<&[String]> {
        match self {
            OutputPoint::States { states, .. } => Some(states),
            OutputPoint::Sample { .. } => None,
        }
    }
}

/// First sample of a run of identical labels
struct LabelRun<'a> {
    label: &'a str,
    index: usize,
}

/// Samples sharing one pixel column
struct Interval<'a> {
    column: i64,
    start_x: f64,
    end_x: f64,
    runs: Vec<LabelRun<'a>>,
}

impl<'a> Interval<'a> {
    fn open(sample: &Sample<'a>, label: &'a str, column: i64) -> Self {
        Self {
            column,
            start_x: sample.x,
            end_x: sample.x,
            runs: vec![LabelRun {
                label,
                index: sample.index,
            }],
        }
    }

    fn push(&mut self, sample: &Sample<'a>, label: &'a str) {
        self.end_x = sample.x;
        if self.runs.last().is_some_and(|run| run.label == label) {
            return;
        }
        self.runs.push(LabelRun {
            label,
            index: sample.index,
        });
    }

    fn flush(self, out: &mut Vec<OutputPoint>) {
        match self.runs.as_slice() {
            [] => {}
            [only] => out.push(OutputPoint::Sample {
                x: self.start_x,
                index: only.index,
            }),
            [.., last] => {
                let mut states: Vec<String> = Vec::with_capacity(self.runs.len());
                for run in &self.runs {
                    if !states.iter().any(|s| s == run.label) {
                        states.push(run.label.to_owned());
                    }
                }
                out.push(OutputPoint::States {
                    x: self.start_x,
                    states,
                });
                out.push(OutputPoint::Sample {
                    x: self.end_x,
                    index: last.index,
                });
            }
        }
    }
}

/// Interval state aggregator with host-tunable density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateAggregator {
    /// Device pixels per aggregation column
    pub min_points_per_pixel: f64,
    /// Share of the visible x-range processed beyond each viewport edge
    pub buffer_ratio: f64,
}

impl Default for StateAggregator {
    fn default() -> Self {
        Self {
            min_points_per_pixel: MIN_POINTS_PER_PIXEL,
            buffer_ratio: BUFFER_RATIO,
        }
    }
}

impl StateAggregator {
    /// Aggregate one x-ordered sample sequence against `viewport`
    ///
    /// The sequence is consumed once. Samples left of the buffered window only
    /// keep the closest one (emitted first); past the right edge only the first
    /// one is kept, pinned to the buffered right edge and emitted last.
    /// Unlabelled samples (gaps) close the open column and pass through as
    /// their own points, so they stay in input order. Never fails: `NaN` coordinates are passed along for
    /// the caller to sanitize.
    pub fn aggregate<'a, I>(
        &self,
        samples: I,
        viewport: &Viewport,
        target_points: Option<usize>,
    ) -> Vec<OutputPoint>
    where
        I: IntoIterator<Item = Sample<'a>>,
    {
        profiling::scope!("StateAggregator::aggregate");

        let intervals = calculate_intervals(viewport, self.min_points_per_pixel, target_points);
        let pixels_per_x_value = intervals.pixels_per_x_value;

        let visible = viewport.bounds().x;
        let buffer = visible.span() * self.buffer_ratio;
        let min_x = visible.min - buffer;
        let max_x = visible.max + buffer;

        let mut points = Vec::new();
        let mut before_bounds: Option<OutputPoint> = None;
        let mut past_bounds: Option<usize> = None;
        let mut open: Option<Interval<'a>> = None;

        for sample in samples {
            if sample.x < min_x {
                before_bounds = Some(OutputPoint::Sample {
                    x: sample.x,
                    index: sample.index,
                });
                continue;
            }
            if sample.x > max_x {
                // input is ordered by x, nothing after this can be visible
                past_bounds = Some(sample.index);
                break;
            }

            let Some(label) = sample.label else {
                // close the open column so the sentinel stays behind it
                if let Some(done) = open.take() {
                    done.flush(&mut points);
                }
                points.push(OutputPoint::Sample {
                    x: sample.x,
                    index: sample.index,
                });
                continue;
            };

            let column = (sample.x * pixels_per_x_value).floor() as i64;
            match open.as_mut() {
                Some(interval) if interval.column == column => interval.push(&sample, label),
                _ => {
                    if let Some(done) = open.replace(Interval::open(&sample, label, column)) {
                        done.flush(&mut points);
                    }
                }
            }
        }

        if let Some(done) = open.take() {
            done.flush(&mut points);
        }
        if let Some(index) = past_bounds {
            points.push(OutputPoint::Sample { x: max_x, index });
        }
        if let Some(first) = before_bounds {
            points.insert(0, first);
        }

        points
    }
}

/// [`StateAggregator::aggregate`] with default density and buffer
pub fn aggregate_states<'a, I>(
    samples: I,
    viewport: &Viewport,
    target_points: Option<usize>,
) -> Vec<OutputPoint>
where
    I: IntoIterator<Item = Sample<'a>>,
{
    StateAggregator::default().aggregate(samples, viewport, target_points)
}
