//! Adaptive downsampling for state-transition charts
//!
//! - `aggregate`: per-dataset pixel-column aggregation with label run collapsing
//! - `orchestrator`: budget split, index resolution, gap sentinels
//! - `viewport`: value-space/pixel mapping and the pixel-density calculator
//! - `worker`: runs an orchestrator off the UI thread
//!
//! Input and output datasets share one shape ([`Dataset`] of [`PlotPoint`]),
//! so a consumer can only tell downsampled data apart by density and by the
//! presence of marker/gap points.

mod aggregate;
mod orchestrator;
mod viewport;
mod worker;

pub use aggregate::{aggregate_states, OutputPoint, StateAggregator};
pub use orchestrator::{resolve_point, Downsampler, DownsamplerState, StateUpdate};
pub use viewport::{calculate_intervals, AxisRange, Bounds, Intervals, Scale, Scales, Viewport};
pub use worker::{DownsampleResult, DownsampleWorker, WorkerRequest};

use serde::{Deserialize, Serialize};

use crate::constants::colors::MARKER_COLOR;
use crate::constants::downsample::ELLIPSIS_LABEL;

/// `[r, g, b, a]`
pub type Rgba = [u8; 4];

/// One normalized input sample, borrowed from its dataset
///
/// `label == None` marks a sentinel that the aggregator passes through as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub x: f64,
    pub y: f64,
    pub label: Option<&'a str>,
    /// Position of the sample in its owning dataset
    pub index: usize,
}

/// An original data point as stored in a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<Rgba>,
}

impl StatePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: None,
            color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }
}

/// A point as handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotPoint {
    /// An original sample
    Real(StatePoint),
    /// Several distinct states occurred within one pixel column
    Marker { x: f64, y: f64, states: Vec<String> },
    /// Break the line here
    Gap,
}

impl PlotPoint {
    pub fn x(&self) -> f64 {
        match self {
            PlotPoint::Real(p) => p.x,
            PlotPoint::Marker { x, .. } => *x,
            PlotPoint::Gap => f64::NAN,
        }
    }

    pub fn y(&self) -> f64 {
        match self {
            PlotPoint::Real(p) => p.y,
            PlotPoint::Marker { y, .. } => *y,
            PlotPoint::Gap => f64::NAN,
        }
    }

    /// Value shown in tooltips; `NaN` for gaps
    pub fn value(&self) -> f64 {
        self.y()
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            PlotPoint::Real(p) => p.label.as_deref(),
            PlotPoint::Marker { .. } => Some(ELLIPSIS_LABEL),
            PlotPoint::Gap => None,
        }
    }

    pub fn color(&self) -> Option<Rgba> {
        match self {
            PlotPoint::Real(p) => p.color,
            PlotPoint::Marker { .. } => Some(MARKER_COLOR),
            PlotPoint::Gap => None,
        }
    }

    /// States elided into a marker
    pub fn states(&self) -> Option<&[String]> {
        match self {
            PlotPoint::Marker { states, .. } => Some(states),
            _ => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, PlotPoint::Gap)
    }

    pub fn xy(&self) -> [f64; 2] {
        [self.x(), self.y()]
    }

    /// Rewrite any point with a `NaN` coordinate into an explicit gap
    pub fn sanitized(self) -> Self {
        if self.x().is_nan() || self.y().is_nan() {
            PlotPoint::Gap
        } else {
            self
        }
    }
}

impl From<StatePoint> for PlotPoint {
    fn from(point: StatePoint) -> Self {
        PlotPoint::Real(point)
    }
}

/// Line rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Line,
    /// Hold each value until the next point (state traces)
    Steps,
    Points,
    LineAndPoints,
}

/// Rendering metadata, passed through the downsampler untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub name: String,
    pub color: Rgba,
    #[serde(default)]
    pub line_style: LineStyle,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

fn default_line_width() -> f32 {
    1.5
}

impl DatasetMeta {
    pub fn new(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
            line_style: LineStyle::default(),
            line_width: default_line_width(),
        }
    }

    pub fn with_line_style(mut self, line_style: LineStyle) -> Self {
        self.line_style = line_style;
        self
    }
}

/// A named, x-ordered series of points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub meta: DatasetMeta,
    pub points: Vec<PlotPoint>,
}

impl Dataset {
    pub fn new(meta: DatasetMeta, points: Vec<PlotPoint>) -> Self {
        Self { meta, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same metadata, different points
    pub fn with_points(&self, points: Vec<PlotPoint>) -> Self {
        Self {
            meta: self.meta.clone(),
            points,
        }
    }

    /// Value-space extent of the non-gap points
    pub fn bounds(&self) -> Option<Bounds> {
        let mut x = AxisRange::EMPTY;
        let mut y = AxisRange::EMPTY;
        for point in &self.points {
            let [px, py] = point.xy();
            if px.is_finite() && py.is_finite() {
                x = x.include(px);
                y = y.include(py);
            }
        }
        (x.min <= x.max).then_some(Bounds { x, y })
    }
}
