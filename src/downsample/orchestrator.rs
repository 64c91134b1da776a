//! Downsample orchestration across all datasets of one chart

use std::sync::Arc;

use super::aggregate::{OutputPoint, StateAggregator};
use super::viewport::{Bounds, Scales, Viewport};
use super::{Dataset, PlotPoint, StatePoint};
use crate::config::DownsampleConfig;
use crate::data::iterate_samples;

/// Partial state update; `None` fields keep their previous value
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub datasets: Option<Arc<[Dataset]>>,
    pub dataset_bounds: Option<Bounds>,
    pub scales: Option<Scales>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_datasets(mut self, datasets: impl Into<Arc<[Dataset]>>) -> Self {
        self.datasets = Some(datasets.into());
        self
    }

    pub fn with_dataset_bounds(mut self, bounds: Bounds) -> Self {
        self.dataset_bounds = Some(bounds);
        self
    }

    pub fn with_scales(mut self, scales: Scales) -> Self {
        self.scales = Some(scales);
        self
    }
}

/// Immutable snapshot of everything a downsample pass reads
#[derive(Debug, Clone)]
pub struct DownsamplerState {
    datasets: Arc<[Dataset]>,
    dataset_bounds: Option<Bounds>,
    scales: Option<Scales>,
}

impl Default for DownsamplerState {
    fn default() -> Self {
        Self {
            datasets: Arc::from(Vec::new()),
            dataset_bounds: None,
            scales: None,
        }
    }
}

impl DownsamplerState {
    /// New state with the provided fields of `update` applied
    pub fn merge(self, update: StateUpdate) -> Self {
        Self {
            datasets: update.datasets.unwrap_or(self.datasets),
            dataset_bounds: update.dataset_bounds.or(self.dataset_bounds),
            scales: update.scales.or(self.scales),
        }
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn dataset_bounds(&self) -> Option<&Bounds> {
        self.dataset_bounds.as_ref()
    }

    pub fn scales(&self) -> Option<&Scales> {
        self.scales.as_ref()
    }
}

/// Keeps the chart's datasets within a shared point budget
///
/// Every [`Downsampler::downsample`] call recomputes from the current state;
/// nothing is cached between calls, so the host decides how often to call.
pub struct Downsampler {
    config: DownsampleConfig,
    aggregator: StateAggregator,
    state: DownsamplerState,
}

impl Downsampler {
    pub fn new(config: DownsampleConfig) -> Self {
        Self {
            aggregator: config.aggregator(),
            config,
            state: DownsamplerState::default(),
        }
    }

    pub fn config(&self) -> &DownsampleConfig {
        &self.config
    }

    pub fn state(&self) -> &DownsamplerState {
        &self.state
    }

    pub fn update(&mut self, update: StateUpdate) {
        let previous = std::mem::take(&mut self.state);
        self.state = previous.merge(update);
    }

    /// Equal share of the global budget; dataset size plays no part
    pub fn points_per_dataset(&self) -> usize {
        self.config.global_point_budget / self.state.datasets.len().max(1)
    }

    /// One full pass over all datasets
    ///
    /// `None` until viewport bounds are known. Without usable scales the
    /// datasets come back unmodified.
    pub fn downsample(&self) -> Option<Vec<Dataset>> {
        profiling::scope!("Downsampler::downsample");

        self.state.dataset_bounds.as_ref()?;

        let viewport = match self.state.scales.as_ref().map(Viewport::from_scales) {
            None => return Some(self.state.datasets.to_vec()),
            Some(Err(err)) => {
                log::warn!("returning datasets unmodified: {}", err);
                return Some(self.state.datasets.to_vec());
            }
            Some(Ok(viewport)) => viewport,
        };

        let budget = self.points_per_dataset();
        let datasets: Vec<Dataset> = self
            .state
            .datasets
            .iter()
            .map(|dataset| self.downsample_dataset(dataset, &viewport, budget))
            .collect();

        log::debug!(
            "downsampled {} datasets to {} points ({} per dataset)",
            datasets.len(),
            datasets.iter().map(Dataset::len).sum::<usize>(),
            budget
        );
        Some(datasets)
    }

    fn downsample_dataset(&self, dataset: &Dataset, viewport: &Viewport, budget: usize) -> Dataset {
        profiling::scope!("downsample_dataset");

        let output = self
            .aggregator
            .aggregate(iterate_samples(dataset), viewport, Some(budget));
        let placeholder_y = dataset
            .points
            .iter()
            .map(PlotPoint::y)
            .find(|y| y.is_finite())
            .unwrap_or(f64::NAN);

        let points = output
            .into_iter()
            .map(|point| resolve_point(dataset, point, placeholder_y))
            .collect();
        dataset.with_points(points)
    }
}

/// Turn one aggregator point back into something renderable
///
/// Sample references copy the original point with `x` snapped to the
/// column's representative time. `States` become an ellipsis marker at
/// `placeholder_y`. Anything missing or `NaN` becomes a gap.
pub fn resolve_point(dataset: &Dataset, point: OutputPoint, placeholder_y: f64) -> PlotPoint {
    let resolved = match point {
        OutputPoint::Sample { x, index } => match dataset.points.get(index) {
            Some(PlotPoint::Real(original)) => PlotPoint::Real(StatePoint {
                x,
                ..original.clone()
            }),
            Some(PlotPoint::Marker { y, states, .. }) => PlotPoint::Marker {
                x,
                y: *y,
                states: states.clone(),
            },
            Some(PlotPoint::Gap) | None => PlotPoint::Gap,
        },
        OutputPoint::States { x, states } => PlotPoint::Marker {
            x,
            y: placeholder_y,
            states,
        },
    };
    resolved.sanitized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downsample::{AxisRange, DatasetMeta, Scale};

    fn meta(name: &str) -> DatasetMeta {
        DatasetMeta::new(name, [10, 20, 30, 255])
    }

    fn state_dataset(name: &str, labels: &[(f64, &str)]) -> Dataset {
        let points = labels
            .iter()
            .map(|&(x, label)| StatePoint::new(x, 3.0).with_label(label).into())
            .collect();
        Dataset::new(meta(name), points)
    }

    fn scales(x_min: f64, x_max: f64, width_px: f64) -> Scales {
        Scales {
            x: Scale {
                min: x_min,
                max: x_max,
                pixel_start: 0.0,
                pixel_end: width_px,
            },
            y: Scale {
                min: 0.0,
                max: 10.0,
                pixel_start: 100.0,
                pixel_end: 0.0,
            },
        }
    }

    fn bounds() -> Bounds {
        Bounds {
            x: AxisRange::new(0.0, 1.0),
            y: AxisRange::new(0.0, 10.0),
        }
    }

    #[test]
    fn test_no_bounds_returns_none() {
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        assert!(downsampler.downsample().is_none());

        downsampler.update(
            StateUpdate::new()
                .with_datasets(vec![state_dataset("a", &[(0.0, "A")])])
                .with_scales(scales(0.0, 1.0, 10.0)),
        );
        assert!(downsampler.downsample().is_none());
    }

    #[test]
    fn test_no_scales_returns_datasets_unmodified() {
        let datasets = vec![state_dataset("a", &[(0.0, "A"), (0.01, "B"), (0.02, "C")])];
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(datasets.clone())
                .with_dataset_bounds(bounds()),
        );
        assert_eq!(downsampler.downsample(), Some(datasets));
    }

    #[test]
    fn test_invalid_scales_degrade_to_unmodified() {
        let datasets = vec![state_dataset("a", &[(0.0, "A"), (0.01, "B")])];
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(datasets.clone())
                .with_dataset_bounds(bounds())
                .with_scales(scales(0.0, 1.0, 0.0)),
        );
        assert_eq!(downsampler.downsample(), Some(datasets));
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(vec![state_dataset("a", &[(0.0, "A")])])
                .with_dataset_bounds(bounds()),
        );
        downsampler.update(StateUpdate::new().with_scales(scales(0.0, 1.0, 10.0)));

        let state = downsampler.state();
        assert_eq!(state.datasets().len(), 1);
        assert!(state.dataset_bounds().is_some());
        assert!(state.scales().is_some());
    }

    #[test]
    fn test_scenario_resolution() {
        let dataset = state_dataset("s", &[(0.0, "IDLE"), (0.1, "ACTIVE"), (0.9, "IDLE")]);
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(vec![dataset.clone()])
                .with_dataset_bounds(bounds())
                .with_scales(scales(0.0, 1.0, 10.0)),
        );

        let out = downsampler.downsample().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].meta, dataset.meta);
        assert_eq!(
            out[0].points,
            vec![
                PlotPoint::Marker {
                    x: 0.0,
                    y: 3.0,
                    states: vec!["IDLE".to_string(), "ACTIVE".to_string()],
                },
                StatePoint::new(0.1, 3.0).with_label("ACTIVE").into(),
                StatePoint::new(0.9, 3.0).with_label("IDLE").into(),
            ]
        );
    }

    #[test]
    fn test_x_is_snapped_to_column_start() {
        let dataset = state_dataset("s", &[(0.05, "ON"), (0.15, "ON")]);
        let point = resolve_point(&dataset, OutputPoint::Sample { x: 0.0, index: 1 }, 3.0);
        assert_eq!(point, StatePoint::new(0.0, 3.0).with_label("ON").into());
    }

    #[test]
    fn test_gaps_are_explicit() {
        let dataset = Dataset::new(
            meta("g"),
            vec![
                StatePoint::new(0.0, f64::NAN).with_label("A").into(),
                PlotPoint::Gap,
                StatePoint::new(0.2, 1.0).with_label("B").into(),
            ],
        );

        let nan_y = resolve_point(&dataset, OutputPoint::Sample { x: 0.0, index: 0 }, 1.0);
        let gap = resolve_point(&dataset, OutputPoint::Sample { x: 0.1, index: 1 }, 1.0);
        let missing = resolve_point(&dataset, OutputPoint::Sample { x: 0.3, index: 99 }, 1.0);
        let nan_x = resolve_point(&dataset, OutputPoint::Sample { x: f64::NAN, index: 2 }, 1.0);
        for point in [nan_y, gap, missing, nan_x] {
            assert_eq!(point, PlotPoint::Gap);
            assert!(point.x().is_nan() && point.y().is_nan() && point.value().is_nan());
        }
    }

    #[test]
    fn test_gap_sample_survives_downsampling() {
        let dataset = Dataset::new(
            meta("g"),
            vec![
                StatePoint::new(0.0, 1.0).with_label("A").into(),
                PlotPoint::Gap,
                StatePoint::new(0.5, 1.0).with_label("B").into(),
            ],
        );
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(vec![dataset])
                .with_dataset_bounds(bounds())
                .with_scales(scales(0.0, 1.0, 10.0)),
        );
        let out = downsampler.downsample().unwrap();
        assert_eq!(out[0].points.iter().filter(|p| p.is_gap()).count(), 1);
        assert_eq!(out[0].len(), 3);
    }

    #[test]
    fn test_gap_inside_open_column_breaks_line_in_place() {
        let dataset = Dataset::new(
            meta("g"),
            vec![
                StatePoint::new(0.0, 1.0).with_label("A").into(),
                StatePoint::new(0.05, 1.0).with_label("A").into(),
                PlotPoint::Gap,
                StatePoint::new(0.5, 2.0).with_label("B").into(),
            ],
        );
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(vec![dataset])
                .with_dataset_bounds(bounds())
                .with_scales(scales(0.0, 1.0, 10.0)),
        );

        let out = downsampler.downsample().unwrap();
        assert_eq!(
            out[0].points,
            vec![
                StatePoint::new(0.0, 1.0).with_label("A").into(),
                PlotPoint::Gap,
                StatePoint::new(0.5, 2.0).with_label("B").into(),
            ]
        );
    }

    #[test]
    fn test_leading_gap_keeps_marker_height() {
        let dataset = Dataset::new(
            meta("g"),
            vec![
                PlotPoint::Gap,
                StatePoint::new(0.0, 4.0).with_label("A").into(),
                StatePoint::new(0.01, 5.0).with_label("B").into(),
            ],
        );
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(vec![dataset])
                .with_dataset_bounds(bounds())
                .with_scales(scales(0.0, 1.0, 10.0)),
        );

        let out = downsampler.downsample().unwrap();
        assert_eq!(out[0].points[0], PlotPoint::Gap);
        assert_eq!(
            out[0].points[1],
            PlotPoint::Marker {
                x: 0.0,
                y: 4.0,
                states: vec!["A".to_string(), "B".to_string()],
            }
        );
    }

    #[test]
    fn test_fair_budget_split() {
        let config = DownsampleConfig {
            global_point_budget: 1000,
            ..DownsampleConfig::default()
        };
        let mut downsampler = Downsampler::new(config);
        assert_eq!(downsampler.points_per_dataset(), 1000);

        let tiny = state_dataset("tiny", &[(0.0, "A")]);
        let big: Vec<(f64, &str)> = (0..10_000).map(|i| (i as f64 * 1e-4, "B")).collect();
        let big = state_dataset("big", &big);
        downsampler.update(StateUpdate::new().with_datasets(vec![tiny.clone(), big, tiny]));
        assert_eq!(downsampler.points_per_dataset(), 333);
    }

    #[test]
    fn test_budget_limits_each_dataset() {
        let config = DownsampleConfig {
            global_point_budget: 40,
            ..DownsampleConfig::default()
        };
        let labels = ["A", "B", "C"];
        let datasets: Vec<Dataset> = (0..2)
            .map(|n| {
                let points: Vec<(f64, &str)> = (0..5_000)
                    .map(|i| (i as f64 * 2e-4, labels[(i + n) % 3]))
                    .collect();
                state_dataset(&format!("d{}", n), &points)
            })
            .collect();

        let mut downsampler = Downsampler::new(config);
        downsampler.update(
            StateUpdate::new()
                .with_datasets(datasets)
                .with_dataset_bounds(bounds())
                .with_scales(scales(0.0, 1.0, 1000.0)),
        );
        let out = downsampler.downsample().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].meta.name, "d0");
        assert_eq!(out[1].meta.name, "d1");
        for dataset in &out {
            // 20 points of budget: 10 columns of at most two points
            assert!(dataset.len() <= 20, "{} has {}", dataset.meta.name, dataset.len());
        }
    }

    #[test]
    fn test_downsample_is_idempotent() {
        let labels = ["A", "B", "A", "C"];
        let points: Vec<(f64, &str)> = (0..2_000).map(|i| (i as f64 * 5e-4, labels[i % 4])).collect();
        let mut downsampler = Downsampler::new(DownsampleConfig::default());
        downsampler.update(
            StateUpdate::new()
                .with_datasets(vec![state_dataset("s", &points)])
                .with_dataset_bounds(bounds())
                .with_scales(scales(0.0, 1.0, 200.0)),
        );
        assert_eq!(downsampler.downsample(), downsampler.downsample());
    }
}
