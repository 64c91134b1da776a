//! Dataset to sample normalization

use crate::constants::downsample::ELLIPSIS_LABEL;
use crate::downsample::{Dataset, PlotPoint, Sample};

/// Lazy, single-pass view of a dataset as aggregator samples
///
/// Each call yields a fresh iterator; an iterator must not be handed to the
/// aggregator twice. Gaps become unlabelled `NaN` samples so they pass
/// through aggregation untouched. Markers keep their ellipsis label.
pub fn iterate_samples(dataset: &Dataset) -> impl Iterator<Item = Sample<'_>> {
    dataset
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| match point {
            PlotPoint::Real(p) => Sample {
                x: p.x,
                y: p.y,
                label: p.label.as_deref(),
                index,
            },
            PlotPoint::Marker { x, y, .. } => Sample {
                x: *x,
                y: *y,
                label: Some(ELLIPSIS_LABEL),
                index,
            },
            PlotPoint::Gap => Sample {
                x: f64::NAN,
                y: f64::NAN,
                label: None,
                index,
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downsample::{DatasetMeta, StatePoint};

    #[test]
    fn test_samples_keep_dataset_positions() {
        let dataset = Dataset::new(
            DatasetMeta::new("s", [0, 0, 0, 255]),
            vec![
                StatePoint::new(0.0, 1.0).with_label("A").into(),
                PlotPoint::Gap,
                PlotPoint::Marker {
                    x: 2.0,
                    y: 1.0,
                    states: vec!["A".into(), "B".into()],
                },
                StatePoint::new(3.0, 2.0).into(),
            ],
        );

        let samples: Vec<_> = iterate_samples(&dataset).collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(samples[0].label, Some("A"));
        assert!(samples[1].x.is_nan() && samples[1].label.is_none());
        assert_eq!(samples[2].label, Some(ELLIPSIS_LABEL));
        assert_eq!(samples[3].label, None);
    }
}
