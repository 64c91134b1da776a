//! Value-space to pixel mapping

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Closed value range along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Identity for [`AxisRange::include`]
    pub const EMPTY: AxisRange = AxisRange {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn include(self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    pub fn union(self, other: AxisRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Value-space rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl Bounds {
    pub fn union(self, other: Bounds) -> Self {
        Self {
            x: self.x.union(other.x),
            y: self.y.union(other.y),
        }
    }
}

/// One chart axis: the visible value range and the pixel span it is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
    pub pixel_start: f64,
    pub pixel_end: f64,
}

impl Scale {
    /// Pixel length, regardless of axis direction
    pub fn pixel_len(&self) -> f64 {
        (self.pixel_end - self.pixel_start).abs()
    }

    pub fn range(&self) -> AxisRange {
        AxisRange::new(self.min, self.max)
    }
}

/// The host chart's current axis scales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scales {
    pub x: Scale,
    pub y: Scale,
}

/// Visible value-space rectangle plus its size in pixels
///
/// Only constructible through validation, so the aggregator can rely on a
/// positive pixel width and a non-empty x-range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Bounds,
    width_px: f64,
    height_px: f64,
}

impl Viewport {
    pub fn new(bounds: Bounds, width_px: f64, height_px: f64) -> Result<Self> {
        if !(width_px.is_finite() && width_px > 0.0) {
            return Err(TraceError::invalid_viewport(format!(
                "width must be positive, got {}",
                width_px
            )));
        }
        if !(height_px.is_finite() && height_px >= 0.0) {
            return Err(TraceError::invalid_viewport(format!(
                "height must not be negative, got {}",
                height_px
            )));
        }
        let x = bounds.x;
        if !(x.min.is_finite() && x.max.is_finite() && x.max > x.min) {
            return Err(TraceError::invalid_viewport(format!(
                "x-range [{}, {}] is empty",
                x.min, x.max
            )));
        }
        if !(bounds.y.min.is_finite() && bounds.y.max.is_finite()) {
            return Err(TraceError::invalid_viewport("y-range is not finite"));
        }

        Ok(Self {
            bounds,
            width_px,
            height_px,
        })
    }

    pub fn from_scales(scales: &Scales) -> Result<Self> {
        let bounds = Bounds {
            x: scales.x.range(),
            y: scales.y.range(),
        };
        Self::new(bounds, scales.x.pixel_len(), scales.y.pixel_len())
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    pub fn height_px(&self) -> f64 {
        self.height_px
    }
}

/// Aggregation grid derived from a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intervals {
    /// Aggregation columns per x unit
    pub pixels_per_x_value: f64,
    pub pixels_per_y_value: f64,
}

/// Pixel-density calculator
///
/// Each aggregation column spans `min_points_per_pixel` device pixels and may
/// emit up to two points, so output stays near one point per pixel. A
/// `target_points` budget narrower than the viewport reduces the column count
/// further. There is always at least one column.
pub fn calculate_intervals(
    viewport: &Viewport,
    min_points_per_pixel: f64,
    target_points: Option<usize>,
) -> Intervals {
    let pixels_per_column = if min_points_per_pixel > 0.0 {
        min_points_per_pixel
    } else {
        1.0
    };

    let mut pixels = viewport.width_px();
    if let Some(target) = target_points {
        pixels = pixels.min(target as f64);
    }
    let columns = (pixels / pixels_per_column).floor().max(1.0);

    let y_span = viewport.bounds().y.span();
    let pixels_per_y_value = if y_span > 0.0 {
        viewport.height_px() / y_span
    } else {
        0.0
    };

    Intervals {
        pixels_per_x_value: columns / viewport.bounds().x.span(),
        pixels_per_y_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x_min: f64, x_max: f64) -> Bounds {
        Bounds {
            x: AxisRange::new(x_min, x_max),
            y: AxisRange::new(0.0, 10.0),
        }
    }

    #[test]
    fn test_viewport_rejects_bad_dimensions() {
        assert!(Viewport::new(bounds(0.0, 1.0), 0.0, 10.0).is_err());
        assert!(Viewport::new(bounds(0.0, 1.0), -5.0, 10.0).is_err());
        assert!(Viewport::new(bounds(0.0, 1.0), f64::NAN, 10.0).is_err());
        assert!(Viewport::new(bounds(1.0, 1.0), 10.0, 10.0).is_err());
        assert!(Viewport::new(bounds(0.0, f64::INFINITY), 10.0, 10.0).is_err());
        assert!(Viewport::new(bounds(0.0, 1.0), 10.0, 10.0).is_ok());
    }

    #[test]
    fn test_viewport_from_inverted_y_scale() {
        let scales = Scales {
            x: Scale {
                min: 0.0,
                max: 100.0,
                pixel_start: 50.0,
                pixel_end: 850.0,
            },
            y: Scale {
                min: -1.0,
                max: 1.0,
                pixel_start: 600.0,
                pixel_end: 100.0,
            },
        };
        let viewport = Viewport::from_scales(&scales).unwrap();
        assert_eq!(viewport.width_px(), 800.0);
        assert_eq!(viewport.height_px(), 500.0);
        assert_eq!(viewport.bounds().x, AxisRange::new(0.0, 100.0));
    }

    #[test]
    fn test_intervals_default_density() {
        let viewport = Viewport::new(bounds(0.0, 1.0), 10.0, 10.0).unwrap();
        let intervals = calculate_intervals(&viewport, 2.0, None);
        // 10px / 2px per column over one x unit
        assert_eq!(intervals.pixels_per_x_value, 5.0);
        assert_eq!(intervals.pixels_per_y_value, 1.0);
    }

    #[test]
    fn test_intervals_respect_target_budget() {
        let viewport = Viewport::new(bounds(0.0, 100.0), 1000.0, 10.0).unwrap();

        let wide = calculate_intervals(&viewport, 2.0, Some(5000));
        assert_eq!(wide.pixels_per_x_value, 5.0);

        let narrow = calculate_intervals(&viewport, 2.0, Some(100));
        assert_eq!(narrow.pixels_per_x_value, 0.5);

        let starved = calculate_intervals(&viewport, 2.0, Some(0));
        assert_eq!(starved.pixels_per_x_value, 0.01);
    }
}
