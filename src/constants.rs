//! Crate-wide constants and default values
//!
//! Tunables live here so hosts can see every default in one place.
//! Anything a host may override at runtime is also carried by
//! [`DownsampleConfig`](crate::config::DownsampleConfig).

/// Downsampling engine defaults
pub mod downsample {
    /// Points shared by all datasets of one chart per downsample pass
    pub const GLOBAL_POINT_BUDGET: usize = 5000;

    /// Device pixels grouped into one aggregation column
    pub const MIN_POINTS_PER_PIXEL: f64 = 2.0;

    /// Share of the visible x-range processed on each side of the viewport
    pub const BUFFER_RATIO: f64 = 0.5;

    /// Label carried by synthetic "several states in this column" points
    pub const ELLIPSIS_LABEL: &str = "[…]";
}

/// Colors as `[r, g, b, a]`
pub mod colors {
    use crate::downsample::Rgba;

    /// Neutral color for elided segments
    pub const MARKER_COLOR: Rgba = [127, 127, 127, 255];

    /// Series palette (category10)
    pub const SERIES_PALETTE: [Rgba; 10] = [
        [31, 119, 180, 255],  // Blue
        [255, 127, 14, 255],  // Orange
        [44, 160, 44, 255],   // Green
        [214, 39, 40, 255],   // Red
        [148, 103, 189, 255], // Purple
        [140, 86, 75, 255],   // Brown
        [227, 119, 194, 255], // Pink
        [127, 127, 127, 255], // Gray
        [188, 189, 34, 255],  // Yellow
        [23, 190, 207, 255],  // Cyan
    ];
}

/// Viewer layout defaults
pub mod layout {
    /// Marker radius in points
    pub const MARKER_RADIUS: f32 = 3.0;

    /// Hover distance (in screen points) for the marker tooltip
    pub const HOVER_RADIUS: f32 = 8.0;

    /// Number of samples in the built-in demo trace
    pub const DEMO_SAMPLES: usize = 1_000_000;
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "trace-oxide.json";
}
