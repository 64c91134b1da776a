//! Host-tunable downsampling settings
//!
//! Stored as pretty-printed JSON. Missing fields fall back to the defaults in
//! [`crate::constants::downsample`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::downsample::{BUFFER_RATIO, GLOBAL_POINT_BUDGET, MIN_POINTS_PER_PIXEL};
use crate::downsample::StateAggregator;
use crate::error::{Result, TraceError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsampleConfig {
    /// Points shared by all datasets of one chart
    pub global_point_budget: usize,
    /// Device pixels per aggregation column
    pub min_points_per_pixel: f64,
    /// Share of the visible x-range processed beyond each viewport edge
    pub buffer_ratio: f64,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            global_point_budget: GLOBAL_POINT_BUDGET,
            min_points_per_pixel: MIN_POINTS_PER_PIXEL,
            buffer_ratio: BUFFER_RATIO,
        }
    }
}

impl DownsampleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.global_point_budget == 0 {
            return Err(TraceError::Config(
                "global_point_budget must be at least 1".to_string(),
            ));
        }
        if !(self.min_points_per_pixel.is_finite() && self.min_points_per_pixel >= 1.0) {
            return Err(TraceError::Config(format!(
                "min_points_per_pixel must be >= 1, got {}",
                self.min_points_per_pixel
            )));
        }
        if !(self.buffer_ratio.is_finite() && self.buffer_ratio >= 0.0) {
            return Err(TraceError::Config(format!(
                "buffer_ratio must be >= 0, got {}",
                self.buffer_ratio
            )));
        }
        Ok(())
    }

    pub fn aggregator(&self) -> StateAggregator {
        StateAggregator {
            min_points_per_pixel: self.min_points_per_pixel,
            buffer_ratio: self.buffer_ratio,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(TraceError::FileIo(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
