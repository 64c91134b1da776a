//! trace-oxide: adaptive downsampling for large state-transition charts
//!
//! The [`downsample`] module keeps the number of points handed to a renderer
//! bounded no matter how large the input is, while preserving which states
//! occurred in every pixel column and marking gaps explicitly.
//!
//! ```no_run
//! use trace_oxide::data::demo_states;
//! use trace_oxide::downsample::{Downsampler, Scale, Scales, StateUpdate};
//! use trace_oxide::DownsampleConfig;
//!
//! let dataset = demo_states(100_000);
//! let bounds = dataset.bounds().unwrap();
//! let mut downsampler = Downsampler::new(DownsampleConfig::default());
//! downsampler.update(
//!     StateUpdate::new()
//!         .with_datasets(vec![dataset])
//!         .with_dataset_bounds(bounds)
//!         .with_scales(Scales {
//!             x: Scale { min: 0.0, max: 100.0, pixel_start: 0.0, pixel_end: 800.0 },
//!             y: Scale { min: 0.0, max: 4.0, pixel_start: 400.0, pixel_end: 0.0 },
//!         }),
//! );
//! let reduced = downsampler.downsample().unwrap();
//! assert!(reduced[0].len() <= 5000);
//! ```

pub mod config;
pub mod constants;
pub mod data;
pub mod downsample;
pub mod error;

pub use config::DownsampleConfig;
pub use error::{Result, TraceError};
