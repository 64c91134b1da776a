pub mod demo;
pub mod samples;
pub mod source;

// Re-export key types for convenience
pub use demo::demo_states;
pub use samples::iterate_samples;
pub use source::DataSource;
