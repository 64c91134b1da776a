//! Error types for trace-oxide
//!
//! The downsampling core itself never fails on data shape: bad samples turn
//! into gaps. Errors here cover the edges around it (viewport construction,
//! file loading, configuration).

use thiserror::Error;

/// Main error type for trace-oxide operations
#[derive(Error, Debug)]
pub enum TraceError {
    /// File I/O error
    #[error("Failed to access file: {0}")]
    FileIo(#[from] std::io::Error),

    /// Polars data processing error
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Viewport that cannot map values to pixels
    #[error("Invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    /// Unsupported file format
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Column not found in data
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Empty dataset error
    #[error("Dataset is empty or has no rows")]
    EmptyDataset,
}

/// Result type alias for trace-oxide operations
pub type Result<T> = std::result::Result<T, TraceError>;

impl TraceError {
    pub(crate) fn invalid_viewport(reason: impl Into<String>) -> Self {
        TraceError::InvalidViewport {
            reason: reason.into(),
        }
    }

    /// Get a user-friendly error message suitable for displaying in UI
    pub fn user_message(&self) -> String {
        match self {
            TraceError::FileIo(e) => format!("File error: {}", e),
            TraceError::Polars(e) => format!("Data error: {}", e),
            TraceError::Json(e) => format!("JSON error: {}", e),
            TraceError::Config(msg) => format!("Config error: {}", msg),
            TraceError::InvalidViewport { reason } => format!("Viewport error: {}", reason),
            TraceError::UnsupportedFormat { extension } => {
                format!("Unsupported file format: '.{}'", extension)
            }
            TraceError::ColumnNotFound { column } => format!("Column '{}' not found", column),
            TraceError::EmptyDataset => "Dataset is empty".to_string(),
        }
    }

    /// Get a short title for the error (for toast notifications)
    pub fn title(&self) -> &'static str {
        match self {
            TraceError::FileIo(_) => "File Error",
            TraceError::Polars(_) => "Data Error",
            TraceError::Json(_) => "JSON Error",
            TraceError::Config(_) => "Configuration Error",
            TraceError::InvalidViewport { .. } => "Viewport Error",
            TraceError::UnsupportedFormat { .. } => "Unsupported Format",
            TraceError::ColumnNotFound { .. } => "Column Not Found",
            TraceError::EmptyDataset => "Empty Dataset",
        }
    }
}
