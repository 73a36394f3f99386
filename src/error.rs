use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to load dataset from '{}': {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    #[error(
        "Dataset '{}' is missing required column(s): {}",
        path.display(),
        columns.join(", ")
    )]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Unknown measure: '{0}'")]
    UnknownMeasure(String),

    #[error("Unknown grouping key: '{0}'")]
    UnknownGroupKey(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProcessingError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ProcessingError::DataLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that make the source dataset unusable.
    pub fn is_data_load(&self) -> bool {
        matches!(
            self,
            ProcessingError::DataLoad { .. } | ProcessingError::MissingColumns { .. }
        )
    }
}
