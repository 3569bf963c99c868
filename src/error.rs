// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid URL '{url}': {reason}")]
    Validation { url: String, reason: String },

    #[error("could not fetch property facts for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("property facts are missing or non-numeric: {}", fields.join(", "))]
    IncompletePropertyFacts { fields: Vec<&'static str> },

    #[error("document {} could not be parsed: {message}", path.display())]
    StoreCorrupt { path: PathBuf, message: String },

    #[error("loan term must be at least one month, got {0}")]
    InvalidTerm(u32),

    #[error("monthly interest rate must be finite, got {0}")]
    InvalidRate(f64),

    #[error("assumptions cannot be used for this property: {0}")]
    InvalidAssumptions(String),

    #[error("configuration {} is invalid: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Stable name written into errors.log.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Validation { .. } => "ValidationError",
            AnalysisError::Fetch { .. } => "FetchError",
            AnalysisError::IncompletePropertyFacts { .. } => "IncompletePropertyFactsError",
            AnalysisError::StoreCorrupt { .. } => "StoreCorruptError",
            AnalysisError::InvalidTerm(_) => "InvalidTermError",
            AnalysisError::InvalidRate(_) => "InvalidRateError",
            AnalysisError::InvalidAssumptions(_) => "InvalidAssumptionsError",
            AnalysisError::Config { .. } => "ConfigError",
            AnalysisError::Io { .. } => "IoError",
            AnalysisError::Json(_) => "JsonError",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
