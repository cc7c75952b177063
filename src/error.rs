//! Error types for the trackhit pipeline.

use thiserror::Error;

/// Top-level error type for pipeline operations.
///
/// Each fatal error carries the originating stage in its variant so a
/// failed run can be traced back to the first broken stage from the
/// message alone.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A negative validation verdict. Not an I/O failure: the report was
    /// written and the verdict is false, so downstream stages must not run.
    #[error("Data validation rejected the dataset: {0}")]
    ValidationRejected(String),

    #[error("Transformation error: {0}")]
    Transformation(String),

    #[error("Training error: {0}")]
    Training(String),

    /// Every hyperparameter trial failed to fit or score.
    #[error("No viable model found: all {0} trials failed")]
    NoViableModel(usize),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Promotion error: {0}")]
    Promotion(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Schema file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    pub fn ingestion(msg: impl Into<String>) -> Self {
        Self::Ingestion(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transformation(msg: impl Into<String>) -> Self {
        Self::Transformation(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    pub fn promotion(msg: impl Into<String>) -> Self {
        Self::Promotion(msg.into())
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
