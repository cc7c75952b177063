//! Artifact types passed between pipeline stages.
//!
//! Every stage consumes the artifact of the stage before it and
//! produces its own. The structs mirror the on-disk artifact tree, so a
//! finished run can be reconstructed from its artifact directory alone.

use crate::model::ClassificationMetrics;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output of data ingestion: the raw snapshot plus the split files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionArtifact {
    pub raw_data_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Output of data validation. The report is always written, even for a
/// rejected dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationArtifact {
    pub validation_status: bool,
    pub message: String,
    pub report_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// The serialized body of `report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub validation_status: bool,
    pub message: String,
}

/// Output of data transformation: the fitted preprocessor and both
/// transformed splits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationArtifact {
    pub preprocessor_path: PathBuf,
    pub transformed_train_path: PathBuf,
    pub transformed_test_path: PathBuf,
}

/// Numeric feature matrix with aligned labels, as persisted by the
/// transformation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayBundle {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

/// Output of model selection: the bundled predictor on disk plus its
/// held-out metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerArtifact {
    pub model_name: String,
    pub trained_model_path: PathBuf,
    pub report_path: PathBuf,
    pub metrics: ClassificationMetrics,
}

/// The serialized body of `model_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerReport {
    pub model_name: String,
    pub accuracy_score: f64,
    pub precision_score: f64,
    pub recall_score: f64,
}

/// Output of champion/challenger evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationArtifact {
    pub accepted: bool,
    pub registry_key: String,
    pub trained_model_path: PathBuf,
    pub new_accuracy: f64,
    pub champion_accuracy: f64,
    pub accuracy_delta: f64,
}

/// Output of promotion. `pushed_key` is `None` when evaluation rejected
/// the challenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PusherArtifact {
    pub registry_prefix: String,
    pub pushed_key: Option<String>,
}
