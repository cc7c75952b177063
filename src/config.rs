//! Configuration entities for the training pipeline.
//!
//! A run is namespaced by a generation timestamp; every stage config
//! derives its artifact paths from that run directory, so a new run
//! never touches a previous run's tree.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Artifact tree layout.
pub const ARTIFACT_DIR: &str = "artifacts";
pub const DATA_INGESTION_DIR: &str = "data_ingestion";
pub const RAW_DATA_DIR: &str = "raw_data";
pub const INGESTED_DIR: &str = "ingested";
pub const RAW_DATA_FILE: &str = "dataset.csv";
pub const TRAIN_FILE: &str = "train.csv";
pub const TEST_FILE: &str = "test.csv";
pub const DATA_VALIDATION_DIR: &str = "data_validation";
pub const VALIDATION_REPORT_FILE: &str = "report.json";
pub const DATA_TRANSFORMATION_DIR: &str = "data_transformation";
pub const TRANSFORMED_OBJECT_DIR: &str = "object";
pub const TRANSFORMED_DATA_DIR: &str = "transformed_data";
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
pub const TRANSFORMED_TRAIN_FILE: &str = "transformed_train_data.json";
pub const TRANSFORMED_TEST_FILE: &str = "transformed_test_data.json";
pub const MODEL_TRAINER_DIR: &str = "model_trainer";
pub const TRAINED_MODEL_FILE: &str = "model.json";
pub const TRAINER_REPORT_DIR: &str = "reports";
pub const TRAINER_REPORT_FILE: &str = "model_report.json";
pub const TRAINER_TRIALS_FILE: &str = "trials.json";

// Model registry layout: the production slot is always exactly one key.
pub const MODEL_REGISTRY_PREFIX: &str = "model-registry";
pub const MODEL_REGISTRY_KEY: &str = "model.json";

// Reproducibility and search defaults.
pub const TRAIN_TEST_SPLIT_RATIO: f64 = 0.30;
pub const SPLIT_SEED: u64 = 42;
pub const TRIAL_BUDGET: usize = 20;
pub const CHANGED_THRESHOLD_SCORE: f64 = 0.02;

pub const SCHEMA_FILE_PATH: &str = "config/schema.yaml";

fn default_split_ratio() -> f64 {
    TRAIN_TEST_SPLIT_RATIO
}

fn default_seed() -> u64 {
    SPLIT_SEED
}

fn default_trial_budget() -> usize {
    TRIAL_BUDGET
}

fn default_changed_threshold() -> f64 {
    CHANGED_THRESHOLD_SCORE
}

fn default_registry_prefix() -> String {
    MODEL_REGISTRY_PREFIX.to_string()
}

fn default_registry_key() -> String {
    MODEL_REGISTRY_KEY.to_string()
}

/// Top-level pipeline configuration: the run directory plus every
/// stage's config, all derived from one timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub run_id: String,
    pub artifact_dir: PathBuf,
    pub ingestion: IngestionConfig,
    pub validation: ValidationConfig,
    pub transformation: TransformationConfig,
    pub trainer: TrainerConfig,
    pub evaluation: EvaluationConfig,
    pub pusher: PusherConfig,
}

impl PipelineConfig {
    /// Build a run-scoped config under `root/artifacts/<timestamp>`.
    pub fn new(root: &Path) -> Self {
        let run_id = Utc::now().format("%m_%d_%Y_%H_%M_%S").to_string();
        Self::with_run_id(root, &run_id)
    }

    /// Build a config with an explicit run id (tests pin this for
    /// deterministic paths).
    pub fn with_run_id(root: &Path, run_id: &str) -> Self {
        let artifact_dir = root.join(ARTIFACT_DIR).join(run_id);
        Self {
            run_id: run_id.to_string(),
            ingestion: IngestionConfig::new(&artifact_dir),
            validation: ValidationConfig::new(&artifact_dir),
            transformation: TransformationConfig::new(&artifact_dir),
            trainer: TrainerConfig::new(&artifact_dir),
            evaluation: EvaluationConfig::default(),
            pusher: PusherConfig::default(),
            artifact_dir,
        }
    }
}

/// Data ingestion stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    pub raw_data_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl IngestionConfig {
    pub fn new(artifact_dir: &Path) -> Self {
        let stage_dir = artifact_dir.join(DATA_INGESTION_DIR);
        Self {
            raw_data_path: stage_dir.join(RAW_DATA_DIR).join(RAW_DATA_FILE),
            train_path: stage_dir.join(INGESTED_DIR).join(TRAIN_FILE),
            test_path: stage_dir.join(INGESTED_DIR).join(TEST_FILE),
            split_ratio: default_split_ratio(),
            seed: default_seed(),
        }
    }
}

/// Data validation stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub report_path: PathBuf,
}

impl ValidationConfig {
    pub fn new(artifact_dir: &Path) -> Self {
        Self {
            report_path: artifact_dir
                .join(DATA_VALIDATION_DIR)
                .join(VALIDATION_REPORT_FILE),
        }
    }
}

/// Data transformation stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    pub preprocessor_path: PathBuf,
    pub transformed_train_path: PathBuf,
    pub transformed_test_path: PathBuf,
}

impl TransformationConfig {
    pub fn new(artifact_dir: &Path) -> Self {
        let stage_dir = artifact_dir.join(DATA_TRANSFORMATION_DIR);
        Self {
            preprocessor_path: stage_dir.join(TRANSFORMED_OBJECT_DIR).join(PREPROCESSOR_FILE),
            transformed_train_path: stage_dir
                .join(TRANSFORMED_DATA_DIR)
                .join(TRANSFORMED_TRAIN_FILE),
            transformed_test_path: stage_dir
                .join(TRANSFORMED_DATA_DIR)
                .join(TRANSFORMED_TEST_FILE),
        }
    }
}

/// Model-selection stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub trained_model_path: PathBuf,
    pub report_path: PathBuf,
    pub trials_path: PathBuf,
    #[serde(default = "default_trial_budget")]
    pub n_trials: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl TrainerConfig {
    pub fn new(artifact_dir: &Path) -> Self {
        let stage_dir = artifact_dir.join(MODEL_TRAINER_DIR);
        Self {
            trained_model_path: stage_dir.join(TRAINED_MODEL_FILE),
            report_path: stage_dir.join(TRAINER_REPORT_DIR).join(TRAINER_REPORT_FILE),
            trials_path: stage_dir.join(TRAINER_REPORT_DIR).join(TRAINER_TRIALS_FILE),
            n_trials: default_trial_budget(),
            seed: default_seed(),
        }
    }
}

/// Model evaluation stage configuration.
///
/// `changed_threshold` mirrors the deployed system's constant. It is
/// recorded for observability but does not enter the acceptance rule:
/// acceptance is strict `new > champion_or_zero`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_registry_prefix")]
    pub registry_prefix: String,
    #[serde(default = "default_registry_key")]
    pub registry_key: String,
    #[serde(default = "default_changed_threshold")]
    pub changed_threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            registry_prefix: default_registry_prefix(),
            registry_key: default_registry_key(),
            changed_threshold: default_changed_threshold(),
        }
    }
}

/// Model pusher stage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PusherConfig {
    #[serde(default = "default_registry_prefix")]
    pub registry_prefix: String,
    #[serde(default = "default_registry_key")]
    pub registry_key: String,
}

impl Default for PusherConfig {
    fn default() -> Self {
        Self {
            registry_prefix: default_registry_prefix(),
            registry_key: default_registry_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_scoped_paths() {
        let config = PipelineConfig::with_run_id(Path::new("/tmp/work"), "01_02_2026_00_00_00");
        assert!(config
            .ingestion
            .train_path
            .starts_with("/tmp/work/artifacts/01_02_2026_00_00_00"));
        assert!(config.ingestion.train_path.ends_with("ingested/train.csv"));
        assert!(config
            .validation
            .report_path
            .ends_with("data_validation/report.json"));
        assert_eq!(config.ingestion.split_ratio, TRAIN_TEST_SPLIT_RATIO);
        assert_eq!(config.trainer.n_trials, TRIAL_BUDGET);
    }

    #[test]
    fn test_registry_slot_is_shared_between_eval_and_pusher() {
        let config = PipelineConfig::with_run_id(Path::new("."), "run");
        assert_eq!(
            config.evaluation.registry_key,
            config.pusher.registry_key
        );
        assert_eq!(
            config.evaluation.registry_prefix,
            config.pusher.registry_prefix
        );
    }
}
