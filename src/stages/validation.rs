//! Data validation: check both splits against the dataset schema.

use crate::config::ValidationConfig;
use crate::error::PipelineError;
use crate::persist::atomic_write_json;
use crate::schema::DatasetSchema;
use crate::stages::artifacts::{IngestionArtifact, ValidationArtifact, ValidationReport};
use crate::stages::ingestion::load_split;
use tracing::{info, warn};

pub struct DataValidation<'a> {
    config: &'a ValidationConfig,
    schema: &'a DatasetSchema,
}

impl<'a> DataValidation<'a> {
    pub fn new(config: &'a ValidationConfig, schema: &'a DatasetSchema) -> Self {
        Self { config, schema }
    }

    /// Validate both splits. The verdict accumulates across all checks
    /// and the report is written whether the dataset passes or not; a
    /// negative verdict is data in the artifact, not an error.
    pub async fn run(
        &self,
        ingestion: &IngestionArtifact,
    ) -> Result<ValidationArtifact, PipelineError> {
        let train = load_split(&ingestion.train_path)?;
        let test = load_split(&ingestion.test_path)?;

        let expected = self.schema.column_count();
        let mut message = String::new();

        if train.column_count() != expected {
            message.push_str("Mismatch in number of columns in train set. ");
        }
        if test.column_count() != expected {
            message.push_str("Mismatch in number of columns in test set. ");
        }
        if !self.missing_columns(&train.columns).is_empty() {
            message.push_str("Missing columns in train set. ");
        }
        if !self.missing_columns(&test.columns).is_empty() {
            message.push_str("Missing columns in test set. ");
        }

        let validation_status = message.is_empty();
        let report = ValidationReport {
            validation_status,
            message: message.clone(),
        };
        atomic_write_json(&self.config.report_path, &report)?;

        if validation_status {
            info!("data validation passed");
        } else {
            warn!(message = %message, "data validation failed");
        }

        Ok(ValidationArtifact {
            validation_status,
            message,
            report_path: self.config.report_path.clone(),
            train_path: ingestion.train_path.clone(),
            test_path: ingestion.test_path.clone(),
        })
    }

    fn missing_columns(&self, present: &[String]) -> Vec<String> {
        self.schema
            .columns
            .iter()
            .filter(|c| !present.contains(c))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::persist::{atomic_write, load_json};
    use crate::schema::LabelMapping;
    use std::path::Path;

    fn schema() -> DatasetSchema {
        DatasetSchema {
            columns: vec!["track_id".into(), "tempo".into(), "is_hit".into()],
            columns_to_drop: vec!["track_id".into()],
            target_column: "is_hit".into(),
            numerical_features: vec!["tempo".into()],
            categorical_features: vec![],
            label_mapping: LabelMapping::default(),
        }
    }

    fn write_splits(dir: &Path, train_csv: &str, test_csv: &str) -> IngestionArtifact {
        let train_path = dir.join("train.csv");
        let test_path = dir.join("test.csv");
        atomic_write(&train_path, train_csv.as_bytes()).unwrap();
        atomic_write(&test_path, test_csv.as_bytes()).unwrap();
        IngestionArtifact {
            raw_data_path: dir.join("dataset.csv"),
            train_path,
            test_path,
        }
    }

    #[tokio::test]
    async fn test_conforming_splits_pass() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_run_id(dir.path(), "run");
        let schema = schema();
        let csv = "track_id,tempo,is_hit\nt0,120,hit\nt1,90,flop\n";
        let ingestion = write_splits(dir.path(), csv, csv);

        let artifact = DataValidation::new(&config.validation, &schema)
            .run(&ingestion)
            .await
            .unwrap();
        assert!(artifact.validation_status);
        assert_eq!(artifact.message, "");

        let report: ValidationReport = load_json(&artifact.report_path).unwrap();
        assert!(report.validation_status);
    }

    #[tokio::test]
    async fn test_missing_column_fails_with_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_run_id(dir.path(), "run");
        let schema = schema();
        let good = "track_id,tempo,is_hit\nt0,120,hit\n";
        let bad = "track_id,tempo\nt0,120\n";
        let ingestion = write_splits(dir.path(), good, bad);

        let artifact = DataValidation::new(&config.validation, &schema)
            .run(&ingestion)
            .await
            .unwrap();
        assert!(!artifact.validation_status);
        assert_eq!(
            artifact.message,
            "Mismatch in number of columns in test set. Missing columns in test set. "
        );

        let report: ValidationReport = load_json(&artifact.report_path).unwrap();
        assert!(!report.validation_status);
        assert_eq!(report.message, artifact.message);
    }

    #[tokio::test]
    async fn test_splits_lacking_a_dropped_column_still_fail() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_run_id(dir.path(), "run");
        let schema = schema();
        // track_id is on the drop-list, but the declared column set is
        // the contract: a dataset arriving without it is malformed.
        let csv = "tempo,is_hit\n120,hit\n90,flop\n";
        let ingestion = write_splits(dir.path(), csv, csv);

        let artifact = DataValidation::new(&config.validation, &schema)
            .run(&ingestion)
            .await
            .unwrap();
        assert!(!artifact.validation_status);
        assert_eq!(
            artifact.message,
            "Mismatch in number of columns in train set. \
             Mismatch in number of columns in test set. \
             Missing columns in train set. \
             Missing columns in test set. "
        );
    }

    #[tokio::test]
    async fn test_widening_a_conforming_split_cannot_unfail_it() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_run_id(dir.path(), "run");
        let schema = schema();
        // Extra column: count mismatch even though every required
        // column is present.
        let wide = "track_id,tempo,is_hit,extra\nt0,120,hit,1\n";
        let good = "track_id,tempo,is_hit\nt0,120,hit\n";
        let ingestion = write_splits(dir.path(), wide, good);

        let artifact = DataValidation::new(&config.validation, &schema)
            .run(&ingestion)
            .await
            .unwrap();
        assert!(!artifact.validation_status);
        assert_eq!(
            artifact.message,
            "Mismatch in number of columns in train set. "
        );
    }
}
