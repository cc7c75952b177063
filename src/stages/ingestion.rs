//! Data ingestion: fetch the dataset, snapshot it, split it.

use crate::config::IngestionConfig;
use crate::data::{DataFrame, DatasetProvider};
use crate::error::PipelineError;
use crate::persist::atomic_write;
use crate::stages::artifacts::IngestionArtifact;
use tracing::info;

pub struct DataIngestion<'a> {
    config: &'a IngestionConfig,
}

impl<'a> DataIngestion<'a> {
    pub fn new(config: &'a IngestionConfig) -> Self {
        Self { config }
    }

    /// Pull the dataset from the provider, snapshot the raw rows, and
    /// write the seeded train/test split. The partitions keep every raw
    /// column; validation checks them against the full schema and
    /// transformation applies the drop-list.
    pub async fn run(
        &self,
        provider: &dyn DatasetProvider,
    ) -> Result<IngestionArtifact, PipelineError> {
        let info = provider.source_info();
        info!(source = %info.location, "fetching dataset");
        let raw = provider.fetch().await?;
        if raw.row_count() == 0 {
            return Err(PipelineError::ingestion("provider returned an empty dataset"));
        }

        atomic_write(&self.config.raw_data_path, raw.to_csv_string().as_bytes())?;

        let (train, test) = raw.train_test_split(self.config.split_ratio, self.config.seed);
        if train.row_count() == 0 || test.row_count() == 0 {
            return Err(PipelineError::ingestion(format!(
                "split produced an empty partition ({} train / {} test rows)",
                train.row_count(),
                test.row_count()
            )));
        }

        atomic_write(&self.config.train_path, train.to_csv_string().as_bytes())?;
        atomic_write(&self.config.test_path, test.to_csv_string().as_bytes())?;
        info!(
            train_rows = train.row_count(),
            test_rows = test.row_count(),
            "ingestion complete"
        );

        Ok(IngestionArtifact {
            raw_data_path: self.config.raw_data_path.clone(),
            train_path: self.config.train_path.clone(),
            test_path: self.config.test_path.clone(),
        })
    }
}

/// Load one of the split files back into a frame.
pub fn load_split(path: &std::path::Path) -> Result<DataFrame, PipelineError> {
    let content = std::fs::read_to_string(path)?;
    DataFrame::from_csv_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::data::InMemoryProvider;

    fn dataset(n: usize) -> DataFrame {
        let rows = (0..n)
            .map(|i| {
                vec![
                    serde_json::json!(format!("t{i}")),
                    serde_json::json!(90.0 + i as f64),
                    serde_json::json!(if i % 2 == 0 { "hit" } else { "flop" }),
                ]
            })
            .collect();
        DataFrame::new(
            vec!["track_id".into(), "tempo".into(), "is_hit".into()],
            rows,
        )
    }

    #[tokio::test]
    async fn test_ingestion_writes_snapshot_and_splits() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_run_id(dir.path(), "run");
        let provider = InMemoryProvider::new(dataset(100));

        let artifact = DataIngestion::new(&config.ingestion)
            .run(&provider)
            .await
            .unwrap();

        let raw = load_split(&artifact.raw_data_path).unwrap();
        assert_eq!(raw.row_count(), 100);
        assert_eq!(raw.column_count(), 3);

        let train = load_split(&artifact.train_path).unwrap();
        let test = load_split(&artifact.test_path).unwrap();
        assert_eq!(train.row_count(), 70);
        assert_eq!(test.row_count(), 30);
        // Splits carry the full raw column set for validation.
        assert_eq!(train.columns, vec!["track_id", "tempo", "is_hit"]);
        assert_eq!(test.columns, vec!["track_id", "tempo", "is_hit"]);
    }

    #[tokio::test]
    async fn test_ingestion_rejects_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_run_id(dir.path(), "run");
        let provider = InMemoryProvider::new(DataFrame::new(
            vec!["track_id".into(), "tempo".into(), "is_hit".into()],
            vec![],
        ));

        let err = DataIngestion::new(&config.ingestion)
            .run(&provider)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Dataset(_) | PipelineError::Ingestion(_)));
    }
}
