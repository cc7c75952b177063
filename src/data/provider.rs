//! Dataset provider abstraction.
//!
//! Ingestion pulls the full raw dataset through this narrow interface;
//! whatever sits behind it (a CSV drop, a database export) is external
//! to the pipeline. Provider failures surface as ingestion errors.

use crate::data::frame::DataFrame;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Metadata about a provider, recorded for run audit.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProviderInfo {
    pub source_type: String,
    pub location: String,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
}

/// A source of the full raw tabular dataset.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Fetch the complete dataset.
    async fn fetch(&self) -> Result<DataFrame, PipelineError>;

    /// Return metadata about this source.
    fn source_info(&self) -> ProviderInfo;
}

/// CSV file on the local filesystem.
pub struct CsvFileProvider {
    pub path: PathBuf,
}

impl CsvFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetProvider for CsvFileProvider {
    async fn fetch(&self) -> Result<DataFrame, PipelineError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            PipelineError::dataset(format!(
                "cannot read dataset {}: {e}",
                self.path.display()
            ))
        })?;
        DataFrame::from_csv_str(&content)
    }

    fn source_info(&self) -> ProviderInfo {
        ProviderInfo {
            source_type: "csv".to_string(),
            location: self.path.display().to_string(),
            accessed_at: chrono::Utc::now(),
        }
    }
}

/// Fixed in-memory dataset, used by tests and demos.
pub struct InMemoryProvider {
    pub frame: DataFrame,
}

impl InMemoryProvider {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }
}

#[async_trait]
impl DatasetProvider for InMemoryProvider {
    async fn fetch(&self) -> Result<DataFrame, PipelineError> {
        if self.frame.row_count() == 0 {
            return Err(PipelineError::dataset("in-memory dataset is empty"));
        }
        Ok(self.frame.clone())
    }

    fn source_info(&self) -> ProviderInfo {
        ProviderInfo {
            source_type: "memory".to_string(),
            location: "<memory>".to_string(),
            accessed_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_csv_provider_fetch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracks.csv");
        std::fs::write(&path, "tempo,is_hit\n120,hit\n90,flop\n").unwrap();

        let provider = CsvFileProvider::new(&path);
        let frame = provider.fetch().await.unwrap();
        assert_eq!(frame.row_count(), 2);
        assert_eq!(provider.source_info().source_type, "csv");
    }

    #[tokio::test]
    async fn test_csv_provider_missing_file_is_dataset_error() {
        let provider = CsvFileProvider::new("/does/not/exist.csv");
        let err = provider.fetch().await.unwrap_err();
        assert!(matches!(err, PipelineError::Dataset(_)));
    }
}
