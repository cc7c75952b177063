//! Object store collaborator.
//!
//! The model registry lives in an external blob store keyed by string
//! paths. The pipeline only needs a narrow key-value surface; the
//! filesystem implementation below is used for local runs and tests,
//! and a cloud-backed implementation can slot in behind the same trait.

use crate::data::frame::DataFrame;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Key-value blob store keyed by string paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, PipelineError>;

    /// Read the full object at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError>;

    /// Write `data` at `key`, replacing any existing object.
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), PipelineError>;

    /// Upload a local file to `key`.
    async fn upload(&self, local: &Path, key: &str) -> Result<(), PipelineError> {
        let data = tokio::fs::read(local).await?;
        self.put(key, &data).await
    }

    /// Download the object at `key` to a local file.
    async fn download(&self, key: &str, local: &Path) -> Result<(), PipelineError> {
        let data = self.get(key).await?;
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local, data).await?;
        Ok(())
    }

    /// Write a frame as a CSV object.
    async fn put_frame_csv(&self, key: &str, frame: &DataFrame) -> Result<(), PipelineError> {
        self.put(key, frame.to_csv_string().as_bytes()).await
    }

    /// Read a CSV object into a frame.
    async fn get_frame_csv(&self, key: &str) -> Result<DataFrame, PipelineError> {
        let data = self.get(key).await?;
        let text = String::from_utf8(data)
            .map_err(|e| PipelineError::registry(format!("object at {key} is not UTF-8: {e}")))?;
        DataFrame::from_csv_str(&text)
    }
}

/// Filesystem-backed object store rooted at a directory. Keys map to
/// relative paths under the root.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn exists(&self, key: &str) -> Result<bool, PipelineError> {
        Ok(self.resolve(key).exists())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        let path = self.resolve(key);
        tokio::fs::read(&path)
            .await
            .map_err(|e| PipelineError::registry(format!("cannot read object {key}: {e}")))
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<(), PipelineError> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_exists() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());

        assert!(!store.exists("model-registry/model.json").await.unwrap());
        store
            .put("model-registry/model.json", b"{}")
            .await
            .unwrap();
        assert!(store.exists("model-registry/model.json").await.unwrap());
        assert_eq!(store.get("model-registry/model.json").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.put("slot", b"old").await.unwrap();
        store.put("slot", b"new").await.unwrap();
        assert_eq!(store.get("slot").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_upload_download_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path().join("store"));

        let src = dir.path().join("model.json");
        std::fs::write(&src, b"bundle").unwrap();
        store.upload(&src, "registry/model.json").await.unwrap();

        let dst = dir.path().join("fetched.json");
        store.download("registry/model.json", &dst).await.unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"bundle");
    }

    #[tokio::test]
    async fn test_frame_csv_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());
        let frame = DataFrame::from_csv_str("a,b\n1,x\n").unwrap();
        store.put_frame_csv("data.csv", &frame).await.unwrap();
        let back = store.get_frame_csv("data.csv").await.unwrap();
        assert_eq!(back.columns, frame.columns);
        assert_eq!(back.rows, frame.rows);
    }
}
