//! Champion model registry with an etag-keyed cache.
//!
//! The registry is a thin view over an [`ObjectStore`]: one prefix, one
//! well-known key, holding the serialized champion [`Predictor`]. Reads
//! hash the stored bytes and reuse the cached deserialization while the
//! digest is unchanged.

use crate::error::PipelineError;
use crate::model::Predictor;
use crate::store::ObjectStore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct CachedChampion {
    etag: String,
    predictor: Predictor,
}

pub struct ModelRegistry {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    key: String,
    cache: Mutex<Option<CachedChampion>>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            key: key.into(),
            cache: Mutex::new(None),
        }
    }

    /// Full object key of the champion slot.
    pub fn champion_key(&self) -> String {
        format!("{}/{}", self.prefix, self.key)
    }

    pub async fn champion_exists(&self) -> Result<bool, PipelineError> {
        self.store.exists(&self.champion_key()).await
    }

    /// Load the current champion, or `None` when the slot is empty.
    /// Re-deserializes only when the stored bytes changed since the
    /// last load.
    pub async fn load_champion(&self) -> Result<Option<Predictor>, PipelineError> {
        let key = self.champion_key();
        if !self.store.exists(&key).await? {
            return Ok(None);
        }
        let bytes = self.store.get(&key).await?;
        let etag = etag_of(&bytes);

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.etag == etag {
                debug!(etag = %etag, "champion cache hit");
                return Ok(Some(cached.predictor.clone()));
            }
        }

        let predictor: Predictor = serde_json::from_slice(&bytes)
            .map_err(|e| PipelineError::registry(format!("corrupt champion object: {e}")))?;
        debug!(etag = %etag, "champion cache refreshed");
        *cache = Some(CachedChampion {
            etag,
            predictor: predictor.clone(),
        });
        Ok(Some(predictor))
    }

    /// Overwrite the champion slot and prime the cache with the new
    /// bytes.
    pub async fn save_champion(&self, predictor: &Predictor) -> Result<String, PipelineError> {
        let key = self.champion_key();
        let bytes = serde_json::to_vec_pretty(predictor)?;
        self.store.put(&key, &bytes).await?;
        let mut cache = self.cache.lock().await;
        *cache = Some(CachedChampion {
            etag: etag_of(&bytes),
            predictor: predictor.clone(),
        });
        Ok(key)
    }
}

fn etag_of(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataFrame;
    use crate::model::{ModelHyperparams, Preprocessor};
    use crate::schema::{DatasetSchema, LabelMapping};
    use crate::store::LocalObjectStore;

    fn toy_predictor(n_trees: usize) -> Predictor {
        let schema = DatasetSchema {
            columns: vec!["x".into(), "label".into()],
            columns_to_drop: vec![],
            target_column: "label".into(),
            numerical_features: vec!["x".into()],
            categorical_features: vec![],
            label_mapping: LabelMapping::default(),
        };
        let rows: Vec<Vec<serde_json::Value>> =
            (0..20).map(|i| vec![serde_json::json!(i as f64)]).collect();
        let frame = DataFrame::new(vec!["x".into()], rows);
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 0.0 } else { 1.0 }).collect();
        let pre = Preprocessor::fit(&frame, &schema).unwrap();
        let x = pre.transform(&frame).unwrap();
        let model = ModelHyperparams::RandomForest {
            n_trees,
            max_depth: 3,
        }
        .fit(&x, &y, 42)
        .unwrap();
        Predictor::new(pre, model)
    }

    #[tokio::test]
    async fn test_empty_slot_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path()));
        let registry = ModelRegistry::new(store, "model-registry", "model.json");
        assert!(!registry.champion_exists().await.unwrap());
        assert!(registry.load_champion().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path()));
        let registry = ModelRegistry::new(store, "model-registry", "model.json");

        let predictor = toy_predictor(5);
        let key = registry.save_champion(&predictor).await.unwrap();
        assert_eq!(key, "model-registry/model.json");
        assert!(registry.champion_exists().await.unwrap());

        let loaded = registry.load_champion().await.unwrap().unwrap();
        let frame = DataFrame::new(
            vec!["x".into()],
            vec![vec![serde_json::json!(1.0)], vec![serde_json::json!(18.0)]],
        );
        assert_eq!(
            predictor.predict(&frame).unwrap(),
            loaded.predict(&frame).unwrap()
        );
    }

    #[tokio::test]
    async fn test_cache_refreshes_when_object_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<LocalObjectStore> = Arc::new(LocalObjectStore::new(dir.path()));
        let registry = ModelRegistry::new(store.clone(), "model-registry", "model.json");

        registry.save_champion(&toy_predictor(3)).await.unwrap();
        registry.load_champion().await.unwrap().unwrap();

        // Replace the object behind the registry's back.
        let replacement = serde_json::to_vec_pretty(&toy_predictor(9)).unwrap();
        store
            .put("model-registry/model.json", &replacement)
            .await
            .unwrap();

        let reloaded = registry.load_champion().await.unwrap().unwrap();
        let n_trees = match &reloaded.model {
            crate::model::TrainedModel::RandomForest(m) => m.n_trees,
            _ => panic!("unexpected family"),
        };
        assert_eq!(n_trees, 9);
    }

    #[tokio::test]
    async fn test_corrupt_object_is_a_registry_error() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<LocalObjectStore> = Arc::new(LocalObjectStore::new(dir.path()));
        store
            .put("model-registry/model.json", b"not json")
            .await
            .unwrap();
        let registry = ModelRegistry::new(store, "model-registry", "model.json");
        let err = registry.load_champion().await.unwrap_err();
        assert!(matches!(err, PipelineError::Registry(_)));
    }
}
