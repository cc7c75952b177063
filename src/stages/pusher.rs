//! Model promotion: upload the accepted challenger to the registry.

use crate::config::PusherConfig;
use crate::error::PipelineError;
use crate::model::Predictor;
use crate::persist::load_json;
use crate::registry::ModelRegistry;
use crate::stages::artifacts::{EvaluationArtifact, PusherArtifact};
use tracing::info;

pub struct ModelPusher<'a> {
    config: &'a PusherConfig,
}

impl<'a> ModelPusher<'a> {
    pub fn new(config: &'a PusherConfig) -> Self {
        Self { config }
    }

    /// Upload the challenger iff evaluation accepted it. A rejected run
    /// is still a successful run; it just pushes nothing.
    pub async fn run(
        &self,
        evaluation: &EvaluationArtifact,
        registry: &ModelRegistry,
    ) -> Result<PusherArtifact, PipelineError> {
        if !evaluation.accepted {
            info!("challenger rejected, registry left untouched");
            return Ok(PusherArtifact {
                registry_prefix: self.config.registry_prefix.clone(),
                pushed_key: None,
            });
        }

        let predictor: Predictor = load_json(&evaluation.trained_model_path)?;
        let key = registry.save_champion(&predictor).await?;
        info!(key = %key, "challenger promoted to champion");
        Ok(PusherArtifact {
            registry_prefix: self.config.registry_prefix.clone(),
            pushed_key: Some(key),
        })
    }
}
