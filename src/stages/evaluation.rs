//! Champion/challenger evaluation against the model registry.

use crate::error::PipelineError;
use crate::model::ClassificationMetrics;
use crate::registry::ModelRegistry;
use crate::schema::DatasetSchema;
use crate::stages::artifacts::{EvaluationArtifact, TrainerArtifact, ValidationArtifact};
use crate::stages::ingestion::load_split;
use tracing::info;

pub struct ModelEvaluation<'a> {
    schema: &'a DatasetSchema,
}

impl<'a> ModelEvaluation<'a> {
    pub fn new(schema: &'a DatasetSchema) -> Self {
        Self { schema }
    }

    /// Score the current champion on this run's held-out split and
    /// compare. An empty registry scores zero, so the first trained
    /// model is always accepted. Ties are rejected.
    pub async fn run(
        &self,
        validation: &ValidationArtifact,
        trainer: &TrainerArtifact,
        registry: &ModelRegistry,
    ) -> Result<EvaluationArtifact, PipelineError> {
        let new_accuracy = trainer.metrics.accuracy;

        let champion_accuracy = match registry.load_champion().await? {
            Some(champion) => {
                let test =
                    load_split(&validation.test_path)?.drop_columns(&self.schema.columns_to_drop);
                let (features, labels) =
                    test.split_target(&self.schema.target_column, &self.schema.label_mapping)?;
                let predictions = champion.predict(&features)?;
                ClassificationMetrics::compute(&labels, &predictions).accuracy
            }
            None => {
                info!("no champion in registry, challenger scored against zero");
                0.0
            }
        };

        let accepted = new_accuracy > champion_accuracy;
        let accuracy_delta = new_accuracy - champion_accuracy;
        info!(
            accepted,
            new_accuracy, champion_accuracy, accuracy_delta, "evaluation complete"
        );

        Ok(EvaluationArtifact {
            accepted,
            registry_key: registry.champion_key(),
            trained_model_path: trainer.trained_model_path.clone(),
            new_accuracy,
            champion_accuracy,
            accuracy_delta,
        })
    }
}
