//! Training pipeline orchestrator.
//!
//! The orchestrator owns the stage configs, the schema, the dataset
//! provider, and a single object-store handle. It walks a fixed state
//! machine; any stage error moves the run to `Failed` and surfaces the
//! error unchanged.

use crate::config::PipelineConfig;
use crate::data::DatasetProvider;
use crate::error::PipelineError;
use crate::registry::ModelRegistry;
use crate::schema::DatasetSchema;
use crate::stages::{
    DataIngestion, DataTransformation, DataValidation, ModelEvaluation, ModelPusher, ModelTrainer,
    PusherArtifact,
};
use crate::store::ObjectStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Run states, in stage order. `Failed` is reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Ingesting,
    Validating,
    Transforming,
    Training,
    Evaluating,
    Promoting,
    Done,
    Failed,
}

pub struct TrainingPipeline {
    config: PipelineConfig,
    schema: DatasetSchema,
    provider: Box<dyn DatasetProvider>,
    store: Arc<dyn ObjectStore>,
    state: PipelineState,
}

impl TrainingPipeline {
    pub fn new(
        config: PipelineConfig,
        schema: DatasetSchema,
        provider: Box<dyn DatasetProvider>,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, PipelineError> {
        schema.check()?;
        Ok(Self {
            config,
            schema,
            provider,
            store,
            state: PipelineState::Idle,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute the full run. On success the pipeline lands in `Done`
    /// whether or not the challenger was promoted; a rejected model is
    /// a completed run with a `None` pushed key.
    pub async fn run(&mut self) -> Result<PusherArtifact, PipelineError> {
        let result = self.run_stages().await;
        match &result {
            Ok(artifact) => {
                self.state = PipelineState::Done;
                info!(run_id = %self.config.run_id, pushed = ?artifact.pushed_key, "pipeline done");
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                error!(run_id = %self.config.run_id, state = ?self.state, error = %e, "pipeline failed");
            }
        }
        result
    }

    async fn run_stages(&mut self) -> Result<PusherArtifact, PipelineError> {
        info!(run_id = %self.config.run_id, "starting pipeline run");

        self.state = PipelineState::Ingesting;
        let ingestion = DataIngestion::new(&self.config.ingestion)
            .run(self.provider.as_ref())
            .await?;

        self.state = PipelineState::Validating;
        let validation = DataValidation::new(&self.config.validation, &self.schema)
            .run(&ingestion)
            .await?;
        if !validation.validation_status {
            return Err(PipelineError::ValidationRejected(validation.message));
        }

        self.state = PipelineState::Transforming;
        let transformation = DataTransformation::new(&self.config.transformation, &self.schema)
            .run(&validation)
            .await?;

        self.state = PipelineState::Training;
        let trainer = ModelTrainer::new(&self.config.trainer)
            .run(&transformation)
            .await?;

        let registry = ModelRegistry::new(
            self.store.clone(),
            self.config.evaluation.registry_prefix.clone(),
            self.config.evaluation.registry_key.clone(),
        );

        self.state = PipelineState::Evaluating;
        let evaluation = ModelEvaluation::new(&self.schema)
            .run(&validation, &trainer, &registry)
            .await?;

        self.state = PipelineState::Promoting;
        ModelPusher::new(&self.config.pusher)
            .run(&evaluation, &registry)
            .await
    }
}
