//! Model selection: bounded hyperparameter search over both model
//! families, then a from-scratch retrain of the winning assignment.

use crate::config::TrainerConfig;
use crate::error::PipelineError;
use crate::model::{ClassificationMetrics, ModelHyperparams, Predictor, Preprocessor};
use crate::persist::{atomic_write_json, load_json};
use crate::search::{SearchSpace, TpeSearch, TrialRecord};
use crate::stages::artifacts::{ArrayBundle, TrainerArtifact, TrainerReport, TransformationArtifact};
use tracing::{info, warn};

pub struct ModelTrainer<'a> {
    config: &'a TrainerConfig,
    space: SearchSpace,
}

impl<'a> ModelTrainer<'a> {
    pub fn new(config: &'a TrainerConfig) -> Self {
        Self {
            config,
            space: SearchSpace::default(),
        }
    }

    pub fn with_space(mut self, space: SearchSpace) -> Self {
        self.space = space;
        self
    }

    /// Run the trial budget, pick the best assignment by held-out
    /// accuracy, retrain it from scratch, and persist the deployable
    /// bundle plus the metric report.
    pub async fn run(
        &self,
        transformation: &TransformationArtifact,
    ) -> Result<TrainerArtifact, PipelineError> {
        let train: ArrayBundle = load_json(&transformation.transformed_train_path)?;
        let test: ArrayBundle = load_json(&transformation.transformed_test_path)?;
        let preprocessor: Preprocessor = load_json(&transformation.preprocessor_path)?;

        let (best_params, trials) = self.search(&train, &test)?;
        atomic_write_json(&self.config.trials_path, &trials)?;
        info!(params = ?best_params, "retraining winning assignment");

        let model = best_params.fit(&train.features, &train.labels, self.config.seed)?;
        let predictions = model.predict(&test.features);
        let metrics = ClassificationMetrics::compute(&test.labels, &predictions);
        let model_name = model.family().name().to_string();

        let predictor = Predictor::new(preprocessor, model);
        atomic_write_json(&self.config.trained_model_path, &predictor)?;
        atomic_write_json(
            &self.config.report_path,
            &TrainerReport {
                model_name: model_name.clone(),
                accuracy_score: metrics.accuracy,
                precision_score: metrics.precision,
                recall_score: metrics.recall,
            },
        )?;
        info!(
            model = %model_name,
            accuracy = metrics.accuracy,
            "model selection complete"
        );

        Ok(TrainerArtifact {
            model_name,
            trained_model_path: self.config.trained_model_path.clone(),
            report_path: self.config.report_path.clone(),
            metrics,
        })
    }

    /// One search run, returning the winning assignment together with
    /// every trial record for the audit trail. A trial that fails to
    /// fit is recorded and skipped; only a fully failed budget is
    /// fatal.
    fn search(
        &self,
        train: &ArrayBundle,
        test: &ArrayBundle,
    ) -> Result<(ModelHyperparams, Vec<TrialRecord>), PipelineError> {
        let mut search = TpeSearch::new(self.space.clone(), self.config.seed);
        for trial in 0..self.config.n_trials {
            let params = search.suggest();
            match self.score_trial(&params, train, test) {
                Ok(metrics) => {
                    info!(trial, accuracy = metrics.accuracy, params = ?params, "trial complete");
                    search.record_completed(params, metrics);
                }
                Err(e) => {
                    warn!(trial, error = %e, "trial failed");
                    search.record_failed(params);
                }
            }
        }

        match search.best() {
            Some(best) => {
                let params = best.params.clone();
                Ok((params, search.records().to_vec()))
            }
            None => Err(PipelineError::NoViableModel(self.config.n_trials)),
        }
    }

    fn score_trial(
        &self,
        params: &ModelHyperparams,
        train: &ArrayBundle,
        test: &ArrayBundle,
    ) -> Result<ClassificationMetrics, PipelineError> {
        let model = params.fit(&train.features, &train.labels, self.config.seed)?;
        let predictions = model.predict(&test.features);
        Ok(ClassificationMetrics::compute(&test.labels, &predictions))
    }
}
