//! Model families, typed hyperparameters, and the deployable predictor
//! bundle.

use crate::data::frame::DataFrame;
use crate::error::PipelineError;
use crate::model::boosting::GradientBoostingClassifier;
use crate::model::forest::RandomForestClassifier;
use crate::model::preprocess::Preprocessor;
use serde::{Deserialize, Serialize};

/// The closed set of participating model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    RandomForest,
    GradientBoosting,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 2] = [ModelFamily::RandomForest, ModelFamily::GradientBoosting];

    pub fn name(&self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "RandomForestClassifier",
            ModelFamily::GradientBoosting => "GradientBoostingClassifier",
        }
    }
}

/// One hyperparameter assignment, strongly typed per family so search
/// and retrain logic pattern-match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelHyperparams {
    RandomForest {
        n_trees: usize,
        max_depth: usize,
    },
    GradientBoosting {
        n_trees: usize,
        max_depth: usize,
        learning_rate: f64,
    },
}

impl ModelHyperparams {
    pub fn family(&self) -> ModelFamily {
        match self {
            ModelHyperparams::RandomForest { .. } => ModelFamily::RandomForest,
            ModelHyperparams::GradientBoosting { .. } => ModelFamily::GradientBoosting,
        }
    }

    /// Fit a fresh model with this assignment. Used both for trial fits
    /// and for the final retrain-from-scratch of the winning assignment.
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64], seed: u64) -> Result<TrainedModel, PipelineError> {
        if x.is_empty() {
            return Err(PipelineError::training("empty training matrix"));
        }
        let model = match *self {
            ModelHyperparams::RandomForest { n_trees, max_depth } => TrainedModel::RandomForest(
                RandomForestClassifier::fit(x, y, n_trees, max_depth, seed),
            ),
            ModelHyperparams::GradientBoosting {
                n_trees,
                max_depth,
                learning_rate,
            } => TrainedModel::GradientBoosting(GradientBoostingClassifier::fit(
                x,
                y,
                n_trees,
                max_depth,
                learning_rate,
                seed,
            )),
        };
        Ok(model)
    }
}

/// A fitted classifier of either family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum TrainedModel {
    RandomForest(RandomForestClassifier),
    GradientBoosting(GradientBoostingClassifier),
}

impl TrainedModel {
    pub fn family(&self) -> ModelFamily {
        match self {
            TrainedModel::RandomForest(_) => ModelFamily::RandomForest,
            TrainedModel::GradientBoosting(_) => ModelFamily::GradientBoosting,
        }
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        match self {
            TrainedModel::RandomForest(m) => m.predict(x),
            TrainedModel::GradientBoosting(m) => m.predict(x),
        }
    }
}

/// Deployable bundle: the fitted preprocessing pipeline plus the
/// trained model. Callers hand it raw feature rows; preprocessing and
/// inference happen internally, never separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predictor {
    pub preprocessor: Preprocessor,
    pub model: TrainedModel,
}

impl Predictor {
    pub fn new(preprocessor: Preprocessor, model: TrainedModel) -> Self {
        Self {
            preprocessor,
            model,
        }
    }

    /// Score raw rows (drop-list already applied, target absent).
    pub fn predict(&self, frame: &DataFrame) -> Result<Vec<f64>, PipelineError> {
        let features = self.preprocessor.transform(frame)?;
        Ok(self.model.predict(&features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DatasetSchema, LabelMapping};

    fn schema() -> DatasetSchema {
        DatasetSchema {
            columns: vec!["tempo".into(), "is_hit".into()],
            columns_to_drop: vec![],
            target_column: "is_hit".into(),
            numerical_features: vec!["tempo".into()],
            categorical_features: vec![],
            label_mapping: LabelMapping::default(),
        }
    }

    fn training_frame() -> (DataFrame, Vec<f64>) {
        let rows: Vec<Vec<serde_json::Value>> =
            (0..40).map(|i| vec![serde_json::json!(i as f64)]).collect();
        let frame = DataFrame::new(vec!["tempo".into()], rows);
        let labels: Vec<f64> = (0..40).map(|i| if i < 20 { 0.0 } else { 1.0 }).collect();
        (frame, labels)
    }

    #[test]
    fn test_hyperparams_fit_dispatches_by_family() {
        let (frame, y) = training_frame();
        let pre = Preprocessor::fit(&frame, &schema()).unwrap();
        let x = pre.transform(&frame).unwrap();

        let rf = ModelHyperparams::RandomForest {
            n_trees: 10,
            max_depth: 4,
        };
        assert_eq!(rf.fit(&x, &y, 42).unwrap().family(), ModelFamily::RandomForest);

        let gb = ModelHyperparams::GradientBoosting {
            n_trees: 10,
            max_depth: 3,
            learning_rate: 0.2,
        };
        assert_eq!(
            gb.fit(&x, &y, 42).unwrap().family(),
            ModelFamily::GradientBoosting
        );
    }

    #[test]
    fn test_predictor_applies_preprocessing_internally() {
        let (frame, y) = training_frame();
        let pre = Preprocessor::fit(&frame, &schema()).unwrap();
        let x = pre.transform(&frame).unwrap();
        let model = ModelHyperparams::GradientBoosting {
            n_trees: 30,
            max_depth: 3,
            learning_rate: 0.3,
        }
        .fit(&x, &y, 42)
        .unwrap();

        let predictor = Predictor::new(pre, model);
        let preds = predictor.predict(&frame).unwrap();
        assert_eq!(preds, y);
    }

    #[test]
    fn test_predictor_bundle_serde_roundtrip() {
        let (frame, y) = training_frame();
        let pre = Preprocessor::fit(&frame, &schema()).unwrap();
        let x = pre.transform(&frame).unwrap();
        let model = ModelHyperparams::RandomForest {
            n_trees: 5,
            max_depth: 3,
        }
        .fit(&x, &y, 42)
        .unwrap();
        let predictor = Predictor::new(pre, model);

        let json = serde_json::to_string(&predictor).unwrap();
        let restored: Predictor = serde_json::from_str(&json).unwrap();
        assert_eq!(
            predictor.predict(&frame).unwrap(),
            restored.predict(&frame).unwrap()
        );
    }
}
