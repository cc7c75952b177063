//! Hyperparameter search over the participating model families.

pub mod space;
pub mod tpe;

pub use space::SearchSpace;
pub use tpe::TpeSearch;

use crate::model::{ClassificationMetrics, ModelHyperparams};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Completed,
    Failed,
}

/// One evaluated hyperparameter assignment in a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub id: Uuid,
    pub number: usize,
    pub params: ModelHyperparams,
    pub metrics: Option<ClassificationMetrics>,
    pub status: TrialStatus,
}

impl TrialRecord {
    pub fn completed(number: usize, params: ModelHyperparams, metrics: ClassificationMetrics) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            params,
            metrics: Some(metrics),
            status: TrialStatus::Completed,
        }
    }

    pub fn failed(number: usize, params: ModelHyperparams) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            params,
            metrics: None,
            status: TrialStatus::Failed,
        }
    }

    /// Objective value for ranking trials. Failed trials never rank.
    pub fn accuracy(&self) -> Option<f64> {
        match self.status {
            TrialStatus::Completed => self.metrics.map(|m| m.accuracy),
            TrialStatus::Failed => None,
        }
    }
}
