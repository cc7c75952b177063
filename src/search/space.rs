//! Typed search space for the two model families.

use crate::model::{ModelFamily, ModelHyperparams};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bounds for every tunable dimension, per family. The learning rate
/// is sampled on a log scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpace {
    pub forest_trees: (usize, usize),
    pub forest_depth: (usize, usize),
    pub boosting_trees: (usize, usize),
    pub boosting_depth: (usize, usize),
    pub boosting_learning_rate: (f64, f64),
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            forest_trees: (50, 200),
            forest_depth: (2, 10),
            boosting_trees: (50, 200),
            boosting_depth: (2, 10),
            boosting_learning_rate: (0.01, 0.3),
        }
    }
}

impl SearchSpace {
    /// Uniform draw of a family, then uniform draws within its bounds.
    pub fn sample_random(&self, rng: &mut StdRng) -> ModelHyperparams {
        let family = if rng.gen::<f64>() < 0.5 {
            ModelFamily::RandomForest
        } else {
            ModelFamily::GradientBoosting
        };
        self.sample_family(family, rng)
    }

    pub fn sample_family(&self, family: ModelFamily, rng: &mut StdRng) -> ModelHyperparams {
        match family {
            ModelFamily::RandomForest => ModelHyperparams::RandomForest {
                n_trees: rng.gen_range(self.forest_trees.0..=self.forest_trees.1),
                max_depth: rng.gen_range(self.forest_depth.0..=self.forest_depth.1),
            },
            ModelFamily::GradientBoosting => ModelHyperparams::GradientBoosting {
                n_trees: rng.gen_range(self.boosting_trees.0..=self.boosting_trees.1),
                max_depth: rng.gen_range(self.boosting_depth.0..=self.boosting_depth.1),
                learning_rate: self.sample_learning_rate(rng),
            },
        }
    }

    pub fn sample_learning_rate(&self, rng: &mut StdRng) -> f64 {
        let (lo, hi) = self.boosting_learning_rate;
        let log_lo = lo.ln();
        let log_hi = hi.ln();
        (log_lo + rng.gen::<f64>() * (log_hi - log_lo)).exp()
    }

    pub fn clamp_learning_rate(&self, lr: f64) -> f64 {
        lr.clamp(self.boosting_learning_rate.0, self.boosting_learning_rate.1)
    }
}
