//! Gradient-boosted trees with logistic loss.
//!
//! The model is additive in log-odds space: starting from the training
//! base rate, each round fits a tree to the logistic gradients
//! (residuals `y − p`) with hessian weights `p(1−p)`, producing Newton
//! leaf steps scaled by the learning rate.

use crate::model::tree::{RegressionTree, TreeParams};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    pub n_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    init_logit: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingClassifier {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_trees: usize,
        max_depth: usize,
        learning_rate: f64,
        seed: u64,
    ) -> Self {
        let n = x.len().max(1) as f64;
        let positive_rate = (y.iter().sum::<f64>() / n).clamp(1e-6, 1.0 - 1e-6);
        let init_logit = (positive_rate / (1.0 - positive_rate)).ln();

        let params = TreeParams {
            max_depth,
            min_samples_split: 2,
            max_features: None,
        };

        let mut logits = vec![init_logit; x.len()];
        let mut trees = Vec::with_capacity(n_trees);
        for t in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
            let probs: Vec<f64> = logits.iter().map(|&z| sigmoid(z)).collect();
            let grad: Vec<f64> = y.iter().zip(&probs).map(|(&yi, &p)| yi - p).collect();
            let hess: Vec<f64> = probs.iter().map(|&p| (p * (1.0 - p)).max(1e-6)).collect();

            let tree = RegressionTree::fit_weighted(x, &grad, &hess, &params, &mut rng);
            for (z, row) in logits.iter_mut().zip(x) {
                *z += learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        Self {
            n_trees,
            max_depth,
            learning_rate,
            init_logit,
            trees,
        }
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> f64 {
        let mut z = self.init_logit;
        for tree in &self.trees {
            z += self.learning_rate * tree.predict_row(row);
        }
        sigmoid(z)
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| if self.predict_proba_row(row) > 0.5 { 1.0 } else { 0.0 })
            .collect()
    }
}
