//! Random forest classifier: bagged CART trees with per-split feature
//! subsampling, averaging leaf probabilities.

use crate::model::tree::{RegressionTree, TreeParams};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_trees: usize,
    pub max_depth: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestClassifier {
    /// Fit `n_trees` trees on bootstrap resamples of the training rows.
    /// Each split considers √d features; per-tree seeds derive from
    /// `seed` so refits are reproducible.
    pub fn fit(x: &[Vec<f64>], y: &[f64], n_trees: usize, max_depth: usize, seed: u64) -> Self {
        let n = x.len();
        let n_features = x.first().map_or(0, |row| row.len());
        let max_features = (n_features as f64).sqrt().ceil() as usize;
        let params = TreeParams {
            max_depth,
            min_samples_split: 2,
            max_features: Some(max_features.max(1)),
        };

        let mut trees = Vec::with_capacity(n_trees);
        for t in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
            let mut bx = Vec::with_capacity(n);
            let mut by = Vec::with_capacity(n);
            for _ in 0..n {
                let i = rng.gen_range(0..n);
                bx.push(x[i].clone());
                by.push(y[i]);
            }
            trees.push(RegressionTree::fit(&bx, &by, &params, &mut rng));
        }
        Self {
            n_trees,
            max_depth,
            trees,
        }
    }

    /// Mean leaf probability across the ensemble.
    pub fn predict_proba_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| if self.predict_proba_row(row) > 0.5 { 1.0 } else { 0.0 })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..60)
            .map(|i| {
                let v = i as f64;
                vec![v, (v * 7.0) % 13.0]
            })
            .collect();
        let y: Vec<f64> = (0..60).map(|i| if i < 30 { 0.0 } else { 1.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_learns_separable_pattern() {
        let (x, y) = separable_data();
        let forest = RandomForestClassifier::fit(&x, &y, 25, 6, 42);
        let preds = forest.predict(&x);
        let correct = preds
            .iter()
            .zip(&y)
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        assert!(correct >= 57, "forest should fit its training set");
    }

    #[test]
    fn test_fit_is_seed_deterministic() {
        let (x, y) = separable_data();
        let a = RandomForestClassifier::fit(&x, &y, 10, 4, 42);
        let b = RandomForestClassifier::fit(&x, &y, 10, 4, 42);
        assert_eq!(a.predict(&x), b.predict(&x));
    }

    #[test]
    fn test_proba_is_bounded() {
        let (x, y) = separable_data();
        let forest = RandomForestClassifier::fit(&x, &y, 10, 4, 42);
        for row in &x {
            let p = forest.predict_proba_row(row);
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
