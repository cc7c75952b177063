//! CART regression tree, the shared base learner for both ensembles.
//!
//! Splits maximize the gain `(ΣgL)²/ΣhL + (ΣgR)²/ΣhR − (Σg)²/Σh` over
//! per-sample gradient/weight pairs. With unit weights and raw targets
//! this reduces to variance-reduction splitting with mean-value leaves;
//! the booster passes logistic gradients and hessians instead, which
//! yields Newton-step leaf values.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Number of features considered per split; `None` means all.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    /// Fit on raw targets (unit weights): plain variance-reduction CART.
    pub fn fit(x: &[Vec<f64>], targets: &[f64], params: &TreeParams, rng: &mut StdRng) -> Self {
        let weights = vec![1.0; targets.len()];
        Self::fit_weighted(x, targets, &weights, params, rng)
    }

    /// Fit on gradient/weight pairs; leaf values are `Σg / Σh`.
    pub fn fit_weighted(
        x: &[Vec<f64>],
        grad: &[f64],
        hess: &[f64],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        debug_assert_eq!(x.len(), grad.len());
        debug_assert_eq!(x.len(), hess.len());
        let indices: Vec<usize> = (0..x.len()).collect();
        let root = build_node(x, grad, hess, &indices, params.max_depth, params, rng);
        Self { root }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn leaf_value(grad: &[f64], hess: &[f64], indices: &[usize]) -> f64 {
    let g: f64 = indices.iter().map(|&i| grad[i]).sum();
    let h: f64 = indices.iter().map(|&i| hess[i]).sum();
    if h > 0.0 {
        g / h
    } else {
        0.0
    }
}

fn build_node(
    x: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    indices: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> TreeNode {
    if depth == 0 || indices.len() < params.min_samples_split {
        return TreeNode::Leaf {
            value: leaf_value(grad, hess, indices),
        };
    }

    let n_features = x.first().map_or(0, |row| row.len());
    let mut candidates: Vec<usize> = (0..n_features).collect();
    if let Some(k) = params.max_features {
        candidates.shuffle(rng);
        candidates.truncate(k.max(1).min(n_features));
    }

    let total_g: f64 = indices.iter().map(|&i| grad[i]).sum();
    let total_h: f64 = indices.iter().map(|&i| hess[i]).sum();
    let parent_score = total_g * total_g / (total_h + EPS);

    let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, gain)
    for &feature in &candidates {
        let mut ordered: Vec<(f64, f64, f64)> = indices
            .iter()
            .map(|&i| (x[i][feature], grad[i], hess[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_g = 0.0;
        let mut left_h = 0.0;
        for w in 0..ordered.len().saturating_sub(1) {
            left_g += ordered[w].1;
            left_h += ordered[w].2;
            // only split between distinct feature values
            if ordered[w].0 == ordered[w + 1].0 {
                continue;
            }
            let right_g = total_g - left_g;
            let right_h = total_h - left_h;
            let gain = left_g * left_g / (left_h + EPS) + right_g * right_g / (right_h + EPS)
                - parent_score;
            if gain > EPS && best.map_or(true, |(_, _, g)| gain > g) {
                let threshold = (ordered[w].0 + ordered[w + 1].0) / 2.0;
                best = Some((feature, threshold, gain));
            }
        }
    }

    let Some((feature, threshold, _)) = best else {
        return TreeNode::Leaf {
            value: leaf_value(grad, hess, indices),
        };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[i][feature] <= threshold);

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(
            x,
            grad,
            hess,
            &left_idx,
            depth - 1,
            params,
            rng,
        )),
        right: Box::new(build_node(
            x,
            grad,
            hess,
            &right_idx,
            depth - 1,
            params,
            rng,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_fits_step_function() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 0.0 } else { 1.0 }).collect();
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default(), &mut rng());

        assert_eq!(tree.predict_row(&[3.0]), 0.0);
        assert_eq!(tree.predict_row(&[15.0]), 1.0);
    }

    #[test]
    fn test_depth_zero_is_mean_leaf() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![0.0, 0.0, 1.0, 1.0];
        let params = TreeParams {
            max_depth: 0,
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&x, &y, &params, &mut rng());
        assert_eq!(tree.predict_row(&[0.0]), 0.5);
        assert_eq!(tree.predict_row(&[3.0]), 0.5);
    }

    #[test]
    fn test_constant_targets_do_not_split() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![0.7, 0.7, 0.7];
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default(), &mut rng());
        assert!((tree.predict_row(&[99.0]) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_two_feature_interaction() {
        // label = x0 XOR x1, needs depth 2
        let x = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let y = vec![0.0, 1.0, 1.0, 0.0];
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default(), &mut rng());
        for (row, expected) in x.iter().zip(&y) {
            assert_eq!(tree.predict_row(row), *expected);
        }
    }

    #[test]
    fn test_serde_roundtrip_predicts_identically() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default(), &mut rng());
        let restored: RegressionTree =
            serde_json::from_str(&serde_json::to_string(&tree).unwrap()).unwrap();
        for row in &x {
            assert_eq!(tree.predict_row(row), restored.predict_row(row));
        }
    }
}
