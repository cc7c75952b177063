//! Classification scoring.

use serde::{Deserialize, Serialize};

/// Held-out scores for a binary classifier. Recomputed at every stage
/// that scores a model; never carried across refits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

impl ClassificationMetrics {
    /// Compute accuracy/precision/recall treating label 1.0 as the
    /// positive class. Precision and recall fall back to 0.0 when their
    /// denominator is empty.
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        let n = y_true.len();
        if n == 0 {
            return Self {
                accuracy: 0.0,
                precision: 0.0,
                recall: 0.0,
            };
        }

        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut correct = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            let t = t > 0.5;
            let p = p > 0.5;
            if t == p {
                correct += 1;
            }
            match (t, p) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let ratio = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                num as f64 / den as f64
            }
        };
        Self {
            accuracy: correct as f64 / n as f64,
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = vec![1.0, 0.0, 1.0, 0.0];
        let m = ClassificationMetrics::compute(&y, &y);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
    }

    #[test]
    fn test_mixed_predictions() {
        let y_true = vec![1.0, 1.0, 0.0, 0.0];
        let y_pred = vec![1.0, 0.0, 1.0, 0.0];
        let m = ClassificationMetrics::compute(&y_true, &y_pred);
        assert_eq!(m.accuracy, 0.5);
        assert_eq!(m.precision, 0.5); // 1 TP, 1 FP
        assert_eq!(m.recall, 0.5); // 1 TP, 1 FN
    }

    #[test]
    fn test_no_positive_predictions() {
        let y_true = vec![1.0, 0.0];
        let y_pred = vec![0.0, 0.0];
        let m = ClassificationMetrics::compute(&y_true, &y_pred);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.accuracy, 0.5);
    }
}
