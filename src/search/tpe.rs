//! Tree-structured Parzen Estimator search.
//!
//! Completed trials are split by accuracy quantile into good and bad
//! sets; new assignments are drawn to maximize the density ratio
//! l(x) / g(x) between them. A seeded RNG keeps whole runs
//! reproducible.

use crate::model::{ClassificationMetrics, ModelFamily, ModelHyperparams};
use crate::search::{SearchSpace, TrialRecord, TrialStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N_CANDIDATES: usize = 24;

#[derive(Debug)]
pub struct TpeSearch {
    space: SearchSpace,
    gamma: f64,
    n_startup: usize,
    kde_bandwidth: f64,
    rng: StdRng,
    records: Vec<TrialRecord>,
    next_number: usize,
}

impl TpeSearch {
    pub fn new(space: SearchSpace, seed: u64) -> Self {
        Self {
            space,
            gamma: 0.25,
            n_startup: 10,
            kde_bandwidth: 1.0,
            rng: StdRng::seed_from_u64(seed),
            records: Vec::new(),
            next_number: 0,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(0.01, 0.99);
        self
    }

    pub fn with_startup(mut self, n: usize) -> Self {
        self.n_startup = n.max(1);
        self
    }

    pub fn n_completed(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == TrialStatus::Completed)
            .count()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Highest-accuracy completed trial so far.
    pub fn best(&self) -> Option<&TrialRecord> {
        self.records
            .iter()
            .filter(|r| r.status == TrialStatus::Completed)
            .max_by(|a, b| {
                a.accuracy()
                    .partial_cmp(&b.accuracy())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Next assignment to evaluate. Random during the startup phase,
    /// density-ratio guided afterwards.
    pub fn suggest(&mut self) -> ModelHyperparams {
        if self.n_completed() < self.n_startup {
            self.space.sample_random(&mut self.rng)
        } else {
            self.guided_sample()
        }
    }

    pub fn record_completed(&mut self, params: ModelHyperparams, metrics: ClassificationMetrics) {
        let record = TrialRecord::completed(self.next_number, params, metrics);
        self.next_number += 1;
        self.records.push(record);
    }

    pub fn record_failed(&mut self, params: ModelHyperparams) {
        let record = TrialRecord::failed(self.next_number, params);
        self.next_number += 1;
        self.records.push(record);
    }

    fn guided_sample(&mut self) -> ModelHyperparams {
        let mut completed: Vec<&TrialRecord> = self
            .records
            .iter()
            .filter(|r| r.status == TrialStatus::Completed)
            .collect();
        if completed.len() < 2 {
            return self.space.sample_random(&mut self.rng);
        }

        // Best trials first, so the top gamma quantile is "good".
        completed.sort_by(|a, b| {
            b.accuracy()
                .partial_cmp(&a.accuracy())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let n_good = ((completed.len() as f64) * self.gamma).ceil() as usize;
        let n_good = n_good.max(1).min(completed.len() - 1);
        let (good, bad) = completed.split_at(n_good);

        let family = pick_family(&mut self.rng, good, bad);
        match family {
            ModelFamily::RandomForest => {
                let (good_t, bad_t) = dim_values(good, bad, |p| match *p {
                    ModelHyperparams::RandomForest { n_trees, .. } => Some(n_trees as i64),
                    _ => None,
                });
                let (good_d, bad_d) = dim_values(good, bad, |p| match *p {
                    ModelHyperparams::RandomForest { max_depth, .. } => Some(max_depth as i64),
                    _ => None,
                });
                let (t_lo, t_hi) = self.space.forest_trees;
                let (d_lo, d_hi) = self.space.forest_depth;
                ModelHyperparams::RandomForest {
                    n_trees: sample_discrete(&mut self.rng, &good_t, &bad_t, t_lo as i64, t_hi as i64)
                        as usize,
                    max_depth: sample_discrete(
                        &mut self.rng,
                        &good_d,
                        &bad_d,
                        d_lo as i64,
                        d_hi as i64,
                    ) as usize,
                }
            }
            ModelFamily::GradientBoosting => {
                let (good_t, bad_t) = dim_values(good, bad, |p| match *p {
                    ModelHyperparams::GradientBoosting { n_trees, .. } => Some(n_trees as i64),
                    _ => None,
                });
                let (good_d, bad_d) = dim_values(good, bad, |p| match *p {
                    ModelHyperparams::GradientBoosting { max_depth, .. } => Some(max_depth as i64),
                    _ => None,
                });
                let (good_lr, bad_lr) = float_dim_values(good, bad, |p| match *p {
                    ModelHyperparams::GradientBoosting { learning_rate, .. } => {
                        Some(learning_rate.ln())
                    }
                    _ => None,
                });
                let (t_lo, t_hi) = self.space.boosting_trees;
                let (d_lo, d_hi) = self.space.boosting_depth;
                let (lr_lo, lr_hi) = self.space.boosting_learning_rate;
                let lr = sample_continuous(
                    &mut self.rng,
                    &good_lr,
                    &bad_lr,
                    lr_lo.ln(),
                    lr_hi.ln(),
                    self.kde_bandwidth,
                )
                .exp();
                ModelHyperparams::GradientBoosting {
                    n_trees: sample_discrete(&mut self.rng, &good_t, &bad_t, t_lo as i64, t_hi as i64)
                        as usize,
                    max_depth: sample_discrete(
                        &mut self.rng,
                        &good_d,
                        &bad_d,
                        d_lo as i64,
                        d_hi as i64,
                    ) as usize,
                    learning_rate: self.space.clamp_learning_rate(lr),
                }
            }
        }
    }

}

/// Family choice weighted by Laplace-smoothed good/bad counts.
fn pick_family(rng: &mut StdRng, good: &[&TrialRecord], bad: &[&TrialRecord]) -> ModelFamily {
    let weights: Vec<f64> = ModelFamily::ALL
        .iter()
        .map(|f| {
            let l = good.iter().filter(|r| r.params.family() == *f).count() + 1;
            let g = bad.iter().filter(|r| r.params.family() == *f).count() + 1;
            l as f64 / g as f64
        })
        .collect();
    let total: f64 = weights.iter().sum();
    let r: f64 = rng.gen::<f64>() * total;
    let mut cumsum = 0.0;
    for (family, w) in ModelFamily::ALL.iter().zip(&weights) {
        cumsum += w;
        if r < cumsum {
            return *family;
        }
    }
    ModelFamily::GradientBoosting
}

fn dim_values(
    good: &[&TrialRecord],
    bad: &[&TrialRecord],
    extract: impl Fn(&ModelHyperparams) -> Option<i64>,
) -> (Vec<i64>, Vec<i64>) {
    let pull = |records: &[&TrialRecord]| {
        records
            .iter()
            .filter_map(|r| extract(&r.params))
            .collect::<Vec<i64>>()
    };
    (pull(good), pull(bad))
}

fn float_dim_values(
    good: &[&TrialRecord],
    bad: &[&TrialRecord],
    extract: impl Fn(&ModelHyperparams) -> Option<f64>,
) -> (Vec<f64>, Vec<f64>) {
    let pull = |records: &[&TrialRecord]| {
        records
            .iter()
            .filter_map(|r| extract(&r.params))
            .collect::<Vec<f64>>()
    };
    (pull(good), pull(bad))
}

fn sample_discrete(rng: &mut StdRng, good: &[i64], bad: &[i64], low: i64, high: i64) -> i64 {
    if good.is_empty() {
        return rng.gen_range(low..=high);
    }

    let range = (high - low + 1) as usize;
    let mut good_counts = vec![1.0; range];
    let mut bad_counts = vec![1.0; range];
    for &v in good {
        good_counts[(v.clamp(low, high) - low) as usize] += 1.0;
    }
    for &v in bad {
        bad_counts[(v.clamp(low, high) - low) as usize] += 1.0;
    }

    let weights: Vec<f64> = good_counts
        .iter()
        .zip(bad_counts.iter())
        .map(|(l, g)| l / g)
        .collect();
    let total: f64 = weights.iter().sum();

    let r: f64 = rng.gen::<f64>() * total;
    let mut cumsum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumsum += w;
        if r < cumsum {
            return low + i as i64;
        }
    }
    high
}

fn sample_continuous(
    rng: &mut StdRng,
    good: &[f64],
    bad: &[f64],
    low: f64,
    high: f64,
    kde_bandwidth: f64,
) -> f64 {
    if good.is_empty() {
        return low + rng.gen::<f64>() * (high - low);
    }

    let bandwidth = kde_bandwidth * (high - low) / 10.0;
    let mut best_value = low;
    let mut best_ratio = f64::NEG_INFINITY;
    for _ in 0..N_CANDIDATES {
        // Perturb a good sample with Gaussian noise (Box-Muller).
        let idx = ((rng.gen::<f64>() * good.len() as f64).floor() as usize).min(good.len() - 1);
        let u1: f64 = rng.gen::<f64>().max(1e-10);
        let u2: f64 = rng.gen::<f64>();
        let noise = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * bandwidth;
        let candidate = (good[idx] + noise).clamp(low, high);

        let l = kde_score(candidate, good, bandwidth);
        let g = kde_score(candidate, bad, bandwidth);
        let ratio = l / (g + 1e-10);
        if ratio > best_ratio {
            best_ratio = ratio;
            best_value = candidate;
        }
    }
    best_value
}

fn kde_score(x: f64, values: &[f64], bandwidth: f64) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    values
        .iter()
        .map(|&v| (-(x - v).powi(2) / (2.0 * bandwidth.powi(2))).exp())
        .sum::<f64>()
        / values.len() as f64
}
