//! Fitted feature preprocessing.
//!
//! Numeric columns are standardized with statistics learned from the
//! training partition only; categorical columns are one-hot encoded
//! with the training categories, and unseen categories at transform
//! time encode to an all-zero block instead of failing. Columns
//! declared in neither list pass through as raw numerics.
//!
//! `fit` runs exactly once per pipeline run; applying the same fitted
//! object to any frame is a pure function of (fitted state, input).

use crate::data::frame::DataFrame;
use crate::error::PipelineError;
use crate::schema::DatasetSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScaledColumn {
    name: String,
    mean: f64,
    std_dev: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncodedColumn {
    name: String,
    /// Category vocabulary learned from training data, sorted for a
    /// stable output layout.
    categories: Vec<String>,
}

/// Column-wise preprocessing pipeline fitted on training features.
///
/// The transformed layout is: scaled numerics, then one one-hot block
/// per categorical column, then passthrough columns, in declaration
/// order within each group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    numeric: Vec<ScaledColumn>,
    categorical: Vec<EncodedColumn>,
    passthrough: Vec<String>,
}

impl Preprocessor {
    /// Learn scaling statistics and category vocabularies from the
    /// training feature frame. The frame must already have the target
    /// and drop-list columns removed.
    pub fn fit(frame: &DataFrame, schema: &DatasetSchema) -> Result<Self, PipelineError> {
        let mut numeric = Vec::new();
        for name in &schema.numerical_features {
            let idx = frame.column_index(name).ok_or_else(|| {
                PipelineError::transformation(format!("numeric feature '{name}' not present"))
            })?;
            let values: Vec<f64> = frame
                .rows
                .iter()
                .map(|row| numeric_cell(&row[idx], name))
                .collect::<Result<_, _>>()?;
            let n = values.len().max(1) as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            numeric.push(ScaledColumn {
                name: name.clone(),
                mean,
                // constant columns scale to zero rather than dividing by zero
                std_dev: if std_dev > 0.0 { std_dev } else { 1.0 },
            });
        }

        let mut categorical = Vec::new();
        for name in &schema.categorical_features {
            let idx = frame.column_index(name).ok_or_else(|| {
                PipelineError::transformation(format!("categorical feature '{name}' not present"))
            })?;
            let mut categories: Vec<String> = frame
                .rows
                .iter()
                .map(|row| category_cell(&row[idx]))
                .collect();
            categories.sort();
            categories.dedup();
            categorical.push(EncodedColumn {
                name: name.clone(),
                categories,
            });
        }

        let passthrough = frame
            .columns
            .iter()
            .filter(|c| {
                !schema.numerical_features.contains(c) && !schema.categorical_features.contains(c)
            })
            .cloned()
            .collect();

        Ok(Self {
            numeric,
            categorical,
            passthrough,
        })
    }

    /// Apply the fitted pipeline. Never re-derives statistics or
    /// vocabularies from the input frame.
    pub fn transform(&self, frame: &DataFrame) -> Result<Vec<Vec<f64>>, PipelineError> {
        let mut numeric_idx = Vec::with_capacity(self.numeric.len());
        for col in &self.numeric {
            numeric_idx.push(self.require_column(frame, &col.name)?);
        }
        let mut categorical_idx = Vec::with_capacity(self.categorical.len());
        for col in &self.categorical {
            categorical_idx.push(self.require_column(frame, &col.name)?);
        }
        let mut passthrough_idx = Vec::with_capacity(self.passthrough.len());
        for name in &self.passthrough {
            passthrough_idx.push(self.require_column(frame, name)?);
        }

        let mut out = Vec::with_capacity(frame.rows.len());
        for row in &frame.rows {
            let mut features = Vec::with_capacity(self.output_width());
            for (col, &idx) in self.numeric.iter().zip(&numeric_idx) {
                let v = numeric_cell(&row[idx], &col.name)?;
                features.push((v - col.mean) / col.std_dev);
            }
            for (col, &idx) in self.categorical.iter().zip(&categorical_idx) {
                let value = category_cell(&row[idx]);
                for category in &col.categories {
                    features.push(if category == &value { 1.0 } else { 0.0 });
                }
            }
            for (name, &idx) in self.passthrough.iter().zip(&passthrough_idx) {
                features.push(numeric_cell(&row[idx], name)?);
            }
            out.push(features);
        }
        Ok(out)
    }

    /// Width of a transformed feature row.
    pub fn output_width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
            + self.passthrough.len()
    }

    fn require_column(&self, frame: &DataFrame, name: &str) -> Result<usize, PipelineError> {
        frame.column_index(name).ok_or_else(|| {
            PipelineError::transformation(format!("column '{name}' missing at transform time"))
        })
    }
}

fn numeric_cell(value: &Value, column: &str) -> Result<f64, PipelineError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PipelineError::transformation(format!("non-finite value in '{column}'"))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(PipelineError::transformation(format!(
            "non-numeric value {other} in numeric column '{column}'"
        ))),
    }
}

fn category_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
