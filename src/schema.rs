//! Declarative dataset schema.
//!
//! Loaded from a YAML file; declares the expected column set, the
//! non-predictive drop-list, the target column, and which features are
//! numeric vs categorical. Columns in neither feature list pass through
//! transformation unchanged.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How raw label values map onto the binary target (e.g. hit -> 1.0,
/// flop -> 0.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMapping {
    pub positive: String,
    pub negative: String,
}

impl Default for LabelMapping {
    fn default() -> Self {
        Self {
            positive: "hit".to_string(),
            negative: "flop".to_string(),
        }
    }
}

impl LabelMapping {
    /// Map a raw cell to 1.0/0.0. Numeric and boolean cells are accepted
    /// directly so already-encoded datasets need no mapping.
    pub fn encode(&self, value: &serde_json::Value) -> Result<f64, PipelineError> {
        match value {
            serde_json::Value::Number(n) => {
                let v = n
                    .as_f64()
                    .ok_or_else(|| PipelineError::dataset("non-finite label value"))?;
                Ok(if v > 0.0 { 1.0 } else { 0.0 })
            }
            serde_json::Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            serde_json::Value::String(s) if s == &self.positive => Ok(1.0),
            serde_json::Value::String(s) if s == &self.negative => Ok(0.0),
            other => Err(PipelineError::dataset(format!(
                "unmappable label value: {other}"
            ))),
        }
    }

    /// Reverse mapping, for rendering predictions.
    pub fn decode(&self, label: f64) -> &str {
        if label > 0.5 {
            &self.positive
        } else {
            &self.negative
        }
    }
}

/// Dataset schema as declared in `config/schema.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Every column the ingested dataset must carry, in order.
    pub columns: Vec<String>,
    /// Non-predictive columns removed before feature derivation.
    #[serde(default)]
    pub columns_to_drop: Vec<String>,
    /// Name of the label column.
    pub target_column: String,
    /// Columns standardized with training statistics.
    #[serde(default)]
    pub numerical_features: Vec<String>,
    /// Columns one-hot encoded with training categories.
    #[serde(default)]
    pub categorical_features: Vec<String>,
    #[serde(default)]
    pub label_mapping: LabelMapping,
}

impl DatasetSchema {
    /// Load a schema from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::schema(format!("cannot read schema file {}: {e}", path.display()))
        })?;
        let schema: Self = serde_yaml::from_str(&content)?;
        schema.check()?;
        Ok(schema)
    }

    /// Structural sanity checks on the declaration itself.
    pub fn check(&self) -> Result<(), PipelineError> {
        if self.columns.is_empty() {
            return Err(PipelineError::schema("schema declares no columns"));
        }
        if !self.columns.contains(&self.target_column) {
            return Err(PipelineError::schema(format!(
                "target column '{}' is not in the declared column set",
                self.target_column
            )));
        }
        for col in self
            .numerical_features
            .iter()
            .chain(self.categorical_features.iter())
            .chain(self.columns_to_drop.iter())
        {
            if !self.columns.contains(col) {
                return Err(PipelineError::schema(format!(
                    "schema references undeclared column '{col}'"
                )));
            }
        }
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
