//! In-memory tabular frame with a CSV codec and split/column operations.

use crate::error::PipelineError;
use crate::schema::LabelMapping;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A small column-named row store. Cells are JSON values so one frame
/// can carry numeric, categorical, and boolean columns side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DataFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Parse CSV text. Fields may be double-quoted (with `""` as the
    /// quote escape) so free-text cells can carry commas. Cells are
    /// sniffed as i64, then f64, then bool, falling back to string.
    pub fn from_csv_str(content: &str) -> Result<Self, PipelineError> {
        let mut lines = content.lines();
        let columns: Vec<String> = split_csv_line(
            lines
                .next()
                .ok_or_else(|| PipelineError::dataset("empty CSV input"))?,
        )
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

        let mut rows = Vec::new();
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<Value> = split_csv_line(line).iter().map(|f| sniff_cell(f)).collect();
            if row.len() != columns.len() {
                return Err(PipelineError::dataset(format!(
                    "row {} has {} cells, expected {}",
                    line_no + 2,
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    /// Render the frame as CSV text with a header row.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.columns.join(","));
        out.push('\n');
        for row in &self.rows {
            let rendered: Vec<String> = row.iter().map(render_cell).collect();
            out.push_str(&rendered.join(","));
            out.push('\n');
        }
        out
    }

    /// Remove the named columns. Unknown names are ignored, matching the
    /// schema check happening upstream in validation.
    pub fn drop_columns(&self, names: &[String]) -> DataFrame {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.contains(c))
            .map(|(i, _)| i)
            .collect();

        let columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect();
        DataFrame { columns, rows }
    }

    /// Shuffled train/test split with a fixed seed. `test_ratio` is the
    /// fraction of rows held out for test, rounded down; the partitions
    /// are disjoint and cover the whole frame.
    pub fn train_test_split(&self, test_ratio: f64, seed: u64) -> (DataFrame, DataFrame) {
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_test = (self.rows.len() as f64 * test_ratio).floor() as usize;
        let (test_idx, train_idx) = indices.split_at(n_test);

        let take = |idx: &[usize]| DataFrame {
            columns: self.columns.clone(),
            rows: idx.iter().map(|&i| self.rows[i].clone()).collect(),
        };
        (take(train_idx), take(test_idx))
    }

    /// Split off the target column: the remaining frame holds the
    /// features, the vector the encoded 0/1 labels.
    pub fn split_target(
        &self,
        target_column: &str,
        mapping: &LabelMapping,
    ) -> Result<(DataFrame, Vec<f64>), PipelineError> {
        let target_idx = self.column_index(target_column).ok_or_else(|| {
            PipelineError::dataset(format!("target column '{target_column}' not present"))
        })?;

        let mut labels = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            labels.push(mapping.encode(&row[target_idx])?);
        }

        let features = self.drop_columns(std::slice::from_ref(&target_column.to_string()));
        Ok((features, labels))
    }
}

/// Split one CSV line, honoring double-quoted fields with `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }
    fields.push(field);
    fields
}

fn sniff_cell(raw: &str) -> Value {
    let s = raw.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        return serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(s.to_string()));
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains(',') || s.contains('"') => {
            format!("\"{}\"", s.replace('"', "\"\""))
        }
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
