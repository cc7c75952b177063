//! trackhit: a batch training pipeline for hit-song classification.
//!
//! The pipeline ingests a tabular track dataset, validates it against a
//! declared schema, transforms it into numeric matrices, selects a
//! model with a bounded hyperparameter search over two tree-ensemble
//! families, evaluates the result against the registry champion, and
//! promotes it only when it strictly wins.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod registry;
pub mod schema;
pub mod search;
pub mod stages;
pub mod store;

pub use error::PipelineError;
pub use pipeline::{PipelineState, TrainingPipeline};
