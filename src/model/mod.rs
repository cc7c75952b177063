//! Models and preprocessing: the fitted feature pipeline, the two
//! native tree-ensemble classifiers, and the deployable predictor
//! bundle that ties them together.

pub mod boosting;
pub mod estimator;
pub mod forest;
pub mod metrics;
pub mod preprocess;
pub mod tree;

pub use estimator::{ModelFamily, ModelHyperparams, Predictor, TrainedModel};
pub use metrics::ClassificationMetrics;
pub use preprocess::Preprocessor;
