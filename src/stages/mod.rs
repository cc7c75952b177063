//! Pipeline stages, one module per step of the run.

pub mod artifacts;
pub mod evaluation;
pub mod ingestion;
pub mod pusher;
pub mod trainer;
pub mod transformation;
pub mod validation;

pub use artifacts::{
    ArrayBundle, EvaluationArtifact, IngestionArtifact, PusherArtifact, TrainerArtifact,
    TrainerReport, TransformationArtifact, ValidationArtifact, ValidationReport,
};
pub use evaluation::ModelEvaluation;
pub use ingestion::DataIngestion;
pub use pusher::ModelPusher;
pub use trainer::ModelTrainer;
pub use transformation::DataTransformation;
pub use validation::DataValidation;
