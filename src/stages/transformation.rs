//! Data transformation: fit the preprocessor on train, apply to both
//! splits, persist everything the trainer needs.

use crate::config::TransformationConfig;
use crate::error::PipelineError;
use crate::model::Preprocessor;
use crate::persist::atomic_write_json;
use crate::schema::DatasetSchema;
use crate::stages::artifacts::{ArrayBundle, TransformationArtifact, ValidationArtifact};
use crate::stages::ingestion::load_split;
use tracing::info;

pub struct DataTransformation<'a> {
    config: &'a TransformationConfig,
    schema: &'a DatasetSchema,
}

impl<'a> DataTransformation<'a> {
    pub fn new(config: &'a TransformationConfig, schema: &'a DatasetSchema) -> Self {
        Self { config, schema }
    }

    /// Precondition: a positive validation verdict. The schema's
    /// drop-list is applied here, then the preprocessor is fitted on
    /// the train split only; the test split is transformed with those
    /// same statistics.
    pub async fn run(
        &self,
        validation: &ValidationArtifact,
    ) -> Result<TransformationArtifact, PipelineError> {
        if !validation.validation_status {
            return Err(PipelineError::ValidationRejected(
                validation.message.clone(),
            ));
        }

        let train = load_split(&validation.train_path)?.drop_columns(&self.schema.columns_to_drop);
        let test = load_split(&validation.test_path)?.drop_columns(&self.schema.columns_to_drop);

        let mapping = &self.schema.label_mapping;
        let (train_features, train_labels) =
            train.split_target(&self.schema.target_column, mapping)?;
        let (test_features, test_labels) = test.split_target(&self.schema.target_column, mapping)?;

        let preprocessor = Preprocessor::fit(&train_features, self.schema)?;
        let train_bundle = ArrayBundle {
            features: preprocessor.transform(&train_features)?,
            labels: train_labels,
        };
        let test_bundle = ArrayBundle {
            features: preprocessor.transform(&test_features)?,
            labels: test_labels,
        };

        atomic_write_json(&self.config.preprocessor_path, &preprocessor)?;
        atomic_write_json(&self.config.transformed_train_path, &train_bundle)?;
        atomic_write_json(&self.config.transformed_test_path, &test_bundle)?;
        info!(
            width = preprocessor.output_width(),
            train_rows = train_bundle.features.len(),
            test_rows = test_bundle.features.len(),
            "transformation complete"
        );

        Ok(TransformationArtifact {
            preprocessor_path: self.config.preprocessor_path.clone(),
            transformed_train_path: self.config.transformed_train_path.clone(),
            transformed_test_path: self.config.transformed_test_path.clone(),
        })
    }
}
