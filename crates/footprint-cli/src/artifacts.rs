use anyhow::Context;
use footprint_features::{scaler::FeatureScaler, schema::SchemaRegistry};
use footprint_model::{artifact::ModelArtifact, pipeline::FootprintPipeline, predictor::Predictor};

use crate::config::ArtifactPaths;

/// The three pre-built artifacts, loaded once per process.
#[derive(Debug)]
pub struct Artifacts {
    pub schema: SchemaRegistry,
    pub scaler: FeatureScaler,
    pub predictor: Predictor,
}

impl Artifacts {
    pub fn load(paths: &ArtifactPaths) -> anyhow::Result<Self> {
        let schema = SchemaRegistry::open(&paths.schema).with_context(|| {
            format!("Failed to load schema artifact: {}", paths.schema.display())
        })?;
        let scaler = FeatureScaler::open(&paths.scaler).with_context(|| {
            format!("Failed to load scaler artifact: {}", paths.scaler.display())
        })?;
        let model = ModelArtifact::open(&paths.model).with_context(|| {
            format!("Failed to load model artifact: {}", paths.model.display())
        })?;
        tracing::info!(
            columns = schema.len(),
            scaler = scaler.kind(),
            model = model.regressor.kind(),
            "artifacts loaded"
        );
        let predictor = Predictor::from_artifact(model).with_context(|| {
            format!("Invalid model artifact: {}", paths.model.display())
        })?;
        Ok(Self {
            schema,
            scaler,
            predictor,
        })
    }

    /// Pipeline over the loaded artifacts, after checking that they agree.
    pub fn pipeline(&self) -> anyhow::Result<FootprintPipeline<'_>> {
        FootprintPipeline::new(&self.schema, &self.scaler, &self.predictor)
            .context("Artifacts do not describe the same feature layout")
    }
}
