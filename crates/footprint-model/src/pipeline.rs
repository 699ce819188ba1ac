//! Encode → scale → predict for one profile.
//!
//! [`FootprintPipeline`] borrows the three loaded artifacts and checks, once at
//! construction, that they agree with each other:
//!
//! - the encoder's declared columns equal the schema columns (both directions)
//! - the scaler rewrites exactly the six numeric input columns
//! - the model width equals the schema width
//! - the model's recorded `feature_names`, if any, equal the schema order
//!
//! After that every request runs to completion without further contract checks.

use std::collections::BTreeSet;

use footprint_features::{
    encoder::{EncodeError, FeatureEncoder},
    profile::{LifestyleProfile, NumericInput},
    scaler::{FeatureScaler, ScalerError},
    schema::SchemaRegistry,
    vector::FeatureVector,
};
use serde::Serialize;

use crate::{predictor::Predictor, regressor::ModelError};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PipelineError {
    #[display("failed to encode profile")]
    Encode { source: EncodeError },
    #[display("failed to scale features")]
    Scale { source: ScalerError },
    #[display("failed to predict")]
    Predict { source: ModelError },
    #[display(
        "scaler columns {actual:?} do not match the numeric input columns {expected:?}"
    )]
    ScalerColumns {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[display("model expects {model} features but the schema has {schema} columns")]
    ModelWidth { schema: usize, model: usize },
    #[display(
        "model feature order differs from the schema at position {position}: schema has '{schema}', model has '{model}'"
    )]
    FeatureOrder {
        position: usize,
        schema: String,
        model: String,
    },
}

impl From<EncodeError> for PipelineError {
    fn from(source: EncodeError) -> Self {
        Self::Encode { source }
    }
}

impl From<ScalerError> for PipelineError {
    fn from(source: ScalerError) -> Self {
        Self::Scale { source }
    }
}

impl From<ModelError> for PipelineError {
    fn from(source: ModelError) -> Self {
        Self::Predict { source }
    }
}

/// Raw and scaled encodings of one profile.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedRow<'a> {
    pub raw: FeatureVector<'a>,
    pub scaled: FeatureVector<'a>,
}

#[derive(Debug)]
pub struct FootprintPipeline<'a> {
    encoder: FeatureEncoder<'a>,
    scaler: &'a FeatureScaler,
    predictor: &'a Predictor,
}

impl<'a> FootprintPipeline<'a> {
    /// Binds the artifacts together, failing on any column contract violation.
    pub fn new(
        schema: &'a SchemaRegistry,
        scaler: &'a FeatureScaler,
        predictor: &'a Predictor,
    ) -> Result<Self, PipelineError> {
        let encoder = FeatureEncoder::new(schema)?;
        check_scaler_columns(scaler)?;
        check_model_shape(schema, predictor)?;
        tracing::debug!(
            columns = schema.len(),
            scaler = scaler.kind(),
            model = predictor.name().unwrap_or("-"),
            "pipeline artifacts agree"
        );
        Ok(Self {
            encoder,
            scaler,
            predictor,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &'a SchemaRegistry {
        self.encoder.schema()
    }

    #[must_use]
    pub fn scaler(&self) -> &'a FeatureScaler {
        self.scaler
    }

    #[must_use]
    pub fn predictor(&self) -> &'a Predictor {
        self.predictor
    }

    /// Encodes and scales `profile` without predicting.
    pub fn prepare(&self, profile: &LifestyleProfile) -> Result<PreparedRow<'a>, PipelineError> {
        let raw = self.encoder.encode(profile)?;
        let mut scaled = raw.clone();
        self.scaler.transform(&mut scaled)?;
        Ok(PreparedRow { raw, scaled })
    }

    /// Estimated annual emissions (kg CO₂) for `profile`.
    pub fn estimate(&self, profile: &LifestyleProfile) -> Result<f64, PipelineError> {
        let row = self.prepare(profile)?;
        let prediction = self.predictor.predict(row.scaled.values())?;
        tracing::debug!(prediction, "estimated annual emissions");
        Ok(prediction)
    }
}

fn check_scaler_columns(scaler: &FeatureScaler) -> Result<(), PipelineError> {
    let expected = NumericInput::ALL
        .iter()
        .map(|i| i.column())
        .collect::<BTreeSet<_>>();
    let actual = scaler
        .columns()
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>();
    if scaler.columns().len() == expected.len() && actual == expected {
        Ok(())
    } else {
        Err(PipelineError::ScalerColumns {
            expected: expected.into_iter().map(str::to_owned).collect(),
            actual: scaler.columns().to_vec(),
        })
    }
}

fn check_model_shape(schema: &SchemaRegistry, predictor: &Predictor) -> Result<(), PipelineError> {
    if predictor.n_features() != schema.len() {
        return Err(PipelineError::ModelWidth {
            schema: schema.len(),
            model: predictor.n_features(),
        });
    }
    if let Some(names) = predictor.feature_names() {
        let mismatch = schema
            .columns()
            .iter()
            .zip(names)
            .position(|(s, m)| s != m);
        if let Some(position) = mismatch {
            return Err(PipelineError::FeatureOrder {
                position,
                schema: schema.columns()[position].clone(),
                model: names[position].clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use footprint_features::{
        encoder::encoded_columns,
        profile::{Gender, RecyclingMaterial},
    };
    use rand::{Rng, seq::IndexedRandom as _};

    use super::*;
    use crate::{artifact::ModelArtifact, regressor::Regressor};

    /// Offsets the row sum so the prediction depends on every column.
    #[derive(Debug)]
    struct FakeRegressor {
        width: usize,
    }

    impl Regressor for FakeRegressor {
        fn n_features(&self) -> usize {
            self.width
        }

        fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
            Ok(1000.0 + row.iter().sum::<f64>())
        }
    }

    fn schema() -> SchemaRegistry {
        SchemaRegistry::from_columns(encoded_columns().into_iter().map(|c| c.name)).unwrap()
    }

    fn scaler() -> FeatureScaler {
        FeatureScaler::Standard {
            columns: NumericInput::ALL
                .iter()
                .map(|i| i.column().to_owned())
                .collect(),
            mean: vec![173.9, 2031.5, 4.02, 12.14, 25.1, 11.89],
            scale: vec![72.2, 2769.1, 1.99, 7.1, 14.7, 7.3],
        }
    }

    fn fake(width: usize) -> Predictor {
        Predictor::new(Box::new(FakeRegressor { width }))
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let schema = schema();
        let scaler = scaler();
        let predictor = fake(schema.len());
        let pipeline = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap();

        let profile = LifestyleProfile {
            gender: Gender::Female,
            recycling: [RecyclingMaterial::Paper].into_iter().collect(),
            ..LifestyleProfile::default()
        };
        let first = pipeline.estimate(&profile).unwrap();
        let second = pipeline.estimate(&profile).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_prepare_scales_only_numeric_columns() {
        let schema = schema();
        let scaler = scaler();
        let predictor = fake(schema.len());
        let pipeline = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap();

        let row = pipeline.prepare(&LifestyleProfile::default()).unwrap();
        assert_eq!(row.raw.get("Monthly Grocery Bill"), Some(200.0));
        let scaled = row.scaled.get("Monthly Grocery Bill").unwrap();
        assert!((scaled - (200.0 - 173.9) / 72.2).abs() < 1e-12);
        assert_eq!(row.scaled.get("Waste Bag Size_small"), Some(1.0));
    }

    #[test]
    fn test_model_receives_the_scaled_row() {
        let schema = schema();
        let scaler = scaler();
        let predictor = fake(schema.len());
        let pipeline = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap();

        let profile = LifestyleProfile::default();
        let row = pipeline.prepare(&profile).unwrap();
        let expected = 1000.0 + row.scaled.values().iter().sum::<f64>();
        assert_eq!(pipeline.estimate(&profile).unwrap(), expected);
    }

    #[test]
    fn test_random_profiles_predict_non_negative() {
        let schema = schema();
        let scaler = scaler();
        let artifact: ModelArtifact = serde_json::from_value(serde_json::json!({
            "kind": "linear",
            "intercept": -500.0,
            "coefficients": vec![50.0; schema.len()],
        }))
        .unwrap();
        let predictor = Predictor::from_artifact(artifact).unwrap();
        let pipeline = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap();

        let mut rng = rand_pcg::Pcg64Mcg::new(11);
        for _ in 0..200 {
            let mut profile = LifestyleProfile {
                gender: *Gender::ALL.choose(&mut rng).unwrap(),
                ..LifestyleProfile::default()
            };
            for input in NumericInput::ALL {
                profile.set_numeric(input, rng.random_range(input.range()));
            }
            let prediction = pipeline.estimate(&profile).unwrap();
            assert!(prediction >= 0.0 && prediction.is_finite());
        }
    }

    #[test]
    fn test_model_width_mismatch_fails_fast() {
        let schema = schema();
        let scaler = scaler();
        let predictor = fake(schema.len() - 1);
        let err = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap_err();
        assert!(matches!(err, PipelineError::ModelWidth { .. }));
    }

    #[test]
    fn test_feature_order_mismatch_fails_fast() {
        let schema = schema();
        let scaler = scaler();
        let mut names = schema.columns().to_vec();
        names.swap(0, 1);
        let artifact: ModelArtifact = serde_json::from_value(serde_json::json!({
            "feature_names": names,
            "kind": "linear",
            "intercept": 0.0,
            "coefficients": vec![1.0; schema.len()],
        }))
        .unwrap();
        let predictor = Predictor::from_artifact(artifact).unwrap();
        let err = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureOrder { position: 0, .. }));
    }

    #[test]
    fn test_scaler_over_wrong_columns_fails_fast() {
        let schema = schema();
        let scaler = FeatureScaler::Standard {
            columns: vec!["Monthly Grocery Bill".to_owned(), "Sex".to_owned()],
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let predictor = fake(schema.len());
        let err = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap_err();
        assert!(matches!(err, PipelineError::ScalerColumns { .. }));
    }

    #[test]
    fn test_schema_mismatch_fails_before_prediction() {
        let schema = SchemaRegistry::from_columns(
            encoded_columns()
                .into_iter()
                .map(|c| c.name)
                .filter(|name| *name != "Glass"),
        )
        .unwrap();
        let scaler = scaler();
        let predictor = fake(schema.len());
        let err = FootprintPipeline::new(&schema, &scaler, &predictor).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Encode {
                source: EncodeError::SchemaMismatch { .. }
            }
        ));
    }
}
