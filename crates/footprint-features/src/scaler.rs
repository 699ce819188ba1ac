//! Pre-fit numeric scaling.
//!
//! The scaler artifact carries the parameters fitted on the training data for the six
//! numeric columns. It is applied to a single encoded row right before prediction and
//! touches nothing but its own columns.
//!
//! # Artifact Kinds
//!
//! - `standard`: `(x - mean) / scale`
//! - `min_max`: `(x - data_min) / (data_max - data_min) * (hi - lo) + lo`
//!
//! Both reduce to the affine map `(x - shift) / divisor * stretch + offset`, which is how
//! they are applied and inverted.

use std::{fs::File, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::vector::{FeatureVector, UnknownColumnError};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ScalerError {
    #[display("failed to open scaler artifact {path}")]
    Io { path: String, source: io::Error },
    #[display("failed to parse scaler artifact {path}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[display("scaler has {columns} columns but {parameter} has {len} values")]
    LengthMismatch {
        columns: usize,
        parameter: &'static str,
        len: usize,
    },
    #[display("invalid scaler parameter for column '{column}': {reason}")]
    InvalidParameter { column: String, reason: String },
    #[display("scaler column is missing from the feature vector")]
    MissingColumn { source: UnknownColumnError },
}

impl From<UnknownColumnError> for ScalerError {
    fn from(source: UnknownColumnError) -> Self {
        Self::MissingColumn { source }
    }
}

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Fitted scaling parameters, one entry per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    Standard {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        columns: Vec<String>,
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: [f64; 2],
    },
}

#[derive(Debug, Clone, Copy)]
struct Affine {
    shift: f64,
    divisor: f64,
    stretch: f64,
    offset: f64,
}

impl Affine {
    fn apply(self, x: f64) -> f64 {
        (x - self.shift) / self.divisor * self.stretch + self.offset
    }

    fn invert(self, y: f64) -> f64 {
        (y - self.offset) / self.stretch * self.divisor + self.shift
    }
}

impl FeatureScaler {
    /// Loads and validates the scaler artifact at `path`.
    pub fn open<P>(path: P) -> Result<Self, ScalerError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScalerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scaler: Self = serde_json::from_reader(io::BufReader::new(file)).map_err(|source| {
            ScalerError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?;
        scaler.validate()?;
        tracing::debug!(
            path = %path.display(),
            kind = scaler.kind(),
            columns = scaler.columns().len(),
            "loaded scaler artifact"
        );
        Ok(scaler)
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
        }
    }

    /// Columns this scaler rewrites, in artifact order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        match self {
            Self::Standard { columns, .. } | Self::MinMax { columns, .. } => columns,
        }
    }

    /// Checks parameter lengths and rejects transforms that cannot be inverted.
    pub fn validate(&self) -> Result<(), ScalerError> {
        let columns = self.columns();
        let check_len = |parameter: &'static str, values: &[f64]| {
            if values.len() == columns.len() {
                Ok(())
            } else {
                Err(ScalerError::LengthMismatch {
                    columns: columns.len(),
                    parameter,
                    len: values.len(),
                })
            }
        };
        match self {
            Self::Standard { mean, scale, .. } => {
                check_len("mean", mean)?;
                check_len("scale", scale)?;
            }
            Self::MinMax {
                data_min,
                data_max,
                feature_range,
                ..
            } => {
                check_len("data_min", data_min)?;
                check_len("data_max", data_max)?;
                let [lo, hi] = *feature_range;
                if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                    return Err(ScalerError::InvalidParameter {
                        column: "*".to_owned(),
                        reason: format!("feature_range [{lo}, {hi}] is not increasing"),
                    });
                }
            }
        }

        for (column, affine) in columns.iter().zip(self.affines()) {
            let Affine {
                shift,
                divisor,
                stretch,
                offset,
            } = affine;
            if ![shift, divisor, stretch, offset].iter().all(|v| v.is_finite()) {
                return Err(ScalerError::InvalidParameter {
                    column: column.clone(),
                    reason: "parameters must be finite".to_owned(),
                });
            }
            if divisor == 0.0 {
                return Err(ScalerError::InvalidParameter {
                    column: column.clone(),
                    reason: "scale must be non-zero".to_owned(),
                });
            }
        }
        Ok(())
    }

    fn affines(&self) -> Vec<Affine> {
        match self {
            Self::Standard { mean, scale, .. } => mean
                .iter()
                .zip(scale)
                .map(|(&shift, &divisor)| Affine {
                    shift,
                    divisor,
                    stretch: 1.0,
                    offset: 0.0,
                })
                .collect(),
            Self::MinMax {
                data_min,
                data_max,
                feature_range: [lo, hi],
                ..
            } => data_min
                .iter()
                .zip(data_max)
                .map(|(&min, &max)| Affine {
                    shift: min,
                    divisor: max - min,
                    stretch: hi - lo,
                    offset: *lo,
                })
                .collect(),
        }
    }

    /// Replaces the raw values of the scaler's columns with scaled values.
    ///
    /// Every other column is left untouched. Fails without modifying `vector` when one of
    /// the scaler's columns is absent.
    pub fn transform(&self, vector: &mut FeatureVector<'_>) -> Result<(), ScalerError> {
        self.map_columns(vector, Affine::apply)
    }

    /// Restores raw values from scaled ones.
    pub fn inverse_transform(&self, vector: &mut FeatureVector<'_>) -> Result<(), ScalerError> {
        self.map_columns(vector, Affine::invert)
    }

    fn map_columns(
        &self,
        vector: &mut FeatureVector<'_>,
        f: fn(Affine, f64) -> f64,
    ) -> Result<(), ScalerError> {
        let updates = self
            .columns()
            .iter()
            .zip(self.affines())
            .map(|(column, affine)| {
                let value = vector.get(column).ok_or_else(|| UnknownColumnError {
                    column: column.clone(),
                })?;
                Ok((column, f(affine, value)))
            })
            .collect::<Result<Vec<_>, UnknownColumnError>>()?;
        for (column, value) in updates {
            vector.set(column, value)?;
        }
        Ok(())
    }
}
