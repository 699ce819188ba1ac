//! The column schema the model was trained on.
//!
//! [`SchemaRegistry`] is loaded once from the schema artifact (a JSON array of column
//! names) and never changes afterwards. It fixes both the key set of every
//! [`FeatureVector`](crate::vector::FeatureVector) and the order in which values reach
//! the model.

use std::{collections::HashMap, fs::File, io, path::Path};

use serde::{Serialize, Serializer};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("failed to open schema artifact {path}")]
    Io { path: String, source: io::Error },
    #[display("failed to parse schema artifact {path}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[display("schema has no columns")]
    Empty,
    #[display("column '{column}' appears more than once in the schema")]
    DuplicateColumn { column: String },
}

/// Ordered, immutable list of model input columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Builds a registry from column names in model order.
    ///
    /// Rejects an empty list and duplicated names.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), position).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }

        Ok(Self { columns, index })
    }

    /// Loads the schema artifact at `path`.
    pub fn open<P>(path: P) -> Result<Self, SchemaError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let columns: Vec<String> = serde_json::from_reader(io::BufReader::new(file))
            .map_err(|source| SchemaError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let registry = Self::from_columns(columns)?;
        tracing::debug!(
            path = %path.display(),
            columns = registry.len(),
            "loaded schema artifact"
        );
        Ok(registry)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of `column` in model order
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

impl Serialize for SchemaRegistry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.columns.serialize(serializer)
    }
}
