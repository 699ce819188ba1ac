use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::schema::SchemaRegistry;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("column '{column}' is not part of the schema")]
pub struct UnknownColumnError {
    pub column: String,
}

/// One row of model input, keyed and ordered by a [`SchemaRegistry`].
///
/// The key set is fixed at construction: every schema column is present (zero until
/// written) and no other column can be added.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'a> {
    schema: &'a SchemaRegistry,
    values: Vec<f64>,
}

impl<'a> FeatureVector<'a> {
    /// Creates a vector with every schema column set to 0.
    #[must_use]
    pub fn zeros(schema: &'a SchemaRegistry) -> Self {
        Self {
            schema,
            values: vec![0.0; schema.len()],
        }
    }

    #[must_use]
    pub fn schema(&self) -> &'a SchemaRegistry {
        self.schema
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.values[i])
    }

    pub fn set(&mut self, column: &str, value: f64) -> Result<(), UnknownColumnError> {
        let position = self
            .schema
            .position(column)
            .ok_or_else(|| UnknownColumnError {
                column: column.to_owned(),
            })?;
        self.values[position] = value;
        Ok(())
    }

    /// Values in schema order, ready to be passed to a model.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Serializes as a JSON object whose keys follow schema order.
impl Serialize for FeatureVector<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}
