//! Profile → feature vector encoding.
//!
//! The encoder maps a [`LifestyleProfile`] onto the exact column layout of the trained
//! model:
//!
//! 1. Every schema column starts at 0
//! 2. The six numeric answers are written raw into their columns
//! 3. Gender is written to the binary `Sex` column (male 0, female 1)
//! 4. Each single-choice answer sets the indicator column of its level, or nothing when
//!    the level is the attribute's baseline
//! 5. Each multi-choice answer sets one indicator per selected member
//!
//! # Schema Contract
//!
//! The set of columns the encoder can write is declared statically by
//! [`encoded_columns`]. [`FeatureEncoder::new`] compares it with the
//! [`SchemaRegistry`] and refuses to build an encoder when either side has a column the
//! other lacks. A mismatch would otherwise leave a model input silently stuck at 0, or
//! drop an answer on the floor.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    attribute::{Categorical, LabelSet, MultiLabel},
    profile::{
        AirTravelFrequency, BodyType, CookingMethod, Diet, EnergyEfficiency, Gender,
        HeatingSource, LifestyleProfile, NumericInput, RecyclingMaterial, ShowerFrequency,
        SocialActivity, Transport, VehicleType, WasteBagSize,
    },
    schema::SchemaRegistry,
    vector::{FeatureVector, UnknownColumnError},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EncodeError {
    #[display(
        "schema does not match the encoder: columns missing from schema {missing_from_schema:?}, columns unknown to encoder {unknown_to_encoder:?}"
    )]
    SchemaMismatch {
        missing_from_schema: Vec<String>,
        unknown_to_encoder: Vec<String>,
    },
    #[display("failed to write feature column")]
    Column { source: UnknownColumnError },
}

impl From<UnknownColumnError> for EncodeError {
    fn from(source: UnknownColumnError) -> Self {
        Self::Column { source }
    }
}

/// How the encoder fills a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnRole {
    Numeric {
        input: NumericInput,
    },
    Binary {
        attribute: &'static str,
    },
    OneHot {
        attribute: &'static str,
        level: &'static str,
    },
    MultiLabel {
        attribute: &'static str,
        member: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodedColumn {
    pub name: &'static str,
    pub role: ColumnRole,
}

fn push_one_hot<C>(columns: &mut Vec<EncodedColumn>)
where
    C: Categorical,
{
    columns.extend(C::LEVELS.iter().filter_map(|level| {
        level.column().map(|name| EncodedColumn {
            name,
            role: ColumnRole::OneHot {
                attribute: C::ATTRIBUTE,
                level: level.label(),
            },
        })
    }));
}

fn push_multi_label<T>(columns: &mut Vec<EncodedColumn>)
where
    T: MultiLabel,
{
    columns.extend(T::MEMBERS.iter().map(|member| EncodedColumn {
        name: member.column(),
        role: ColumnRole::MultiLabel {
            attribute: T::ATTRIBUTE,
            member: member.label(),
        },
    }));
}

/// Every column the encoder writes, grouped by attribute.
#[must_use]
pub fn encoded_columns() -> Vec<EncodedColumn> {
    let mut columns = NumericInput::ALL
        .iter()
        .map(|&input| EncodedColumn {
            name: input.column(),
            role: ColumnRole::Numeric { input },
        })
        .collect::<Vec<_>>();
    columns.push(EncodedColumn {
        name: Gender::COLUMN,
        role: ColumnRole::Binary {
            attribute: "Gender",
        },
    });

    push_one_hot::<BodyType>(&mut columns);
    push_one_hot::<Diet>(&mut columns);
    push_one_hot::<ShowerFrequency>(&mut columns);
    push_one_hot::<HeatingSource>(&mut columns);
    push_one_hot::<Transport>(&mut columns);
    push_one_hot::<SocialActivity>(&mut columns);
    push_one_hot::<AirTravelFrequency>(&mut columns);
    push_one_hot::<WasteBagSize>(&mut columns);
    push_one_hot::<VehicleType>(&mut columns);
    push_one_hot::<EnergyEfficiency>(&mut columns);

    push_multi_label::<RecyclingMaterial>(&mut columns);
    push_multi_label::<CookingMethod>(&mut columns);

    columns
}

fn check_schema(schema: &SchemaRegistry) -> Result<(), EncodeError> {
    let encoded = encoded_columns()
        .into_iter()
        .map(|c| c.name)
        .collect::<BTreeSet<_>>();

    let missing_from_schema = encoded
        .iter()
        .filter(|name| !schema.contains(name))
        .map(|name| (*name).to_owned())
        .collect::<Vec<_>>();
    let unknown_to_encoder = schema
        .columns()
        .iter()
        .filter(|name| !encoded.contains(name.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    if missing_from_schema.is_empty() && unknown_to_encoder.is_empty() {
        Ok(())
    } else {
        Err(EncodeError::SchemaMismatch {
            missing_from_schema,
            unknown_to_encoder,
        })
    }
}

fn write_one_hot<C>(vector: &mut FeatureVector<'_>, level: C) -> Result<(), UnknownColumnError>
where
    C: Categorical,
{
    match level.column() {
        Some(column) => vector.set(column, 1.0),
        None => Ok(()),
    }
}

fn write_multi_label<T>(
    vector: &mut FeatureVector<'_>,
    set: &LabelSet<T>,
) -> Result<(), UnknownColumnError>
where
    T: MultiLabel,
{
    for member in set.iter() {
        vector.set(member.column(), 1.0)?;
    }
    Ok(())
}

/// Encodes profiles into vectors laid out by a validated [`SchemaRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    schema: &'a SchemaRegistry,
}

impl<'a> FeatureEncoder<'a> {
    /// Binds the encoder to `schema` after checking the column contract.
    pub fn new(schema: &'a SchemaRegistry) -> Result<Self, EncodeError> {
        check_schema(schema)?;
        Ok(Self { schema })
    }

    #[must_use]
    pub fn schema(&self) -> &'a SchemaRegistry {
        self.schema
    }

    /// Encodes `profile` into a fresh vector with raw (unscaled) numeric values.
    pub fn encode(&self, profile: &LifestyleProfile) -> Result<FeatureVector<'a>, EncodeError> {
        let mut vector = FeatureVector::zeros(self.schema);

        for input in NumericInput::ALL {
            vector.set(input.column(), profile.numeric(input))?;
        }
        vector.set(Gender::COLUMN, profile.gender.indicator())?;

        write_one_hot(&mut vector, profile.body_type)?;
        write_one_hot(&mut vector, profile.diet)?;
        write_one_hot(&mut vector, profile.shower_frequency)?;
        write_one_hot(&mut vector, profile.heating_source)?;
        write_one_hot(&mut vector, profile.transport)?;
        write_one_hot(&mut vector, profile.social_activity)?;
        write_one_hot(&mut vector, profile.air_travel)?;
        write_one_hot(&mut vector, profile.waste_bag_size)?;
        write_one_hot(&mut vector, profile.vehicle_type)?;
        write_one_hot(&mut vector, profile.energy_efficiency)?;

        write_multi_label(&mut vector, &profile.recycling)?;
        write_multi_label(&mut vector, &profile.cooking)?;

        Ok(vector)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::ops::RangeInclusive;

    use super::*;
    use crate::profile::tests::random_profile;

    /// Column order of the reference schema artifact shipped with the sample model.
    pub(crate) fn reference_schema() -> SchemaRegistry {
        SchemaRegistry::from_columns(encoded_columns().into_iter().map(|c| c.name))
            .expect("encoder table has no duplicates")
    }

    fn group_sum<C: Categorical>(vector: &FeatureVector<'_>) -> f64 {
        C::group_columns().map(|c| vector.get(c).unwrap()).sum()
    }

    fn assert_one_hot<C: Categorical>(vector: &FeatureVector<'_>, level: C) {
        let sum = group_sum::<C>(vector);
        if level == C::BASELINE {
            assert_eq!(sum, 0.0, "{} baseline must be all-zero", C::ATTRIBUTE);
        } else {
            assert_eq!(sum, 1.0, "{} must have one hot column", C::ATTRIBUTE);
            assert_eq!(vector.get(level.column().unwrap()), Some(1.0));
        }
    }

    fn assert_multi_label<T: MultiLabel>(vector: &FeatureVector<'_>, set: &LabelSet<T>) {
        let ones = T::MEMBERS
            .iter()
            .filter(|m| vector.get(m.column()) == Some(1.0))
            .count();
        assert_eq!(ones, set.len(), "{}", T::ATTRIBUTE);
        for &member in T::MEMBERS {
            let expected = if set.contains(member) { 1.0 } else { 0.0 };
            assert_eq!(vector.get(member.column()), Some(expected));
        }
    }

    #[test]
    fn test_encoder_table_has_45_unique_columns() {
        let columns = encoded_columns();
        let unique = columns.iter().map(|c| c.name).collect::<BTreeSet<_>>();
        assert_eq!(columns.len(), 45);
        assert_eq!(unique.len(), columns.len());
    }

    #[test]
    fn test_default_profile_encoding() {
        let schema = reference_schema();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let vector = encoder.encode(&LifestyleProfile::default()).unwrap();

        assert_eq!(vector.get("Sex"), Some(0.0));
        for input in NumericInput::ALL {
            assert_eq!(vector.get(input.column()), Some(input.default_value()));
        }
        assert_eq!(group_sum::<BodyType>(&vector), 0.0);
        assert_eq!(group_sum::<Diet>(&vector), 0.0);
        assert_eq!(group_sum::<ShowerFrequency>(&vector), 0.0);
        assert_eq!(group_sum::<SocialActivity>(&vector), 0.0);
        assert_eq!(group_sum::<HeatingSource>(&vector), 0.0);
        assert_eq!(group_sum::<EnergyEfficiency>(&vector), 0.0);
        assert_eq!(group_sum::<Transport>(&vector), 0.0);
        assert_eq!(group_sum::<VehicleType>(&vector), 0.0);
        // never / small are not the dropped levels of their groups
        assert_eq!(vector.get("Frequency of Traveling by Air_never"), Some(1.0));
        assert_eq!(group_sum::<AirTravelFrequency>(&vector), 1.0);
        assert_eq!(vector.get("Waste Bag Size_small"), Some(1.0));
        assert_eq!(group_sum::<WasteBagSize>(&vector), 1.0);
        for member in RecyclingMaterial::MEMBERS {
            assert_eq!(vector.get(member.column()), Some(0.0));
        }

        let ones = vector.values().iter().filter(|v| **v == 1.0).count();
        assert_eq!(ones, 2);
    }

    #[test]
    fn test_baseline_levels_leave_groups_empty() {
        let schema = reference_schema();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let profile = LifestyleProfile {
            air_travel: AirTravelFrequency::Frequently,
            waste_bag_size: WasteBagSize::ExtraLarge,
            ..LifestyleProfile::default()
        };
        let vector = encoder.encode(&profile).unwrap();
        let categorical_ones = vector
            .iter()
            .filter(|(column, _)| NumericInput::ALL.iter().all(|i| i.column() != *column))
            .filter(|(_, value)| *value != 0.0)
            .count();
        assert_eq!(categorical_ones, 0);
    }

    #[test]
    fn test_recycling_paper_and_plastic() {
        let schema = reference_schema();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let profile = LifestyleProfile {
            recycling: [RecyclingMaterial::Paper, RecyclingMaterial::Plastic]
                .into_iter()
                .collect(),
            ..LifestyleProfile::default()
        };
        let vector = encoder.encode(&profile).unwrap();
        assert_eq!(vector.get("Paper"), Some(1.0));
        assert_eq!(vector.get("Plastic"), Some(1.0));
        assert_eq!(vector.get("Glass"), Some(0.0));
        assert_eq!(vector.get("Metal"), Some(0.0));
    }

    #[test]
    fn test_gender_is_binary() {
        let schema = reference_schema();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let female = LifestyleProfile {
            gender: Gender::Female,
            ..LifestyleProfile::default()
        };
        assert_eq!(encoder.encode(&female).unwrap().get("Sex"), Some(1.0));
        let male = LifestyleProfile::default();
        assert_eq!(encoder.encode(&male).unwrap().get("Sex"), Some(0.0));
    }

    #[test]
    fn test_unknown_transport_label_encodes_as_private() {
        let schema = reference_schema();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let profile: LifestyleProfile =
            serde_json::from_str(r#"{ "transport": "Unknown" }"#).unwrap();
        let vector = encoder.encode(&profile).unwrap();
        assert_eq!(group_sum::<Transport>(&vector), 0.0);
    }

    #[test]
    fn test_random_profiles_keep_encoding_invariants() {
        let schema = reference_schema();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let mut rng = rand_pcg::Pcg64Mcg::new(42);

        for _ in 0..500 {
            let profile = random_profile(&mut rng);
            let vector = encoder.encode(&profile).unwrap();

            assert_eq!(vector.len(), schema.len());
            assert!(
                vector
                    .iter()
                    .map(|(c, _)| c)
                    .eq(schema.columns().iter().map(String::as_str))
            );
            assert_eq!(vector.get("Sex"), Some(profile.gender.indicator()));

            assert_one_hot(&vector, profile.body_type);
            assert_one_hot(&vector, profile.diet);
            assert_one_hot(&vector, profile.shower_frequency);
            assert_one_hot(&vector, profile.social_activity);
            assert_one_hot(&vector, profile.heating_source);
            assert_one_hot(&vector, profile.energy_efficiency);
            assert_one_hot(&vector, profile.transport);
            assert_one_hot(&vector, profile.vehicle_type);
            assert_one_hot(&vector, profile.air_travel);
            assert_one_hot(&vector, profile.waste_bag_size);

            assert_multi_label(&vector, &profile.recycling);
            assert_multi_label(&vector, &profile.cooking);
        }
    }

    #[test]
    fn test_encoding_follows_shuffled_schema_order() {
        let mut columns = encoded_columns()
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>();
        columns.reverse();
        let schema = SchemaRegistry::from_columns(columns).unwrap();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let profile = LifestyleProfile {
            gender: Gender::Female,
            ..LifestyleProfile::default()
        };
        let vector = encoder.encode(&profile).unwrap();
        assert_eq!(schema.columns().last().map(String::as_str), Some("Monthly Grocery Bill"));
        assert_eq!(vector.values()[schema.len() - 1], 200.0);
        assert_eq!(vector.values()[schema.position("Sex").unwrap()], 1.0);
    }

    #[test]
    fn test_schema_missing_an_encoder_column_fails_fast() {
        let columns = encoded_columns()
            .into_iter()
            .map(|c| c.name)
            .filter(|name| *name != "Vehicle Type_lpg");
        let schema = SchemaRegistry::from_columns(columns).unwrap();
        let err = FeatureEncoder::new(&schema).unwrap_err();
        assert_eq!(
            err,
            EncodeError::SchemaMismatch {
                missing_from_schema: vec!["Vehicle Type_lpg".to_owned()],
                unknown_to_encoder: vec![],
            }
        );
    }

    #[test]
    fn test_schema_with_unknown_column_fails_fast() {
        let columns = encoded_columns()
            .into_iter()
            .map(|c| c.name)
            .chain(["Vehicle Type_diesel"]);
        let schema = SchemaRegistry::from_columns(columns).unwrap();
        let err = FeatureEncoder::new(&schema).unwrap_err();
        assert_eq!(
            err,
            EncodeError::SchemaMismatch {
                missing_from_schema: vec![],
                unknown_to_encoder: vec!["Vehicle Type_diesel".to_owned()],
            }
        );
    }

    #[test]
    fn test_range_bounds_encode() {
        let schema = reference_schema();
        let encoder = FeatureEncoder::new(&schema).unwrap();
        let picks: [fn(RangeInclusive<f64>) -> f64; 2] = [|r| *r.start(), |r| *r.end()];
        for pick in picks {
            let mut profile = LifestyleProfile::default();
            for input in NumericInput::ALL {
                profile.set_numeric(input, pick(input.range()));
            }
            let vector = encoder.encode(&profile).unwrap();
            for input in NumericInput::ALL {
                assert_eq!(vector.get(input.column()), Some(pick(input.range())));
            }
        }
    }
}
