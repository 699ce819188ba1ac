//! Declared encoding tables for categorical profile attributes.
//!
//! Every categorical attribute of a [`LifestyleProfile`](crate::profile::LifestyleProfile)
//! is a closed enum whose levels carry two pieces of data:
//!
//! - a display label (what the form shows, e.g. `"Walk/Bicycle"`)
//! - the indicator column the trained model expects for that level
//!
//! # Single-choice attributes ([`Categorical`])
//!
//! Single-choice attributes are one-hot encoded with one level dropped. The dropped
//! level is the attribute's [`Categorical::BASELINE`]: it has no column, and selecting it
//! leaves the whole group at zero. Every other level owns exactly one column named
//! `"<Attribute>_<level>"`.
//!
//! Labels that match none of the declared levels degrade to the baseline (see
//! [`Categorical::from_label_or_baseline`]). This mirrors how the trained schema treats
//! unseen categories and is logged rather than rejected.
//!
//! # Multi-choice attributes ([`MultiLabel`])
//!
//! Multi-choice attributes are independent flags. Each member owns one column and any
//! subset may be set at the same time. A profile holds them as a [`LabelSet`].

use std::{collections::BTreeSet, fmt, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeSeq as _};

/// Normalizes a label for comparison.
///
/// Matching ignores ASCII case and treats `-`, `_`, `/` and whitespace runs as a single
/// space, so `"twice-a-day"`, `"Twice a Day"` and `"TWICE_A_DAY"` compare equal.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .split(|c: char| matches!(c, '-' | '_' | '/') || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single-choice attribute encoded as a one-hot group with a dropped baseline.
pub trait Categorical: Copy + Eq + Ord + fmt::Debug + Send + Sync + 'static {
    /// Attribute name as it appears in the column prefix (e.g. `"Body Type"`)
    const ATTRIBUTE: &'static str;
    /// Level encoded as an all-zero group
    const BASELINE: Self;
    /// All levels in form order
    const LEVELS: &'static [Self];

    #[must_use]
    fn label(self) -> &'static str;

    /// Indicator column set to 1 for this level, `None` for the baseline.
    #[must_use]
    fn column(self) -> Option<&'static str>;

    #[must_use]
    fn from_label(label: &str) -> Option<Self> {
        let key = normalize_label(label);
        Self::LEVELS
            .iter()
            .copied()
            .find(|level| normalize_label(level.label()) == key)
    }

    /// Parses a label, falling back to [`Self::BASELINE`] for unrecognized values.
    #[must_use]
    fn from_label_or_baseline(label: &str) -> Self {
        Self::from_label(label).unwrap_or_else(|| {
            tracing::warn!(
                attribute = Self::ATTRIBUTE,
                label,
                baseline = Self::BASELINE.label(),
                "unrecognized value, encoding as baseline"
            );
            Self::BASELINE
        })
    }

    /// Indicator columns of this attribute's one-hot group, in level order.
    fn group_columns() -> impl Iterator<Item = &'static str> {
        Self::LEVELS.iter().filter_map(|level| level.column())
    }
}

/// A multi-choice attribute encoded as independent indicator flags.
pub trait MultiLabel: Copy + Eq + Ord + fmt::Debug + Send + Sync + 'static {
    const ATTRIBUTE: &'static str;
    const MEMBERS: &'static [Self];

    #[must_use]
    fn label(self) -> &'static str;

    #[must_use]
    fn column(self) -> &'static str;

    #[must_use]
    fn from_label(label: &str) -> Option<Self> {
        let key = normalize_label(label);
        Self::MEMBERS
            .iter()
            .copied()
            .find(|member| normalize_label(member.label()) == key)
    }
}

pub(crate) fn serialize_label<S>(label: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&label.to_lowercase())
}

pub(crate) fn deserialize_categorical<'de, C, D>(deserializer: D) -> Result<C, D::Error>
where
    C: Categorical,
    D: Deserializer<'de>,
{
    let label = String::deserialize(deserializer)?;
    Ok(C::from_label_or_baseline(&label))
}

/// Set of selected members of a multi-choice attribute.
///
/// Deserializes from a list of labels. Unrecognized labels are dropped with a warning,
/// so the set only ever holds members that have an indicator column.
#[derive(Clone, PartialEq, Eq)]
pub struct LabelSet<T>(BTreeSet<T>);

impl<T> LabelSet<T>
where
    T: MultiLabel,
{
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, member: T) -> bool {
        self.0.insert(member)
    }

    #[must_use]
    pub fn contains(&self, member: T) -> bool {
        self.0.contains(&member)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.0.iter().copied()
    }
}

impl<T> Default for LabelSet<T>
where
    T: MultiLabel,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LabelSet<T>
where
    T: MultiLabel,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl<T> FromIterator<T> for LabelSet<T>
where
    T: MultiLabel,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> Serialize for LabelSet<T>
where
    T: MultiLabel,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for member in &self.0 {
            seq.serialize_element(&member.label().to_lowercase())?;
        }
        seq.end()
    }
}

impl<'de, T> Deserialize<'de> for LabelSet<T>
where
    T: MultiLabel,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(LabelSetVisitor(PhantomData))
    }
}

struct LabelSetVisitor<T>(PhantomData<T>);

impl<'de, T> de::Visitor<'de> for LabelSetVisitor<T>
where
    T: MultiLabel,
{
    type Value = LabelSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a list of {} labels", T::ATTRIBUTE)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let mut set = LabelSet::new();
        while let Some(label) = seq.next_element::<String>()? {
            match T::from_label(&label) {
                Some(member) => {
                    set.insert(member);
                }
                None => tracing::warn!(
                    attribute = T::ATTRIBUTE,
                    label = label.as_str(),
                    "ignoring unrecognized member"
                ),
            }
        }
        Ok(set)
    }
}

/// Declares a single-choice attribute enum and its [`Categorical`] table.
///
/// A level written with a column string owns that indicator column; a level without one
/// must be the baseline.
macro_rules! categorical {
    (@column) => {
        None
    };
    (@column $column:literal) => {
        Some($column)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $attribute:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal $(, $column:literal)? ; )+
        }
        baseline = $baseline:ident;
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $crate::attribute::Categorical for $name {
            const ATTRIBUTE: &'static str = $attribute;
            const BASELINE: Self = Self::$baseline;
            const LEVELS: &'static [Self] = &[$( Self::$variant, )+];

            fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            fn column(self) -> Option<&'static str> {
                match self {
                    $( Self::$variant => categorical!(@column $($column)?), )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::attribute::Categorical::label(*self))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                $crate::attribute::serialize_label(
                    $crate::attribute::Categorical::label(*self),
                    serializer,
                )
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                $crate::attribute::deserialize_categorical(deserializer)
            }
        }
    };
}

/// Declares a multi-choice attribute enum and its [`MultiLabel`] table.
macro_rules! multi_label {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $attribute:literal {
            $( $variant:ident => $label:literal, $column:literal ; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $variant, )+
        }

        impl $crate::attribute::MultiLabel for $name {
            const ATTRIBUTE: &'static str = $attribute;
            const MEMBERS: &'static [Self] = &[$( Self::$variant, )+];

            fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            fn column(self) -> &'static str {
                match self {
                    $( Self::$variant => $column, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::attribute::MultiLabel::label(*self))
            }
        }
    };
}

pub(crate) use {categorical, multi_label};
