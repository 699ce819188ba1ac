use std::fmt;

use serde::Serialize;

/// Reference annual footprint (kg CO₂) used for the above/below average label.
pub const AVERAGE_ANNUAL_KG: f64 = 4500.0;

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AboveAverage,
    BelowAverage,
}

impl Comparison {
    /// Strictly greater than the reference is above average; equal is below.
    #[must_use]
    pub fn classify(annual_kg: f64) -> Self {
        if annual_kg > AVERAGE_ANNUAL_KG {
            Self::AboveAverage
        } else {
            Self::BelowAverage
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AboveAverage => "above average",
            Self::BelowAverage => "below average",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Annual estimate with its daily and monthly breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionSummary {
    pub annual_kg: f64,
    pub daily_kg: f64,
    pub monthly_kg: f64,
    pub comparison: Comparison,
    pub reference_kg: f64,
}

impl EmissionSummary {
    #[must_use]
    pub fn new(annual_kg: f64) -> Self {
        Self {
            annual_kg,
            daily_kg: annual_kg / DAYS_PER_YEAR,
            monthly_kg: annual_kg / MONTHS_PER_YEAR,
            comparison: Comparison::classify(annual_kg),
            reference_kg: AVERAGE_ANNUAL_KG,
        }
    }
}
