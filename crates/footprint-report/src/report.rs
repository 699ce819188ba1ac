use std::fmt;

use chrono::{DateTime, Utc};
use footprint_features::profile::LifestyleProfile;
use serde::Serialize;

use crate::{
    insight::{InsightGenerator, InsightOutcome},
    recommendation::{self, CONGRATULATION, ESTIMATE_CAVEAT, Recommendation},
    summary::EmissionSummary,
};

/// Everything shown to the user for one estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootprintReport {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub emissions: EmissionSummary,
    pub recommendations: Vec<Recommendation>,
    pub insight: InsightOutcome,
    pub caveat: &'static str,
}

impl FootprintReport {
    /// Builds the report for `profile` and its annual estimate.
    #[must_use]
    pub fn build(
        profile: &LifestyleProfile,
        annual_kg: f64,
        insight: Option<&dyn InsightGenerator>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            model: None,
            emissions: EmissionSummary::new(annual_kg),
            recommendations: recommendation::recommend(profile),
            insight: InsightOutcome::request(insight, profile, annual_kg),
            caveat: ESTIMATE_CAVEAT,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(str::to_owned);
        self
    }
}

impl fmt::Display for FootprintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.emissions;
        writeln!(
            f,
            "Estimated annual carbon footprint: {:.2} kg CO2",
            e.annual_kg
        )?;
        writeln!(f)?;
        writeln!(f, "  Daily emissions:     {:>10.2} kg", e.daily_kg)?;
        writeln!(f, "  Monthly emissions:   {:>10.2} kg", e.monthly_kg)?;
        writeln!(
            f,
            "  Compared to average: {} (average person: ~{:.0} kg/year)",
            e.comparison, e.reference_kg
        )?;
        writeln!(f)?;

        writeln!(f, "Recommendations:")?;
        if self.recommendations.is_empty() {
            writeln!(f, "  {CONGRATULATION}")?;
        }
        for recommendation in &self.recommendations {
            writeln!(f, "  - {}", recommendation.message)?;
        }

        match &self.insight {
            InsightOutcome::Generated { text } => {
                writeln!(f)?;
                writeln!(f, "Insight:")?;
                for line in text.lines() {
                    writeln!(f, "  {line}")?;
                }
            }
            InsightOutcome::Unavailable { reason } => {
                writeln!(f)?;
                writeln!(f, "Insight unavailable: {reason}")?;
            }
            InsightOutcome::Disabled => {}
        }

        writeln!(f)?;
        write!(f, "Note: {}", self.caveat)
    }
}
