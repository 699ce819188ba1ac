//! Optional free-text commentary on an estimate.
//!
//! The report does not depend on any particular text generator. It takes a
//! `&dyn InsightGenerator` and asks it for commentary once per report. A generator
//! failure is turned into [`InsightOutcome::Unavailable`] and never aborts the report.

use std::error::Error;

use footprint_features::profile::LifestyleProfile;
use serde::Serialize;

/// Failure of any [`InsightGenerator`]; backend errors are carried as the source.
#[derive(Debug, derive_more::Display)]
pub enum InsightError {
    #[display("insight generator failed")]
    Backend {
        source: Box<dyn Error + Send + Sync>,
    },
    #[display("insight generator returned no text")]
    Empty,
}

impl InsightError {
    pub fn backend<E>(source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(source),
        }
    }
}

impl Error for InsightError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend { source } => Some(source.as_ref()),
            Self::Empty => None,
        }
    }
}

/// Produces commentary from a plain-text profile summary and the annual estimate.
pub trait InsightGenerator: std::fmt::Debug + Send + Sync {
    fn summarize(&self, profile_summary: &str, annual_kg: f64) -> Result<String, InsightError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsightOutcome {
    Generated { text: String },
    Unavailable { reason: String },
    Disabled,
}

impl InsightOutcome {
    /// Asks `generator` for commentary, degrading failures to [`Self::Unavailable`].
    #[must_use]
    pub fn request(
        generator: Option<&dyn InsightGenerator>,
        profile: &LifestyleProfile,
        annual_kg: f64,
    ) -> Self {
        let Some(generator) = generator else {
            return Self::Disabled;
        };
        match generator.summarize(&profile.summary(), annual_kg) {
            Ok(text) => Self::Generated { text },
            Err(err) => {
                let reason = error_chain(&err);
                tracing::warn!(%reason, "insight generation failed");
                Self::Unavailable { reason }
            }
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Generated { text } => Some(text),
            Self::Unavailable { .. } | Self::Disabled => None,
        }
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every request and answers with a fixed result.
    #[derive(Debug, Default)]
    pub(crate) struct FakeGenerator {
        pub(crate) fail: bool,
        pub(crate) requests: Mutex<Vec<(String, f64)>>,
    }

    impl InsightGenerator for FakeGenerator {
        fn summarize(&self, profile_summary: &str, annual_kg: f64) -> Result<String, InsightError> {
            self.requests
                .lock()
                .unwrap()
                .push((profile_summary.to_owned(), annual_kg));
            if self.fail {
                Err(InsightError::Backend {
                    source: "overloaded".into(),
                })
            } else {
                Ok(format!("about {annual_kg:.0} kg"))
            }
        }
    }

    #[test]
    fn test_generated_insight_receives_summary_and_estimate() {
        let generator = FakeGenerator::default();
        let profile = LifestyleProfile::default();
        let outcome = InsightOutcome::request(Some(&generator), &profile, 3200.0);
        assert_eq!(outcome.text(), Some("about 3200 kg"));

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, profile.summary());
        assert_eq!(requests[0].1, 3200.0);
    }

    #[test]
    fn test_failure_degrades_to_unavailable() {
        let generator = FakeGenerator {
            fail: true,
            ..FakeGenerator::default()
        };
        let outcome =
            InsightOutcome::request(Some(&generator), &LifestyleProfile::default(), 1.0);
        assert_eq!(
            outcome,
            InsightOutcome::Unavailable {
                reason: "insight generator failed: overloaded".to_owned()
            }
        );
    }

    #[test]
    fn test_empty_text_degrades_to_unavailable() {
        #[derive(Debug)]
        struct Silent;

        impl InsightGenerator for Silent {
            fn summarize(&self, _: &str, _: f64) -> Result<String, InsightError> {
                Err(InsightError::Empty)
            }
        }

        let outcome = InsightOutcome::request(Some(&Silent), &LifestyleProfile::default(), 1.0);
        assert_eq!(
            outcome,
            InsightOutcome::Unavailable {
                reason: "insight generator returned no text".to_owned()
            }
        );
    }

    #[test]
    fn test_missing_generator_is_disabled() {
        let outcome = InsightOutcome::request(None, &LifestyleProfile::default(), 1.0);
        assert_eq!(outcome, InsightOutcome::Disabled);
        assert_eq!(outcome.text(), None);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&InsightOutcome::Disabled).unwrap();
        assert_eq!(json, r#"{"status":"disabled"}"#);
    }
}
