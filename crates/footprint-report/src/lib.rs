//! Presenting an emission estimate.
//!
//! Given a profile and the annual estimate produced by the model, this crate derives
//! everything the user sees:
//!
//! - [`summary`] - Daily and monthly breakdowns and the comparison with the average
//! - [`recommendation`] - Independent habit rules over the raw profile answers
//! - [`insight`] - The optional text generator seam, with non-fatal failure handling
//! - [`http_insight`] - A generator calling an OpenAI-compatible HTTP endpoint
//! - [`report`] - The assembled [`FootprintReport`](report::FootprintReport)

pub mod http_insight;
pub mod insight;
pub mod recommendation;
pub mod report;
pub mod summary;
