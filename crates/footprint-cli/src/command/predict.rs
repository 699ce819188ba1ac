use std::path::PathBuf;

use footprint_report::{
    http_insight::{HttpInsightError, HttpInsightGenerator},
    insight::InsightGenerator,
    report::FootprintReport,
};

use crate::{command::RunContext, config::InsightSettings, util};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Profile JSON document
    #[arg(long)]
    profile: PathBuf,
    /// Report format (text or json)
    #[arg(long, default_value = "text")]
    format: ReportFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Skip the insight service even if it is enabled in the configuration
    #[arg(long)]
    no_insight: bool,
}

fn insight_generator(
    settings: &InsightSettings,
    disabled: bool,
) -> Result<Option<HttpInsightGenerator>, HttpInsightError> {
    if disabled || !settings.enabled {
        return Ok(None);
    }
    HttpInsightGenerator::new(settings.http_config()).map(Some)
}

pub(crate) fn run(ctx: &RunContext, arg: &PredictArg) -> anyhow::Result<()> {
    let PredictArg {
        profile,
        format,
        output,
        no_insight,
    } = arg;

    let profile = util::read_profile_file(profile)?;
    let artifacts = ctx.load_artifacts()?;
    let pipeline = artifacts.pipeline()?;

    let annual_kg = pipeline.estimate(&profile)?;
    tracing::info!(annual_kg, "prediction complete");

    // a client that cannot be built only loses the commentary
    let generator = insight_generator(&ctx.config.insight, *no_insight).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "insight client unavailable");
        None
    });
    let report = FootprintReport::build(
        &profile,
        annual_kg,
        generator.as_ref().map(|g| g as &dyn InsightGenerator),
    )
    .with_model(artifacts.predictor.name());

    match format {
        ReportFormat::Text => util::Output::save_text(&report, output.as_deref())?,
        ReportFormat::Json => util::Output::save_json(&report, output.as_deref())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        command::tests::{repo_path, sample_context},
        util::tests::scratch_dir,
    };

    fn predict_to(dir: &str, profile: &str, format: ReportFormat) -> String {
        let path = scratch_dir(dir).join("report");
        run(
            &sample_context(),
            &PredictArg {
                profile: repo_path(profile),
                format,
                output: Some(path.clone()),
                no_insight: true,
            },
        )
        .unwrap();
        fs::read_to_string(&path).unwrap()
    }

    #[test]
    fn test_predict_json_report() {
        let json = predict_to(
            "predict-json",
            "models/profiles/frequent-flyer.json",
            ReportFormat::Json,
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let annual = value["emissions"]["annual_kg"].as_f64().unwrap();
        let daily = value["emissions"]["daily_kg"].as_f64().unwrap();
        assert!(annual > 0.0);
        assert!((daily * 365.0 - annual).abs() < 1e-6);
        assert_eq!(value["insight"]["status"], "disabled");
        assert!(!value["recommendations"].as_array().unwrap().is_empty());
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_predict_text_report() {
        let text = predict_to(
            "predict-text",
            "models/profiles/default.json",
            ReportFormat::Text,
        );
        assert!(text.starts_with("Estimated annual carbon footprint:"));
        assert!(text.contains("Recommendations:"));
    }

    #[test]
    fn test_predict_rejects_missing_profile() {
        let err = run(
            &sample_context(),
            &PredictArg {
                profile: repo_path("models/profiles/missing.json"),
                ..PredictArg::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_report_format_parses_case_insensitively() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("Text".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_insight_disabled_by_flag_or_config() {
        let enabled = InsightSettings {
            enabled: true,
            ..InsightSettings::default()
        };
        assert!(insight_generator(&enabled, true).unwrap().is_none());
        assert!(
            insight_generator(&InsightSettings::default(), false)
                .unwrap()
                .is_none()
        );
        assert!(insight_generator(&enabled, false).unwrap().is_some());
    }
}
