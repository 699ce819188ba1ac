use std::path::PathBuf;

use crate::{command::RunContext, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EncodeArg {
    /// Profile JSON document
    #[arg(long)]
    profile: PathBuf,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(ctx: &RunContext, arg: &EncodeArg) -> anyhow::Result<()> {
    let EncodeArg { profile, output } = arg;

    let profile = util::read_profile_file(profile)?;
    let artifacts = ctx.load_artifacts()?;
    let pipeline = artifacts.pipeline()?;

    let row = pipeline.prepare(&profile)?;
    let active = row.raw.values().iter().filter(|v| **v != 0.0).count();
    tracing::info!(
        columns = row.raw.len(),
        non_zero = active,
        "profile encoded"
    );

    util::Output::save_json(&row, output.as_deref())?;
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

    #[test]
    fn test_encode_writes_raw_and_scaled_rows() {
        let path = scratch_dir("encode").join("row.json");
        run(
            &sample_context(),
            &EncodeArg {
                profile: repo_path("models/profiles/default.json"),
                output: Some(path.clone()),
            },
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let raw = value["raw"].as_object().unwrap();
        let scaled = value["scaled"].as_object().unwrap();
        assert_eq!(raw.len(), 45);
        assert_eq!(scaled.len(), 45);
        assert_eq!(raw["Monthly Grocery Bill"], 200.0);
        assert_eq!(raw["Sex"], 0.0);
        assert_eq!(raw["Frequency of Traveling by Air_never"], 1.0);
        assert_ne!(scaled["Monthly Grocery Bill"], raw["Monthly Grocery Bill"]);
        assert_eq!(scaled["Sex"], raw["Sex"]);
    }
}
