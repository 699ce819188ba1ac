use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::FmtSubscriber;

use crate::{
    artifacts::Artifacts,
    config::{DEFAULT_ARTIFACT_DIR, FootprintConfig},
};

use self::{encode::EncodeArg, predict::PredictArg, schema::SchemaArg, template::TemplateArg};

mod encode;
mod predict;
mod schema;
mod template;

#[derive(Debug, Clone, Parser)]
#[command(name = "footprint", author, version, about, long_about = None)]
pub struct CommandArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the schema, scaler and model artifacts
    #[arg(long, global = true)]
    artifact_dir: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Estimate the annual carbon footprint of a profile
    Predict(#[clap(flatten)] PredictArg),
    /// Print the raw and scaled feature vectors of a profile
    Encode(#[clap(flatten)] EncodeArg),
    /// List schema columns and check the artifacts agree
    Schema(#[clap(flatten)] SchemaArg),
    /// Write the default profile document
    Template(#[clap(flatten)] TemplateArg),
}

/// Settings shared by every subcommand after merging the config file and options.
#[derive(Debug, Clone)]
pub(crate) struct RunContext {
    pub(crate) config: FootprintConfig,
    pub(crate) artifact_dir: PathBuf,
}

impl RunContext {
    pub(crate) fn load_artifacts(&self) -> anyhow::Result<Artifacts> {
        let paths = self.config.artifacts.resolve(&self.artifact_dir);
        Artifacts::load(&paths)
    }
}

fn init_tracing(level: tracing::Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.log_level)?;

    let config = FootprintConfig::load(args.config.as_deref())?;
    let ctx = RunContext {
        config,
        artifact_dir: args
            .artifact_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_DIR)),
    };

    match args.mode {
        Mode::Predict(arg) => predict::run(&ctx, &arg)?,
        Mode::Encode(arg) => encode::run(&ctx, &arg)?,
        Mode::Schema(arg) => schema::run(&ctx, &arg)?,
        Mode::Template(arg) => template::run(&arg)?,
    }
    Ok(())
}
