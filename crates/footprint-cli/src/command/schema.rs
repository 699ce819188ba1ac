use std::{collections::HashMap, path::PathBuf};

use footprint_features::encoder::{ColumnRole, encoded_columns};
use serde::Serialize;

use crate::{command::RunContext, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SchemaArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ColumnEntry<'a> {
    position: usize,
    name: &'a str,
    role: ColumnRole,
    scaled: bool,
}

#[derive(Debug, Serialize)]
struct SchemaListing<'a> {
    scaler: &'static str,
    model: Option<&'a str>,
    n_features: usize,
    columns: Vec<ColumnEntry<'a>>,
}

pub(crate) fn run(ctx: &RunContext, arg: &SchemaArg) -> anyhow::Result<()> {
    let SchemaArg { output } = arg;

    let artifacts = ctx.load_artifacts()?;
    let pipeline = artifacts.pipeline()?;

    let roles = encoded_columns()
        .into_iter()
        .map(|c| (c.name, c.role))
        .collect::<HashMap<_, _>>();
    let scaled = pipeline.scaler().columns();

    // the pipeline has already checked that every schema column has a role
    let columns = pipeline
        .schema()
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(position, name)| {
            roles.get(name.as_str()).map(|&role| ColumnEntry {
                position,
                name,
                role,
                scaled: scaled.contains(name),
            })
        })
        .collect::<Vec<_>>();

    tracing::info!(
        columns = columns.len(),
        scaled = scaled.len(),
        "encoder, scaler and model agree with the schema"
    );

    let listing = SchemaListing {
        scaler: pipeline.scaler().kind(),
        model: pipeline.predictor().name(),
        n_features: pipeline.predictor().n_features(),
        columns,
    };
    util::Output::save_json(&listing, output.as_deref())?;
    Ok(())
}
