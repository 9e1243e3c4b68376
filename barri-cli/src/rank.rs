//! Rank command implementation for the barri CLI.

use std::io::Write;
use std::sync::Arc;

use barri_core::{LogObserver, RankingReport, decode_value};
use barri_scorer::{RankerConfig, SeededJitter, TourismRanker};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BACKEND_URL, ARG_OUTPUT, ARG_RANK_INPUT, ARG_REFERENCE_MAX, ARG_SEED, ARG_TOP_N,
    BackendConnector, CliError, DatasetLocation, ENV_RANK_INPUT, write_json_output,
};

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank neighbourhoods by tourism score. The tourism dataset \
                 is read from a JSON file or downloaded from the backend, and \
                 the ranking report is printed as JSON.",
    about = "Rank neighbourhoods by tourism score"
)]
#[ortho_config(prefix = "BARRI")]
pub(crate) struct RankArgs {
    /// Path to a JSON array of tourism records.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Download the tourism dataset from this backend instead.
    #[arg(long = ARG_BACKEND_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) backend_url: Option<String>,
    /// Number of neighbourhoods to keep (default 5).
    #[arg(long = ARG_TOP_N, value_name = "n")]
    #[serde(default)]
    pub(crate) top_n: Option<usize>,
    /// Visitor count that maps to a score of 100 (default 10000).
    #[arg(long = ARG_REFERENCE_MAX, value_name = "visitors")]
    #[serde(default)]
    pub(crate) reference_max: Option<f64>,
    /// Seed for emergency jitter; without it placeholders are unperturbed.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Write the report to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RankConfig {
    pub(crate) location: DatasetLocation,
    pub(crate) ranker: RankerConfig,
    pub(crate) seed: Option<u64>,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RankConfig {
    pub(crate) fn ranker(&self) -> TourismRanker {
        let ranker = TourismRanker::new(self.ranker).with_observer(Arc::new(LogObserver));
        match self.seed {
            Some(seed) => ranker.with_jitter(Arc::new(SeededJitter::new(seed))),
            None => ranker,
        }
    }
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        let location = DatasetLocation::resolve(
            args.input,
            None,
            args.backend_url,
            ARG_RANK_INPUT,
            ENV_RANK_INPUT,
        )?;
        let mut ranker = RankerConfig::default();
        if let Some(top_n) = args.top_n {
            ranker = ranker.with_top_n(top_n)?;
        }
        if let Some(reference_max) = args.reference_max {
            ranker = ranker.with_reference_max(reference_max)?;
        }
        Ok(Self {
            location,
            ranker,
            seed: args.seed,
            output: args.output,
        })
    }
}

pub(super) fn run_rank(args: RankArgs, connector: &dyn BackendConnector) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_rank_with(args, connector, &mut stdout)
}

pub(super) fn run_rank_with(
    args: RankArgs,
    connector: &dyn BackendConnector,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_rank_config(args)?;
    let report = execute_rank(&config, connector)?;
    write_json_output(writer, config.output.as_deref(), &report)
}

fn resolve_rank_config(args: RankArgs) -> Result<RankConfig, CliError> {
    let config = args.into_config()?;
    config.location.validate_sources(ARG_RANK_INPUT, ARG_RANK_INPUT)?;
    Ok(config)
}

pub(super) fn execute_rank(
    config: &RankConfig,
    connector: &dyn BackendConnector,
) -> Result<RankingReport, CliError> {
    let source = connector.source(&config.location)?;
    let batch = decode_value(source.tourism_batch()?).map_err(|source| CliError::Batch {
        dataset: "tourism",
        source,
    })?;
    let report = config.ranker().rank(&batch);
    log::info!(
        "ranked {} neighbourhoods ({} skipped, emergency: {})",
        report.ranked.len(),
        report.skipped.len(),
        report.emergency
    );
    Ok(report)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RankConfig, CliError> {
    let merged = RankArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RankConfig::try_from(merged)
}
