//! Compare command implementation for the barri CLI.

use std::io::Write;

use barri_core::{decode_summaries, decode_value};
use barri_scorer::{ComparisonRow, ComparisonSelection, TourismRanker, compare_neighbourhoods};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BACKEND_URL, ARG_COMPARE_IDS, ARG_COMPARE_SUMMARY, ARG_COMPARE_TOURISM, ARG_OUTPUT,
    BackendConnector, CliError, DatasetLocation, ENV_COMPARE_IDS, ENV_COMPARE_SUMMARY,
    ENV_COMPARE_TOURISM, write_json_output,
};

/// CLI arguments for the `compare` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Join the tourism and summary datasets for the selected \
                 neighbourhoods and print one comparison row per identifier, \
                 in selection order. Unknown identifiers are skipped.",
    about = "Compare selected neighbourhoods side by side"
)]
#[ortho_config(prefix = "BARRI")]
pub(crate) struct CompareArgs {
    /// Neighbourhood identifiers to compare.
    #[arg(value_name = "id")]
    #[serde(default)]
    pub(crate) ids: Vec<String>,
    /// Path to the tourism dataset.
    #[arg(long = ARG_COMPARE_TOURISM, value_name = "path")]
    #[serde(default)]
    pub(crate) tourism: Option<Utf8PathBuf>,
    /// Path to the summary dataset.
    #[arg(long = ARG_COMPARE_SUMMARY, value_name = "path")]
    #[serde(default)]
    pub(crate) summary: Option<Utf8PathBuf>,
    /// Download both datasets from this backend instead.
    #[arg(long = ARG_BACKEND_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) backend_url: Option<String>,
    /// Write the rows to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl CompareArgs {
    pub(crate) fn into_config(self) -> Result<CompareConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CompareConfig::try_from(merged)
    }
}

/// Resolved `compare` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompareConfig {
    pub(crate) location: DatasetLocation,
    pub(crate) selection: ComparisonSelection,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<CompareArgs> for CompareConfig {
    type Error = CliError;

    fn try_from(args: CompareArgs) -> Result<Self, Self::Error> {
        let selection: ComparisonSelection = args.ids.iter().collect();
        if selection.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_COMPARE_IDS,
                env: ENV_COMPARE_IDS,
            });
        }
        let location = DatasetLocation::resolve(
            args.tourism,
            args.summary,
            args.backend_url,
            ARG_COMPARE_TOURISM,
            ENV_COMPARE_TOURISM,
        )?;
        if matches!(location, DatasetLocation::Files { summary: None, .. }) {
            return Err(CliError::MissingArgument {
                field: ARG_COMPARE_SUMMARY,
                env: ENV_COMPARE_SUMMARY,
            });
        }
        Ok(Self {
            location,
            selection,
            output: args.output,
        })
    }
}

pub(super) fn run_compare(
    args: CompareArgs,
    connector: &dyn BackendConnector,
) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_compare_with(args, connector, &mut stdout)
}

pub(super) fn run_compare_with(
    args: CompareArgs,
    connector: &dyn BackendConnector,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config
        .location
        .validate_sources(ARG_COMPARE_TOURISM, ARG_COMPARE_SUMMARY)?;
    let rows = execute_compare(&config, connector)?;
    write_json_output(writer, config.output.as_deref(), &rows)
}

pub(super) fn execute_compare(
    config: &CompareConfig,
    connector: &dyn BackendConnector,
) -> Result<Vec<ComparisonRow>, CliError> {
    let source = connector.source(&config.location)?;
    let tourism: Vec<_> = decode_value(source.tourism_batch()?)
        .map_err(|source| CliError::Batch {
            dataset: "tourism",
            source,
        })?
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    let summaries: Vec<_> = decode_summaries(source.summary_batch()?)
        .map_err(|source| CliError::Batch {
            dataset: "summary",
            source,
        })?
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    let rows = compare_neighbourhoods(
        &tourism,
        &summaries,
        &config.selection,
        &TourismRanker::default(),
    );
    if rows.len() < config.selection.ids().len() {
        log::warn!(
            "{} of {} selected neighbourhoods were not found",
            config.selection.ids().len() - rows.len(),
            config.selection.ids().len()
        );
    }
    Ok(rows)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CompareConfig, CliError> {
    let merged = CompareArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CompareConfig::try_from(merged)
}
