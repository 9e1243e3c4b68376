//! Command-line interface for the Barcelona neighbourhood tourism engine.
#![forbid(unsafe_code)]

use std::io::Write;
use std::sync::Arc;

use barri_core::{FeedbackSink, NeighbourhoodSource};
use barri_data::{
    FileNeighbourhoodSource, HttpFeedbackSink, HttpNeighbourhoodSource, HttpSourceConfig,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use serde::Serialize;

mod compare;
mod error;
mod rank;
mod submit;

pub use error::CliError;

use compare::{CompareArgs, run_compare};
use rank::{RankArgs, run_rank};
use submit::{FeedbackArgs, SubscribeArgs, run_feedback, run_subscribe};

pub(crate) const ARG_RANK_INPUT: &str = "input";
pub(crate) const ARG_BACKEND_URL: &str = "backend-url";
pub(crate) const ARG_TOP_N: &str = "top-n";
pub(crate) const ARG_REFERENCE_MAX: &str = "reference-max";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_COMPARE_TOURISM: &str = "tourism";
pub(crate) const ARG_COMPARE_SUMMARY: &str = "summary";
pub(crate) const ARG_COMPARE_IDS: &str = "ids";
pub(crate) const ARG_FEEDBACK_PAYLOAD: &str = "payload";
pub(crate) const ARG_SUBSCRIBE_EMAIL: &str = "email";

pub(crate) const ENV_RANK_INPUT: &str = "BARRI_CMDS_RANK_INPUT";
pub(crate) const ENV_COMPARE_TOURISM: &str = "BARRI_CMDS_COMPARE_TOURISM";
pub(crate) const ENV_COMPARE_SUMMARY: &str = "BARRI_CMDS_COMPARE_SUMMARY";
pub(crate) const ENV_COMPARE_IDS: &str = "BARRI_CMDS_COMPARE_IDS";
pub(crate) const ENV_FEEDBACK_PAYLOAD: &str = "BARRI_CMDS_FEEDBACK_PAYLOAD";
pub(crate) const ENV_SUBSCRIBE_EMAIL: &str = "BARRI_CMDS_SUBSCRIBE_EMAIL";

/// Run the barri CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, data loading or
/// output fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let connector = DefaultConnector;
    match cli.command {
        Command::Rank(args) => run_rank(args, &connector),
        Command::Compare(args) => run_compare(args, &connector),
        Command::Feedback(args) => run_feedback(args, &connector),
        Command::Subscribe(args) => run_subscribe(args, &connector),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "barri",
    about = "Rank and compare Barcelona neighbourhoods by tourism pressure",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Rank neighbourhoods by tourism score.
    Rank(RankArgs),
    /// Compare selected neighbourhoods side by side.
    Compare(CompareArgs),
    /// Submit a neighbourhood rating form.
    Feedback(FeedbackArgs),
    /// Subscribe an email address to the newsletter.
    Subscribe(SubscribeArgs),
}

/// Where the tourism and summary datasets come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DatasetLocation {
    /// Local JSON files.
    Files {
        tourism: Utf8PathBuf,
        summary: Option<Utf8PathBuf>,
    },
    /// The neighbourhood backend.
    Backend { base_url: String },
}

impl DatasetLocation {
    /// Pick files when a tourism path is given, otherwise the backend.
    pub(crate) fn resolve(
        tourism: Option<Utf8PathBuf>,
        summary: Option<Utf8PathBuf>,
        backend_url: Option<String>,
        tourism_field: &'static str,
        tourism_env: &'static str,
    ) -> Result<Self, CliError> {
        match (tourism, backend_url) {
            (Some(_), Some(_)) => Err(CliError::ConflictingArguments {
                first: tourism_field,
                second: ARG_BACKEND_URL,
            }),
            (Some(tourism), None) => Ok(Self::Files { tourism, summary }),
            (None, Some(_)) if summary.is_some() => Err(CliError::ConflictingArguments {
                first: ARG_COMPARE_SUMMARY,
                second: ARG_BACKEND_URL,
            }),
            (None, Some(base_url)) => Ok(Self::Backend { base_url }),
            (None, None) => Err(CliError::MissingArgument {
                field: tourism_field,
                env: tourism_env,
            }),
        }
    }

    pub(crate) fn validate_sources(
        &self,
        tourism_field: &'static str,
        summary_field: &'static str,
    ) -> Result<(), CliError> {
        if let Self::Files { tourism, summary } = self {
            require_existing(tourism, tourism_field)?;
            if let Some(summary) = summary {
                require_existing(summary, summary_field)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match barri_fs::is_regular_file(path) {
        Ok(true) => Ok(()),
        Ok(false) if path.exists() => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Builds data sources and submission sinks for a command invocation.
pub(crate) trait BackendConnector {
    fn source(&self, location: &DatasetLocation) -> Result<Arc<dyn NeighbourhoodSource>, CliError>;
    fn sink(&self, base_url: &str) -> Result<Arc<dyn FeedbackSink>, CliError>;
}

pub(crate) struct DefaultConnector;

impl BackendConnector for DefaultConnector {
    fn source(&self, location: &DatasetLocation) -> Result<Arc<dyn NeighbourhoodSource>, CliError> {
        match location {
            DatasetLocation::Files { tourism, summary } => {
                let source = FileNeighbourhoodSource::new(tourism.clone());
                Ok(Arc::new(match summary {
                    Some(summary) => source.with_summary(summary.clone()),
                    None => source,
                }))
            }
            DatasetLocation::Backend { base_url } => {
                HttpNeighbourhoodSource::new(HttpSourceConfig::new(base_url.clone()))
                    .map(|source| Arc::new(source) as Arc<dyn NeighbourhoodSource>)
                    .map_err(|source| CliError::BuildBackend {
                        base_url: base_url.clone(),
                        source,
                    })
            }
        }
    }

    fn sink(&self, base_url: &str) -> Result<Arc<dyn FeedbackSink>, CliError> {
        HttpFeedbackSink::new(HttpSourceConfig::new(base_url))
            .map(|sink| Arc::new(sink) as Arc<dyn FeedbackSink>)
            .map_err(|source| CliError::BuildBackend {
                base_url: base_url.to_owned(),
                source,
            })
    }
}

/// Default backend URL used when none is configured.
pub(crate) fn default_backend_url() -> String {
    HttpSourceConfig::default().base_url
}

/// Write `value` as pretty JSON to `path`, or to `writer` when no path is set.
pub(crate) fn write_json_output<T: Serialize>(
    writer: &mut dyn Write,
    output: Option<&Utf8Path>,
    value: &T,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    payload.push('\n');
    match output {
        Some(path) => {
            barri_fs::write_utf8(path, &payload).map_err(|source| CliError::WriteOutputFile {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("wrote output to {path}");
            Ok(())
        }
        None => writer
            .write_all(payload.as_bytes())
            .map_err(CliError::WriteOutput),
    }
}

#[cfg(test)]
mod tests;
