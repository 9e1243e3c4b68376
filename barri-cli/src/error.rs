//! Error types emitted by the barri CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use barri_core::{BatchError, FeedbackError, SourceError};
use barri_data::BackendBuildError;
use barri_scorer::RankerConfigError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the barri CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without dashes.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Two options that select a dataset location were both given.
    #[error("--{first} and --{second} cannot be combined")]
    ConflictingArguments {
        /// First flag name.
        first: &'static str,
        /// Second flag name.
        second: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Path that could not be inspected.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Ranker options were out of range.
    #[error(transparent)]
    RankerConfig(#[from] RankerConfigError),
    /// Constructing the backend client failed.
    #[error("failed to build backend client for {base_url:?}: {source}")]
    BuildBackend {
        /// Configured base URL.
        base_url: String,
        /// Underlying build error.
        #[source]
        source: BackendBuildError,
    },
    /// Loading a dataset or submitting a payload failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A dataset was not a JSON array.
    #[error("invalid {dataset} dataset: {source}")]
    Batch {
        /// Which dataset failed.
        dataset: &'static str,
        /// Underlying decoding error.
        #[source]
        source: BatchError,
    },
    /// A rating form or subscription failed validation.
    #[error(transparent)]
    InvalidSubmission(#[from] FeedbackError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output to stdout failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing command output to a file failed.
    #[error("failed to write output to {path:?}: {source}")]
    WriteOutputFile {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
