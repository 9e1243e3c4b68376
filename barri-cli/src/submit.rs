//! Feedback and newsletter commands for the barri CLI.

use std::io::Write;

use barri_core::{NeighbourhoodFeedback, NewsletterSubscription, SubmissionReceipt};
use barri_data::read_json;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BACKEND_URL, ARG_FEEDBACK_PAYLOAD, ARG_SUBSCRIBE_EMAIL, BackendConnector, CliError,
    ENV_FEEDBACK_PAYLOAD, ENV_SUBSCRIBE_EMAIL, default_backend_url, require_existing,
    write_json_output,
};

/// CLI arguments for the `feedback` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Validate a neighbourhood rating form stored as JSON and \
                 post it to the backend. Every invalid field is reported \
                 before anything is sent.",
    about = "Submit a neighbourhood rating form"
)]
#[ortho_config(prefix = "BARRI")]
pub(crate) struct FeedbackArgs {
    /// Path to the JSON rating form.
    #[arg(long = ARG_FEEDBACK_PAYLOAD, value_name = "path")]
    #[serde(default)]
    pub(crate) payload: Option<Utf8PathBuf>,
    /// Backend base URL.
    #[arg(long = ARG_BACKEND_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) backend_url: Option<String>,
}

/// CLI arguments for the `subscribe` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Subscribe an email address to the newsletter")]
#[ortho_config(prefix = "BARRI")]
pub(crate) struct SubscribeArgs {
    /// Email address to subscribe.
    #[arg(long = ARG_SUBSCRIBE_EMAIL, value_name = "address")]
    #[serde(default)]
    pub(crate) email: Option<String>,
    /// Backend base URL.
    #[arg(long = ARG_BACKEND_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) backend_url: Option<String>,
}

/// Resolved `feedback` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedbackConfig {
    pub(crate) payload: Utf8PathBuf,
    pub(crate) backend_url: String,
}

impl TryFrom<FeedbackArgs> for FeedbackConfig {
    type Error = CliError;

    fn try_from(args: FeedbackArgs) -> Result<Self, Self::Error> {
        let payload = args.payload.ok_or(CliError::MissingArgument {
            field: ARG_FEEDBACK_PAYLOAD,
            env: ENV_FEEDBACK_PAYLOAD,
        })?;
        Ok(Self {
            payload,
            backend_url: args.backend_url.unwrap_or_else(default_backend_url),
        })
    }
}

/// Resolved `subscribe` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubscribeConfig {
    pub(crate) email: String,
    pub(crate) backend_url: String,
}

impl TryFrom<SubscribeArgs> for SubscribeConfig {
    type Error = CliError;

    fn try_from(args: SubscribeArgs) -> Result<Self, Self::Error> {
        let email = args.email.ok_or(CliError::MissingArgument {
            field: ARG_SUBSCRIBE_EMAIL,
            env: ENV_SUBSCRIBE_EMAIL,
        })?;
        Ok(Self {
            email,
            backend_url: args.backend_url.unwrap_or_else(default_backend_url),
        })
    }
}

pub(super) fn run_feedback(
    args: FeedbackArgs,
    connector: &dyn BackendConnector,
) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_feedback_with(args, connector, &mut stdout)
}

pub(super) fn run_feedback_with(
    args: FeedbackArgs,
    connector: &dyn BackendConnector,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = FeedbackConfig::try_from(merged)?;
    let receipt = submit_feedback(&config, connector)?;
    write_json_output(writer, None, &receipt)
}

pub(super) fn submit_feedback(
    config: &FeedbackConfig,
    connector: &dyn BackendConnector,
) -> Result<SubmissionReceipt, CliError> {
    let feedback = load_feedback(&config.payload)?;
    let sink = connector.sink(&config.backend_url)?;
    let receipt = sink.submit_feedback(&feedback)?;
    log::info!("feedback accepted with status {}", receipt.status);
    Ok(receipt)
}

/// Read and validate a rating form from disk.
pub(super) fn load_feedback(path: &Utf8Path) -> Result<NeighbourhoodFeedback, CliError> {
    require_existing(path, ARG_FEEDBACK_PAYLOAD)?;
    let payload = read_json(path)?;
    Ok(NeighbourhoodFeedback::from_json(&payload)?)
}

pub(super) fn run_subscribe(
    args: SubscribeArgs,
    connector: &dyn BackendConnector,
) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_subscribe_with(args, connector, &mut stdout)
}

pub(super) fn run_subscribe_with(
    args: SubscribeArgs,
    connector: &dyn BackendConnector,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = SubscribeConfig::try_from(merged)?;
    let receipt = submit_subscription(&config, connector)?;
    write_json_output(writer, None, &receipt)
}

pub(super) fn submit_subscription(
    config: &SubscribeConfig,
    connector: &dyn BackendConnector,
) -> Result<SubmissionReceipt, CliError> {
    let subscription = NewsletterSubscription::new(&config.email)?;
    let sink = connector.sink(&config.backend_url)?;
    let receipt = sink.subscribe(&subscription)?;
    log::info!("subscription accepted with status {}", receipt.status);
    Ok(receipt)
}
