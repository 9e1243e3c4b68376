//! Seams to the neighbourhood datasets and the feedback backend.
//!
//! Sources return raw JSON so the batch decoder can skip individual bad
//! elements instead of failing a whole download.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{NeighbourhoodFeedback, NewsletterSubscription};

/// Errors raised while fetching or submitting data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// A local dataset could not be read.
    #[error("failed to read {location}: {message}")]
    Read {
        /// Path or URL that was being read.
        location: String,
        /// Underlying diagnostic.
        message: String,
    },
    /// A dataset was read but is not valid JSON.
    #[error("failed to parse {location}: {message}")]
    Parse {
        /// Path or URL the payload came from.
        location: String,
        /// Underlying diagnostic.
        message: String,
    },
    /// The request exceeded its deadline.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The server answered with a non-success status.
    #[error("request to {url} failed with HTTP status {status}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request failed before a response arrived.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying diagnostic.
        message: String,
    },
}

/// Provider of the two neighbourhood datasets.
///
/// Implementations must be `Send + Sync` so a single source can back several
/// command handlers.
pub trait NeighbourhoodSource: Send + Sync {
    /// Fetch the tourism batch, a JSON array of neighbourhood records.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the dataset cannot be fetched or parsed.
    fn tourism_batch(&self) -> Result<Value, SourceError>;

    /// Fetch the overlay summary batch.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the dataset cannot be fetched or parsed.
    fn summary_batch(&self) -> Result<Value, SourceError>;
}

/// Backend acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// HTTP status code returned by the backend.
    pub status: u16,
    /// Response body, or `null` when it was empty or not JSON.
    #[serde(default)]
    pub body: Value,
}

/// Receiver of validated user submissions.
pub trait FeedbackSink: Send + Sync {
    /// Send a neighbourhood rating.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the backend rejects or never receives it.
    fn submit_feedback(
        &self,
        feedback: &NeighbourhoodFeedback,
    ) -> Result<SubmissionReceipt, SourceError>;

    /// Register a newsletter subscription.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the backend rejects or never receives it.
    fn subscribe(
        &self,
        subscription: &NewsletterSubscription,
    ) -> Result<SubmissionReceipt, SourceError>;
}
