//! HTTP access to the neighbourhood backend.
//!
//! [`HttpNeighbourhoodSource`] downloads the two datasets and
//! [`HttpFeedbackSink`] posts rating forms and newsletter sign-ups. Both
//! share a [`BackendClient`], which implements the synchronous core traits by
//! blocking on asynchronous `reqwest` calls.
//!
//! # Runtime behaviour
//!
//! Outside any Tokio runtime, or inside a `current_thread` runtime, requests
//! run on a runtime owned by the client. Inside a multi-threaded runtime the
//! caller's handle is used through [`tokio::task::block_in_place`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use barri_core::{
    FeedbackSink, NeighbourhoodFeedback, NeighbourhoodSource, NewsletterSubscription, SourceError,
    SubmissionReceipt,
};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

/// Default backend base URL.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/api/backend";
/// Default user agent for backend requests.
pub const DEFAULT_USER_AGENT: &str = "barri-engine/0.1";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Path of the tourism dataset relative to the base URL.
pub const TOURISM_PATH: &str = "neighborhoods/full-data";
/// Path of the summary dataset relative to the base URL.
pub const SUMMARY_PATH: &str = "summary/full-data";
/// Path rating forms are posted to.
pub const FEEDBACK_PATH: &str = "formularios";
/// Path newsletter subscriptions are posted to.
pub const NEWSLETTER_PATH: &str = "newsletter";

/// Errors raised while building a [`BackendClient`].
#[derive(Debug, Error)]
pub enum BackendBuildError {
    /// The base URL is not an absolute HTTP(S) URL.
    #[error("invalid backend URL {url}: {reason}")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// The Tokio runtime could not be built.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Connection settings for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// Base URL that endpoint paths are appended to.
    pub base_url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpSourceConfig {
    /// Configuration for `base_url` with default timeout and user agent.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Shared HTTP client and runtime for backend calls.
pub struct BackendClient {
    client: Client,
    config: HttpSourceConfig,
    base: String,
    runtime: Runtime,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    /// Returns [`BackendBuildError`] when the base URL is invalid or the HTTP
    /// client or runtime cannot be built.
    pub fn new(config: HttpSourceConfig) -> Result<Self, BackendBuildError> {
        let base = validate_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(BackendBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BackendBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Absolute URL of `path` below the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// GET `path` and parse the body as JSON.
    ///
    /// # Errors
    /// Returns [`SourceError`] for network, status, timeout and parse
    /// failures.
    pub fn get_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = self.endpoint(path);
        self.block_on(async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|err| self.convert_reqwest_error(&err, &url))?;
            response.json::<Value>().await.map_err(|err| SourceError::Parse {
                location: url.clone(),
                message: err.to_string(),
            })
        })
    }

    /// POST `body` as JSON to `path`.
    ///
    /// A response body that is empty or not JSON is reported as `null`.
    ///
    /// # Errors
    /// Returns [`SourceError`] for network, status and timeout failures.
    pub fn post_json(&self, path: &str, body: &Value) -> Result<SubmissionReceipt, SourceError> {
        let url = self.endpoint(path);
        self.block_on(async {
            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|err| self.convert_reqwest_error(&err, &url))?;
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|err| self.convert_reqwest_error(&err, &url))?;
            log::debug!("POST {url} answered {status}");
            Ok(SubmissionReceipt {
                status,
                body: serde_json::from_str(&text).unwrap_or(Value::Null),
            })
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> SourceError {
        if error.is_timeout() {
            return SourceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return SourceError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            };
        }
        SourceError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn validate_base_url(raw: &str) -> Result<String, BackendBuildError> {
    let invalid = |reason: String| BackendBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

/// Downloads both datasets from the backend.
///
/// # Examples
///
/// ```no_run
/// use barri_core::NeighbourhoodSource;
/// use barri_data::{HttpNeighbourhoodSource, HttpSourceConfig};
///
/// let source = HttpNeighbourhoodSource::new(HttpSourceConfig::new("https://barri.example/api"))?;
/// let batch = source.tourism_batch()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct HttpNeighbourhoodSource {
    backend: BackendClient,
}

impl HttpNeighbourhoodSource {
    /// Build a source for `config`.
    ///
    /// # Errors
    /// Returns [`BackendBuildError`] when the client cannot be built.
    pub fn new(config: HttpSourceConfig) -> Result<Self, BackendBuildError> {
        BackendClient::new(config).map(Self::from_client)
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn from_client(backend: BackendClient) -> Self {
        Self { backend }
    }
}

impl NeighbourhoodSource for HttpNeighbourhoodSource {
    fn tourism_batch(&self) -> Result<Value, SourceError> {
        self.backend.get_json(TOURISM_PATH)
    }

    fn summary_batch(&self) -> Result<Value, SourceError> {
        self.backend.get_json(SUMMARY_PATH)
    }
}

/// Posts validated submissions to the backend.
#[derive(Debug)]
pub struct HttpFeedbackSink {
    backend: BackendClient,
}

impl HttpFeedbackSink {
    /// Build a sink for `config`.
    ///
    /// # Errors
    /// Returns [`BackendBuildError`] when the client cannot be built.
    pub fn new(config: HttpSourceConfig) -> Result<Self, BackendBuildError> {
        BackendClient::new(config).map(Self::from_client)
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn from_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    fn post<T: serde::Serialize>(&self, path: &str, payload: &T) -> Result<SubmissionReceipt, SourceError> {
        let body = serde_json::to_value(payload).map_err(|err| SourceError::Parse {
            location: self.backend.endpoint(path),
            message: err.to_string(),
        })?;
        self.backend.post_json(path, &body)
    }
}

impl FeedbackSink for HttpFeedbackSink {
    fn submit_feedback(
        &self,
        feedback: &NeighbourhoodFeedback,
    ) -> Result<SubmissionReceipt, SourceError> {
        self.post(FEEDBACK_PATH, feedback)
    }

    fn subscribe(
        &self,
        subscription: &NewsletterSubscription,
    ) -> Result<SubmissionReceipt, SourceError> {
        self.post(NEWSLETTER_PATH, subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(HttpSourceConfig::new(base))
            .unwrap_or_else(|err| panic!("client should build: {err}"))
    }

    #[rstest]
    #[case("http://localhost:3000/api/backend", "http://localhost:3000/api/backend/formularios")]
    #[case("https://barri.example/api/", "https://barri.example/api/formularios")]
    fn endpoints_join_without_double_slashes(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(client(base).endpoint(FEEDBACK_PATH), expected);
    }

    #[rstest]
    #[case("/api/backend")]
    #[case("ftp://barri.example")]
    #[case("not a url")]
    fn relative_or_non_http_bases_are_rejected(#[case] base: &str) {
        let err = BackendClient::new(HttpSourceConfig::new(base)).err();
        assert!(matches!(err, Some(BackendBuildError::InvalidBaseUrl { .. })));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpSourceConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(3))
            .with_user_agent("barri-test/1.0");
        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "barri-test/1.0");
        assert_eq!(
            HttpSourceConfig::default().timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[rstest]
    fn unreachable_backends_are_network_errors() {
        // Port 9 (discard) is closed on test machines.
        let source = HttpNeighbourhoodSource::from_client(client("http://127.0.0.1:9"));
        match source.tourism_batch() {
            Err(SourceError::Network { url, .. }) => {
                assert_eq!(url, "http://127.0.0.1:9/neighborhoods/full-data");
            }
            other => panic!("expected network error, found {other:?}"),
        }
    }
}
