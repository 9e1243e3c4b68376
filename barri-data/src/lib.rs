//! Dataset sources and submission sinks for the neighbourhood engine.
//!
//! Two [`NeighbourhoodSource`](barri_core::NeighbourhoodSource)
//! implementations are provided: [`FileNeighbourhoodSource`] reads JSON files
//! and [`HttpNeighbourhoodSource`] downloads them from the backend.
//! [`HttpFeedbackSink`] posts rating forms and newsletter sign-ups.

mod file;
mod http;

#[doc(hidden)]
pub mod test_support;

pub use file::{FileNeighbourhoodSource, read_json};
pub use http::{
    BackendBuildError, BackendClient, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, FEEDBACK_PATH, HttpFeedbackSink, HttpNeighbourhoodSource,
    HttpSourceConfig, NEWSLETTER_PATH, SUMMARY_PATH, TOURISM_PATH,
};
