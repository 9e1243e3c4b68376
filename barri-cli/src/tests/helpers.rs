//! Test helpers for CLI datasets and stubbed backends.

use super::*;
use barri_core::test_support::{RecordingFeedbackSink, StubNeighbourhoodSource};
use serde_json::{Value, json};
use std::cell::RefCell;
use tempfile::TempDir;

/// Temporary directory for CLI inputs and outputs.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_json(&self, name: &str, value: &Value) -> Utf8PathBuf {
        let path = self.path(name);
        let text = serde_json::to_string_pretty(value).expect("serialise fixture");
        barri_fs::write_utf8(&path, &text).expect("write fixture");
        path
    }
}

/// Tourism records shared by rank and compare tests.
pub(super) fn tourism_records() -> Value {
    json!([
        { "codi_barri": "01", "nom_barri": "el Raval", "turisme_percentatge_districte": 40 },
        { "codi_barri": "02", "nom_barri": "el Gòtic", "turisme_percentatge_districte": 90 },
        { "codi_barri": "03", "nom_barri": "la Barceloneta" },
    ])
}

/// Summary rows matching [`tourism_records`].
pub(super) fn summary_rows() -> Value {
    json!([
        { "codi_barri": "01", "nivel_ruido": 62.5, "hoteles": 12 },
        { "codi_barri": "02", "nivel_ruido": 70.0, "hoteles": 48 },
    ])
}

/// A rating form that passes validation.
pub(super) fn valid_form() -> Value {
    json!({
        "cleaning": 3,
        "noise": 2,
        "lighting": 4,
        "security": 4,
        "peopleCuantity": 5,
        "accessibility": 3,
        "comercialActivity": 4,
        "resident": true,
        "neiborhood": "el Raval",
    })
}

/// Connector serving canned datasets and recording submissions.
pub(super) struct StubConnector {
    pub(super) source: StubNeighbourhoodSource,
    pub(super) sink: Arc<RecordingFeedbackSink>,
    pub(super) locations: RefCell<Vec<DatasetLocation>>,
    pub(super) sink_urls: RefCell<Vec<String>>,
}

impl StubConnector {
    pub(super) fn serving(source: StubNeighbourhoodSource) -> Self {
        Self {
            source,
            sink: Arc::new(RecordingFeedbackSink::default()),
            locations: RefCell::new(Vec::new()),
            sink_urls: RefCell::new(Vec::new()),
        }
    }

    pub(super) fn with_sink(mut self, sink: RecordingFeedbackSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

impl Default for StubConnector {
    fn default() -> Self {
        Self::serving(StubNeighbourhoodSource::with_tourism(tourism_records()).and_summary(summary_rows()))
    }
}

impl BackendConnector for StubConnector {
    fn source(&self, location: &DatasetLocation) -> Result<Arc<dyn NeighbourhoodSource>, CliError> {
        self.locations.borrow_mut().push(location.clone());
        Ok(Arc::new(self.source.clone()))
    }

    fn sink(&self, base_url: &str) -> Result<Arc<dyn FeedbackSink>, CliError> {
        self.sink_urls.borrow_mut().push(base_url.to_owned());
        Ok(Arc::clone(&self.sink) as Arc<dyn FeedbackSink>)
    }
}
