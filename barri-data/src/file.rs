//! Neighbourhood datasets stored as JSON fixture files.

use barri_core::{NeighbourhoodSource, SourceError};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

/// Reads the tourism batch, and optionally the summary batch, from disk.
///
/// Files are re-read on every call. Without a summary path the summary
/// batch is empty.
///
/// # Examples
///
/// ```no_run
/// use barri_core::NeighbourhoodSource;
/// use barri_data::FileNeighbourhoodSource;
///
/// let source = FileNeighbourhoodSource::new("data/datosturismo.json")
///     .with_summary("data/resumen.json");
/// let batch = source.tourism_batch()?;
/// # Ok::<(), barri_core::SourceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNeighbourhoodSource {
    tourism: Utf8PathBuf,
    summary: Option<Utf8PathBuf>,
}

impl FileNeighbourhoodSource {
    /// Serve the tourism batch from `tourism`.
    #[must_use]
    pub fn new(tourism: impl Into<Utf8PathBuf>) -> Self {
        Self {
            tourism: tourism.into(),
            summary: None,
        }
    }

    /// Serve the summary batch from `summary`.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<Utf8PathBuf>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Path of the tourism dataset.
    #[must_use]
    pub fn tourism_path(&self) -> &Utf8Path {
        &self.tourism
    }

    /// Path of the summary dataset, if configured.
    #[must_use]
    pub fn summary_path(&self) -> Option<&Utf8Path> {
        self.summary.as_deref()
    }
}

impl NeighbourhoodSource for FileNeighbourhoodSource {
    fn tourism_batch(&self) -> Result<Value, SourceError> {
        read_json(&self.tourism)
    }

    fn summary_batch(&self) -> Result<Value, SourceError> {
        match &self.summary {
            Some(path) => read_json(path),
            None => Ok(Value::Array(Vec::new())),
        }
    }
}

/// Read and parse a JSON file.
///
/// # Errors
/// Returns [`SourceError::Read`] when the file cannot be read and
/// [`SourceError::Parse`] when it is not valid JSON.
pub fn read_json(path: &Utf8Path) -> Result<Value, SourceError> {
    let text = barri_fs::read_utf8(path).map_err(|err| SourceError::Read {
        location: path.to_string(),
        message: err.to_string(),
    })?;
    log::debug!("Read {} bytes from {path}", text.len());
    serde_json::from_str(&text).map_err(|err| SourceError::Parse {
        location: path.to_string(),
        message: err.to_string(),
    })
}
