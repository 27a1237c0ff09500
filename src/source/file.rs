//! File-based measurement source.
//!
//! Reads a JSON file in the same shape the heart-rate API returns. Useful for
//! running without network access or replaying a captured response.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use pulsetray_adapters::FetchError;
use pulsetray_types::{HeartRateResponse, Measurement, Timestamp};

use super::MeasurementSource;

/// A source that reads samples from a JSON file.
///
/// The file is re-read on every fetch, so edits show up on the next tick.
/// Samples older than the query start are filtered out locally.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MeasurementSource for FileSource {
    async fn fetch_latest(&self, since: Timestamp) -> Result<Option<Measurement>, FetchError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let response: HeartRateResponse = serde_json::from_str(&content)?;
        Ok(response.latest_since(since))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
