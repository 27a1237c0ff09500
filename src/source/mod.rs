//! Measurement source abstraction.
//!
//! A source answers one question: what is the most recent heart-rate sample
//! taken at or after a given instant? The monitor owns the instant (see
//! [`Watermark`](crate::data::Watermark)); sources stay stateless apart from
//! their credentials.

mod file;
mod oura;

pub use file::FileSource;
pub use oura::OuraSource;

use std::fmt::Debug;

use async_trait::async_trait;

pub use pulsetray_adapters::FetchError;
use pulsetray_types::{Measurement, Timestamp};

/// Trait for fetching the latest heart-rate reading.
///
/// # Example
///
/// ```no_run
/// use pulsetray::{FileSource, MeasurementSource};
///
/// # tokio_test::block_on(async {
/// let source = FileSource::new("samples.json");
/// let since = chrono::Utc::now().fixed_offset() - chrono::TimeDelta::minutes(120);
/// if let Ok(Some(m)) = source.fetch_latest(since).await {
///     println!("{} bpm", m.bpm);
/// }
/// # });
/// ```
#[async_trait]
pub trait MeasurementSource: Send + Sync + Debug {
    /// Fetch the most recent sample taken at or after `since`.
    ///
    /// Returns `Ok(None)` when there are no samples in range; that is a
    /// normal outcome, not an error.
    async fn fetch_latest(&self, since: Timestamp) -> Result<Option<Measurement>, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the status bar.
    fn description(&self) -> &str;
}
