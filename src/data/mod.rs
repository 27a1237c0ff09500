//! Monitoring state: where the next query starts and when a reading alerts.
//!
//! ## Submodules
//!
//! - [`watermark`]: Forward-only timestamp of the last observed sample ([`Watermark`])
//! - [`threshold`]: Strict BPM alert threshold ([`ThresholdPolicy`])
//!
//! ## Data Flow
//!
//! ```text
//! Watermark::query_start()
//!        │
//!        ▼
//! MeasurementSource::fetch_latest(start)
//!        │
//!        ├──▶ Watermark::advance(sample.timestamp)
//!        │
//!        └──▶ ThresholdPolicy::is_over_threshold(sample.bpm)
//! ```

pub mod threshold;
pub mod watermark;

pub use threshold::ThresholdPolicy;
pub use watermark::{Watermark, DEFAULT_LOOKBACK_MINUTES};
