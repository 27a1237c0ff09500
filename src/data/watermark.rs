//! Forward-only watermark over observed samples.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::warn;

use pulsetray_types::Timestamp;

/// Lookback used for the first query of a process.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 120;

/// Tracks the timestamp of the last observed sample.
///
/// The watermark starts unset on every process start. Once set it only moves
/// forward, and each query starts one second past it so the same sample is
/// not observed twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    last: Option<Timestamp>,
    lookback: TimeDelta,
}

impl Default for Watermark {
    fn default() -> Self {
        Self::new()
    }
}

impl Watermark {
    /// Create an unset watermark with the default 120 minute lookback.
    pub fn new() -> Self {
        Self::with_lookback(TimeDelta::minutes(DEFAULT_LOOKBACK_MINUTES))
    }

    /// Create an unset watermark with a custom lookback.
    pub fn with_lookback(lookback: TimeDelta) -> Self {
        Self {
            last: None,
            lookback,
        }
    }

    /// Timestamp of the last observed sample, if any.
    pub fn last(&self) -> Option<Timestamp> {
        self.last
    }

    pub fn is_set(&self) -> bool {
        self.last.is_some()
    }

    pub fn lookback(&self) -> TimeDelta {
        self.lookback
    }

    /// Start of the next query, relative to the current time.
    pub fn query_start(&self) -> Timestamp {
        self.query_start_at(Utc::now())
    }

    /// Start of the next query, relative to `now`.
    ///
    /// `now - lookback` while unset, otherwise one second past the last sample.
    pub fn query_start_at(&self, now: DateTime<Utc>) -> Timestamp {
        match self.last {
            Some(last) => last + TimeDelta::seconds(1),
            None => (now - self.lookback).fixed_offset(),
        }
    }

    /// Record a newly observed sample timestamp.
    ///
    /// Returns `false` and leaves the watermark untouched when `timestamp`
    /// is older than the current value.
    pub fn advance(&mut self, timestamp: Timestamp) -> bool {
        match self.last {
            Some(last) if timestamp < last => {
                warn!(
                    current = %last,
                    rejected = %timestamp,
                    "ignoring sample older than the watermark"
                );
                false
            }
            _ => {
                self.last = Some(timestamp);
                true
            }
        }
    }
}
