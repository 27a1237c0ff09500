//! A single heart-rate reading.

use chrono::{Local, TimeZone};

use crate::Timestamp;

/// One heart-rate reading taken at a point in time.
///
/// Measurements are immutable once produced; they are passed by value from
/// the source through threshold evaluation and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// When the sample was taken, with the offset reported by the service.
    pub timestamp: Timestamp,

    /// Beats per minute.
    pub bpm: u32,

    /// Label of the device mode that produced the sample (e.g. "awake", "rest").
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub source: Option<String>,
}

impl Measurement {
    /// Create a measurement without a source label.
    pub fn new(timestamp: Timestamp, bpm: u32) -> Self {
        Self {
            timestamp,
            bpm,
            source: None,
        }
    }

    /// Attach a source label.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Number of decimal digits needed to print the BPM value.
    pub fn digit_count(&self) -> usize {
        self.bpm.to_string().len()
    }

    /// Wall-clock time of the sample in the given zone, as `HH:MM:SS`.
    pub fn time_label_in<Tz>(&self, zone: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.timestamp
            .with_timezone(zone)
            .format("%H:%M:%S")
            .to_string()
    }

    /// Wall-clock time of the sample in the local zone, as `HH:MM:SS`.
    pub fn local_time_label(&self) -> String {
        self.time_label_in(&Local)
    }
}
