//! Wire shape of the heart-rate collection API.

use crate::{Measurement, Timestamp};

/// One entry of the `data` array returned by the heart-rate endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartRateSample {
    pub bpm: u32,
    pub source: String,
    pub timestamp: Timestamp,
}

impl From<&HeartRateSample> for Measurement {
    fn from(sample: &HeartRateSample) -> Self {
        Measurement::new(sample.timestamp, sample.bpm).with_source(sample.source.clone())
    }
}

impl From<HeartRateSample> for Measurement {
    fn from(sample: HeartRateSample) -> Self {
        Measurement::new(sample.timestamp, sample.bpm).with_source(sample.source)
    }
}

/// Response body of the heart-rate endpoint.
///
/// The service returns samples in time order. `next_token` is present when
/// the range spans more than one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartRateResponse {
    pub data: Vec<HeartRateSample>,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub next_token: Option<String>,
}

impl HeartRateResponse {
    /// The last sample of the page, whatever source produced it.
    pub fn latest(&self) -> Option<Measurement> {
        self.data.last().map(Measurement::from)
    }

    /// The last sample taken at or after `since`.
    ///
    /// Used when the samples were not already filtered by the service.
    pub fn latest_since(&self, since: Timestamp) -> Option<Measurement> {
        self.data
            .iter()
            .filter(|s| s.timestamp >= since)
            .last()
            .map(Measurement::from)
    }
}
