//! # pulsetray-types
//!
//! Core types for heart-rate monitoring. This crate defines the measurement
//! model produced by remote sources and consumed by the pulsetray refresh loop,
//! along with the wire shape of the heart-rate collection API.
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde (required to decode API responses)
//!
//! ## Example
//!
//! ```rust
//! use chrono::DateTime;
//! use pulsetray_types::Measurement;
//!
//! let at = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap();
//! let measurement = Measurement::new(at, 72).with_source("awake");
//!
//! assert_eq!(measurement.bpm, 72);
//! assert_eq!(measurement.digit_count(), 2);
//! ```

mod measurement;
mod sample;

pub use measurement::*;
pub use sample::*;

/// Timestamp type used for every point in time the monitor deals with.
///
/// Samples carry their own UTC offset, so the offset is kept rather than
/// normalising everything to UTC.
pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;
