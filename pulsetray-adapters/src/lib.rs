//! # pulsetray-adapters
//!
//! Remote sources of heart-rate samples.
//!
//! ## Supported Services
//!
//! - **Oura** (`oura` feature, on by default) - Reads the heart-rate user
//!   collection of the Oura cloud API with a personal access token
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pulsetray_adapters::oura::OuraClient;
//! use chrono::{Duration, Utc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OuraClient::builder()
//!         .token("my-personal-token")
//!         .build()?;
//!
//!     let since = (Utc::now() - Duration::minutes(120)).fixed_offset();
//!     if let Some(measurement) = client.fetch_latest(since).await? {
//!         println!("{} bpm", measurement.bpm);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "oura")]
pub mod oura;

pub use error::FetchError;

pub use pulsetray_types::{HeartRateResponse, HeartRateSample, Measurement, Timestamp};
