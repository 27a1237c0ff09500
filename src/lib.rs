//! # pulsetray
//!
//! A heart-rate indicator for the system tray (or the terminal).
//!
//! pulsetray polls a wearable's cloud API for the most recent heart-rate
//! sample, draws the reading as a small square glyph, and raises an alert
//! when it goes above a configured threshold.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Monitor                             │
//! │  ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────┐  │
//! │  │  source  │──▶│   data    │──▶│  render  │──▶│   host   │  │
//! │  │ (fetch)  │   │(watermark,│   │ (glyph,  │   │ (icon,   │  │
//! │  └──────────┘   │ threshold)│   │  text)   │   │  alerts) │  │
//! │       ▲         └───────────┘   └──────────┘   └──────────┘  │
//! │       └── OuraSource | FileSource                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: [`MeasurementSource`] trait with the Oura API and a replay file
//! - **[`data`]**: the forward-only [`Watermark`] and the strict [`ThresholdPolicy`]
//! - **[`render`]**: [`IndicatorRenderer`] turning a reading into a [`RenderedIndicator`]
//! - **[`host`]**: [`StatusIconHost`] and [`NotificationSink`] seams, with terminal
//!   and log implementations
//! - **[`monitor`]**: the refresh loop tying them together
//! - **[`settings`]**: layered startup configuration
//!
//! ## Usage
//!
//! ```bash
//! # Poll the Oura API, threshold and token from pulsetray.toml or the environment
//! PULSETRAY_OURA_PERSONAL_TOKEN=... PULSETRAY_BPM_ALERT_THRESHOLD=100 pulsetray
//!
//! # Replay a saved API response without a terminal UI
//! pulsetray --file heartrate.json --headless
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::time::Duration;
//! use pulsetray::{
//!     FileSource, IndicatorRenderer, LogHost, LogNotifier, Monitor, Palette, RenderOptions,
//!     ThresholdPolicy,
//! };
//!
//! # tokio_test::block_on(async {
//! let monitor = Monitor::new(
//!     Box::new(FileSource::new("heartrate.json")),
//!     ThresholdPolicy::new(100),
//!     IndicatorRenderer::new(RenderOptions::default(), Palette::auto_detect()),
//!     Box::new(LogHost::new()),
//!     Box::new(LogNotifier),
//! );
//! let handle = monitor.spawn(Duration::from_secs(60));
//! handle.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod export;
pub mod host;
pub mod monitor;
pub mod render;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{ThresholdPolicy, Watermark};
pub use host::{
    Alert, IconId, IconSlot, LogHost, LogNotifier, NotificationSink, Severity, StatusIconHost,
    TerminalTray, TrayState,
};
pub use monitor::{Monitor, MonitorHandle, MonitorStatus, Phase, TickOutcome};
pub use render::{GlyphBitmap, IconSize, IndicatorRenderer, Palette, RenderOptions, RenderedIndicator};
pub use settings::{ConfigError, Settings};
pub use source::{FetchError, FileSource, MeasurementSource, OuraSource};

pub use pulsetray_types::{HeartRateResponse, HeartRateSample, Measurement, Timestamp};
