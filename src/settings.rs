//! Startup configuration.
//!
//! Settings are layered with the `config` crate: an optional TOML file, then
//! `PULSETRAY_*` environment variables. Command-line flags are applied on top
//! by the binary. Everything is validated once, here; a bad value is fatal.

use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use config::{Config, Environment, File};
use thiserror::Error;

use pulsetray_adapters::oura::{OuraClient, DEFAULT_ENDPOINT};

use crate::data::{ThresholdPolicy, Watermark, DEFAULT_LOOKBACK_MINUTES};
use crate::monitor::DEFAULT_REFRESH_INTERVAL;
use crate::render::{IconSize, RenderOptions};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "pulsetray.toml";

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "PULSETRAY";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const TOKEN_KEY: &str = "oura_personal_token";
const THRESHOLD_KEY: &str = "bpm_alert_threshold";

/// Invalid or missing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`oura_personal_token` is not set; add it to {origin} or set PULSETRAY_OURA_PERSONAL_TOKEN")]
    MissingToken { origin: String },

    #[error("`bpm_alert_threshold` is not set; add it to {origin} or set PULSETRAY_BPM_ALERT_THRESHOLD")]
    MissingThreshold { origin: String },

    #[error("`bpm_alert_threshold` must be a non-negative integer, got {0:?}")]
    InvalidThreshold(String),

    #[error("`icon_size` must be 16 or 32, got {0}")]
    InvalidIconSize(String),

    #[error("`{key}` has an invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Validated settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Personal access token. Only needed when polling the remote API.
    pub token: Option<String>,
    pub threshold: u32,
    pub refresh_interval: Duration,
    pub lookback: TimeDelta,
    pub render: RenderOptions,
    pub endpoint: String,
    pub request_timeout: Duration,
    /// Where the settings came from, for error messages.
    pub origin: String,
}

impl Settings {
    /// Load from `path` (may be missing) and the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_overrides(path, &[])
    }

    /// Like [`Settings::load`], with `overrides` taking precedence over both
    /// layers. Keys are the same as in the file.
    pub fn load_with_overrides(path: &Path, overrides: &[(&str, String)]) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX));
        for (key, value) in overrides {
            builder = builder.set_override(*key, value.as_str())?;
        }

        Self::from_config(&builder.build()?, &path.display().to_string())
    }

    /// Validate an already-built [`Config`].
    pub fn from_config(config: &Config, origin: &str) -> Result<Self, ConfigError> {
        let threshold = match lookup(config, THRESHOLD_KEY)? {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidThreshold(raw))?,
            None => {
                return Err(ConfigError::MissingThreshold {
                    origin: origin.to_string(),
                })
            }
        };

        let icon_size = match lookup(config, "icon_size")? {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .and_then(|px| IconSize::try_from(px).ok())
                .ok_or(ConfigError::InvalidIconSize(raw))?,
            None => IconSize::default(),
        };

        let refresh_interval = match parsed::<u64>(config, "refresh_interval_secs")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "refresh_interval_secs",
                    value: "0".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let lookback_minutes =
            parsed::<u32>(config, "lookback_minutes")?.map_or(DEFAULT_LOOKBACK_MINUTES, i64::from);

        let request_timeout = parsed::<u64>(config, "request_timeout_secs")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            token: lookup(config, TOKEN_KEY)?.filter(|token| !token.is_empty()),
            threshold,
            refresh_interval,
            lookback: TimeDelta::minutes(lookback_minutes),
            render: RenderOptions {
                icon_size,
                outline: flag(config, "outline")?,
                include_source_label: flag(config, "include_source_label")?,
            },
            endpoint: lookup(config, "endpoint")?.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout,
            origin: origin.to_string(),
        })
    }

    /// The token, or the error telling the user where to put it.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or_else(|| ConfigError::MissingToken {
            origin: self.origin.clone(),
        })
    }

    pub fn policy(&self) -> ThresholdPolicy {
        ThresholdPolicy::new(self.threshold)
    }

    /// An unset watermark with the configured lookback.
    pub fn watermark(&self) -> Watermark {
        Watermark::with_lookback(self.lookback)
    }

    /// Build the Oura API client. Requires a token.
    pub fn oura_client(&self) -> Result<OuraClient, ConfigError> {
        let token = self.require_token()?;
        OuraClient::builder()
            .endpoint(&self.endpoint)
            .token(token)
            .timeout(self.request_timeout)
            .build()
            .map_err(|_| ConfigError::InvalidValue {
                key: "endpoint",
                value: self.endpoint.clone(),
            })
    }
}

fn lookup(config: &Config, key: &str) -> Result<Option<String>, ConfigError> {
    match config.get_string(key) {
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parsed<T: std::str::FromStr>(config: &Config, key: &'static str) -> Result<Option<T>, ConfigError> {
    match lookup(config, key)? {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

fn flag(config: &Config, key: &'static str) -> Result<bool, ConfigError> {
    match lookup(config, key)? {
        None => Ok(false),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value: raw }),
        },
    }
}
