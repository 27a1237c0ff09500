//! Oura adapter using the v2 user collection API.
//!
//! Heart-rate samples are read from `/v2/usercollection/heartrate`, which
//! returns every sample taken since `start_datetime` in time order. The
//! adapter keeps only the most recent one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pulsetray_adapters::oura::OuraClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OuraClient::builder()
//!         .endpoint("https://api.ouraring.com")
//!         .token("my-personal-token")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let since = chrono::Utc::now().fixed_offset() - chrono::Duration::minutes(30);
//!     match client.fetch_latest(since).await? {
//!         Some(m) => println!("{} bpm at {}", m.bpm, m.timestamp),
//!         None => println!("no samples yet"),
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use tracing::debug;

use pulsetray_types::{HeartRateResponse, Measurement, Timestamp};

use crate::FetchError;

/// Default base URL of the Oura cloud API.
pub const DEFAULT_ENDPOINT: &str = "https://api.ouraring.com";

/// Path of the heart-rate collection.
const HEARTRATE_PATH: &str = "/v2/usercollection/heartrate";

/// Upper bound on pages followed for a single query.
const DEFAULT_MAX_PAGES: usize = 16;

/// Client for the Oura heart-rate collection.
#[derive(Debug, Clone)]
pub struct OuraClient {
    client: Client,
    endpoint: String,
    token: String,
    max_pages: usize,
}

impl OuraClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> OuraClientBuilder {
        OuraClientBuilder::default()
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the most recent sample taken at or after `since`.
    ///
    /// Returns `Ok(None)` when the service has no samples in the range.
    /// The last sample wins even if several device sources reported in
    /// the same range.
    pub async fn fetch_latest(&self, since: Timestamp) -> Result<Option<Measurement>, FetchError> {
        let mut latest = None;
        let mut next_token: Option<String> = None;

        for _ in 0..self.max_pages {
            let page = self.fetch_page(since, next_token.as_deref()).await?;

            if let Some(measurement) = page.latest() {
                latest = Some(measurement);
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(latest)
    }

    /// Fetch one page of samples.
    pub async fn fetch_page(
        &self,
        since: Timestamp,
        next_token: Option<&str>,
    ) -> Result<HeartRateResponse, FetchError> {
        let url = format!("{}{}", self.endpoint, HEARTRATE_PATH);

        let mut query = vec![("start_datetime", format_start_datetime(since))];
        if let Some(token) = next_token {
            query.push(("next_token", token.to_string()));
        }

        debug!(url = %url, start = %query[0].1, "requesting heart rate samples");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Auth(format!(
                "API rejected the access token ({})",
                status
            )));
        }

        if !status.is_success() {
            return Err(FetchError::Http(format!("API returned status {}", status)));
        }

        let page: HeartRateResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(page)
    }
}

/// Builder for OuraClient.
#[derive(Debug, Default)]
pub struct OuraClientBuilder {
    endpoint: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
    max_pages: Option<usize>,
}

impl OuraClientBuilder {
    /// Set the API base URL (default: "https://api.ouraring.com").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the personal access token sent as a bearer credential.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Limit how many pages one query may follow (default: 16).
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages.max(1));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<OuraClient, FetchError> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| FetchError::Auth("no access token configured".to_string()))?;

        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(OuraClient {
            client,
            endpoint,
            token,
            max_pages: self.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
        })
    }
}

/// Format a query start as the service expects it: the 24-hour UTC wall
/// clock of the instant, without an offset suffix.
///
/// Timestamps carry whatever offset the sample came with, so the instant is
/// normalised first. Equal instants always produce the same string.
pub fn format_start_datetime(since: Timestamp) -> String {
    since.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%S").to_string()
}
