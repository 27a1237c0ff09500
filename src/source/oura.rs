//! Oura cloud source.

use async_trait::async_trait;

use pulsetray_adapters::oura::OuraClient;
use pulsetray_adapters::FetchError;
use pulsetray_types::{Measurement, Timestamp};

use super::MeasurementSource;

/// Reads heart rate from the Oura v2 API.
#[derive(Debug, Clone)]
pub struct OuraSource {
    client: OuraClient,
    description: String,
}

impl OuraSource {
    pub fn new(client: OuraClient) -> Self {
        let description = format!("oura: {}", client.endpoint());
        Self {
            client,
            description,
        }
    }
}

#[async_trait]
impl MeasurementSource for OuraSource {
    async fn fetch_latest(&self, since: Timestamp) -> Result<Option<Measurement>, FetchError> {
        self.client.fetch_latest(since).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}
