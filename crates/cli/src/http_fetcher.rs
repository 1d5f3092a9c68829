use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::config::ProviderConfig;
use super::error::Error;
use super::types::RateFetcher;
use common::{FetchError, RateTable};

/// Body of `GET {endpoint}/{api_key}/latest/{base}`.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    conversion_rates: Option<RateTable>,
}

/// Fetches rate tables from an exchangerate-api v6 compatible endpoint.
#[derive(Clone)]
pub struct HttpRateFetcher {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout_ms: u64,
}

impl fmt::Debug for HttpRateFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRateFetcher")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpRateFetcher {
    /// Builds a client with the configured per-request timeout.
    ///
    /// # Errors
    /// `Error::ConfigLoadError` if no API key is configured, `Error::HttpError`
    /// if the HTTP client cannot be created.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, Error> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::ConfigLoadError(
                "provider.api_key is required for the http source (FXARB_PROVIDER__API_KEY)"
                    .to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            timeout_ms: config.request_timeout_ms,
        })
    }

    fn url_for(&self, base: &str) -> String {
        format!("{}/{}/latest/{}", self.endpoint, self.api_key, base)
    }
}

/// Extracts the rate table, treating an error result or a missing table as `NoData`.
fn rates_from_response(base: &str, body: LatestRatesResponse) -> Result<RateTable, FetchError> {
    if body.result.as_deref() == Some("error") {
        debug!(base, error_type = ?body.error_type, "Provider returned an error result");
        return Err(FetchError::NoData(base.to_string()));
    }
    body.conversion_rates
        .ok_or_else(|| FetchError::NoData(base.to_string()))
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        let transport = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    base: base.to_string(),
                    millis: self.timeout_ms,
                }
            } else {
                FetchError::Transport {
                    base: base.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(self.url_for(base))
            .send()
            .await
            .map_err(transport)?;

        let body: LatestRatesResponse = response.json().await.map_err(transport)?;
        rates_from_response(base, body)
    }
}
