//! HTTP client for the ApeWisdom `filter/all-stocks` endpoint.
//!
//! One GET per run, no retry. Every failure is surfaced as a typed
//! [`FetchError`] so the caller decides what "no data" means.

use std::time::Duration;

use reqwest::{Client, Url};
use wsbalert_core::{AppConfig, TickerMention};

use crate::error::FetchError;
use crate::types::parse_mentions;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for the ApeWisdom mention API.
///
/// Use [`ApeWisdomClient::from_config`] for production or
/// [`ApeWisdomClient::with_url`] to point at a mock server in tests.
pub struct ApeWisdomClient {
    client: Client,
    url: Url,
}

impl ApeWisdomClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`ApeWisdomClient::with_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::with_url(
            &config.mentions_url,
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client for an explicit endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the `reqwest::Client` cannot be
    /// built, or [`FetchError::InvalidUrl`] if `url` does not parse.
    pub fn with_url(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches today's mention counts in upstream order.
    ///
    /// Entries without a ticker are dropped; entries with an unreadable
    /// mention count are kept with `mentions = 0`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] on connection failure or timeout.
    /// - [`FetchError::Status`] on a non-2xx response.
    /// - [`FetchError::Parse`] if the body is not JSON.
    /// - [`FetchError::UnexpectedShape`] if the JSON has no `results` array.
    pub async fn fetch_mentions(&self) -> Result<Vec<TickerMention>, FetchError> {
        let body = self.request_json().await?;
        let mentions = parse_mentions(&body)?;
        tracing::debug!(url = %self.url, count = mentions.len(), "fetched ticker mentions");
        Ok(mentions)
    }

    /// Sends the GET, checks for a 2xx status, and parses the body as JSON.
    async fn request_json(&self) -> Result<serde_json::Value, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse {
            context: self.url.to_string(),
            source: e,
        })
    }
}
