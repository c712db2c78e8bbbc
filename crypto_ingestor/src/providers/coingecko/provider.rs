use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::MarketsRequestParams,
    providers::{
        ClientBuildSnafu, DecodeSnafu, InvalidApiKeySnafu, MarketDataProvider, ProviderError,
        ProviderInitError, RequestSnafu, StatusSnafu, ValidationSnafu,
    },
};

/// Public API root. Demo and keyless plans share it.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const USER_AGENT: &str = concat!("crypto-pipeline/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`CoinGeckoProvider`].
#[derive(Debug)]
pub struct CoinGeckoConfig {
    /// API root without the endpoint path, e.g. `https://api.coingecko.com/api/v3`.
    pub base_url: String,
    /// Whole-request timeout. A hung remote call would otherwise block the scheduler.
    pub timeout: Duration,
    /// Optional demo-plan key sent as `x-cg-demo-api-key`.
    pub api_key: Option<SecretString>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider.
    ///
    /// The API key, when present, is attached to every request as a sensitive header.
    pub fn new(config: CoinGeckoConfig) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value =
                header::HeaderValue::from_str(key.expose_secret()).context(InvalidApiKeySnafu)?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of the market listing endpoint.
    pub fn markets_url(&self) -> String {
        format!("{}/coins/markets", self.base_url)
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_markets(&self, params: &MarketsRequestParams) -> Result<Value, ProviderError> {
        params
            .validate()
            .map_err(|message| ValidationSnafu { message }.build())?;

        let url = self.markets_url();
        debug!(%url, per_page = params.per_page, page = params.page, "requesting market listing");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return StatusSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let bytes = response.bytes().await.context(RequestSnafu)?;
        serde_json::from_slice(&bytes).context(DecodeSnafu)
    }
}
