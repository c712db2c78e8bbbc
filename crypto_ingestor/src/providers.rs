//! Provider abstraction for market data sources.
//!
//! This module defines the [`MarketDataProvider`] trait, the single seam between the
//! pipeline and any remote market listing API (e.g. CoinGecko).
//!
//! A provider performs exactly one request per call and hands back the parsed JSON
//! body untouched. Shaping the payload is the transform stage's job, persisting it is
//! the extractor's.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use crypto_ingestor::models::MarketsRequestParams;
//! use crypto_ingestor::providers::{MarketDataProvider, ProviderError};
//! use serde_json::{Value, json};
//!
//! struct FixedProvider;
//!
//! #[async_trait]
//! impl MarketDataProvider for FixedProvider {
//!     async fn fetch_markets(
//!         &self,
//!         _params: &MarketsRequestParams,
//!     ) -> Result<Value, ProviderError> {
//!         Ok(json!([]))
//!     }
//! }
//! ```

pub mod coingecko;

use async_trait::async_trait;
use serde_json::Value;
use snafu::{Backtrace, Snafu};

use crate::models::MarketsRequestParams;

/// Trait for fetching a market listing from a remote provider.
///
/// Implementations must not retry: a failed call is reported and the caller
/// decides what to do with the cycle.
#[async_trait]
pub trait MarketDataProvider {
    /// Fetches one page of the market listing described by `params`.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The parsed JSON response body, unmodified.
    /// * `Err(ProviderError)` - Network failure, non-2xx status, or an unparseable body.
    async fn fetch_markets(&self, params: &MarketsRequestParams) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<P> MarketDataProvider for Box<P>
where
    P: MarketDataProvider + Send + Sync + ?Sized,
{
    async fn fetch_markets(&self, params: &MarketsRequestParams) -> Result<Value, ProviderError> {
        (**self).fetch_markets(params).await
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `MarketDataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[snafu(display("API request failed: {source}"))]
    Request {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The API answered with a non-2xx status.
    #[snafu(display("API returned HTTP {status}: {body}"))]
    Status {
        status: u16,
        body: String,
        backtrace: Backtrace,
    },

    /// The response body is not valid JSON.
    #[snafu(display("Failed to decode API response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },
}

impl ProviderError {
    /// HTTP status of a [`ProviderError::Status`] failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct CoinGeckoStub;
    struct DownProvider;

    #[async_trait]
    impl MarketDataProvider for CoinGeckoStub {
        async fn fetch_markets(&self, params: &MarketsRequestParams) -> Result<Value, ProviderError> {
            let items: Vec<Value> = (0..params.per_page)
                .map(|i| json!({ "id": format!("coin-{i}") }))
                .collect();
            Ok(Value::Array(items))
        }
    }

    #[async_trait]
    impl MarketDataProvider for DownProvider {
        async fn fetch_markets(&self, _params: &MarketsRequestParams) -> Result<Value, ProviderError> {
            StatusSnafu {
                status: 503u16,
                body: "maintenance",
            }
            .fail()
        }
    }

    // Decided at runtime, which is why the trait must stay object safe.
    fn get_provider(name: &str) -> Box<dyn MarketDataProvider + Send + Sync> {
        if name == "coingecko" {
            Box::new(CoinGeckoStub)
        } else {
            Box::new(DownProvider)
        }
    }

    #[tokio::test]
    async fn dynamic_provider_dispatch() {
        let params = MarketsRequestParams {
            per_page: 3,
            ..Default::default()
        };

        let ok = get_provider("coingecko").fetch_markets(&params).await.unwrap();
        assert_eq!(ok.as_array().map(Vec::len), Some(3));

        let err = get_provider("other").fetch_markets(&params).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "API returned HTTP 503: maintenance");
    }
}
