//! CoinGecko public REST API (`/coins/markets`).

mod provider;

pub use provider::{CoinGeckoConfig, CoinGeckoProvider, DEFAULT_BASE_URL};
