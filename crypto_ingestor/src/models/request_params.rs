use serde::{Deserialize, Serialize};

/// Sort order understood by the `/coins/markets` listing endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarketOrder {
    #[default]
    MarketCapDesc,
    MarketCapAsc,
    VolumeDesc,
    VolumeAsc,
    IdAsc,
    IdDesc,
}

/// Query parameters for one market listing request.
///
/// Serializes straight into the query string, so field names follow the
/// remote API rather than Rust conventions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketsRequestParams {
    /// Quote currency for prices and volumes (e.g. "usd").
    pub vs_currency: String,

    /// Ordering of the returned assets.
    pub order: MarketOrder,

    /// Page size: how many assets to request. The endpoint accepts 1..=250.
    pub per_page: u32,

    /// 1-based page number.
    pub page: u32,

    /// Whether the endpoint should include 7-day sparkline series.
    pub sparkline: bool,
}

impl Default for MarketsRequestParams {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            order: MarketOrder::MarketCapDesc,
            per_page: 10,
            page: 1,
            sparkline: false,
        }
    }
}

impl MarketsRequestParams {
    /// Largest page size the listing endpoint serves.
    pub const MAX_PER_PAGE: u32 = 250;

    /// Check the parameters against the endpoint's documented limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.vs_currency.trim().is_empty() {
            return Err("vs_currency must not be empty".to_string());
        }
        if !(1..=Self::MAX_PER_PAGE).contains(&self.per_page) {
            return Err(format!(
                "per_page must be between 1 and {}, got {}",
                Self::MAX_PER_PAGE,
                self.per_page
            ));
        }
        if self.page == 0 {
            return Err("page is 1-based, got 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_request_top_ten_by_market_cap_in_usd() {
        let p = MarketsRequestParams::default();
        assert_eq!(p.vs_currency, "usd");
        assert_eq!(p.order, MarketOrder::MarketCapDesc);
        assert_eq!(p.per_page, 10);
        assert_eq!(p.page, 1);
        assert!(!p.sparkline);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn order_uses_remote_spelling() {
        let v = serde_json::to_value(MarketOrder::MarketCapDesc).unwrap();
        assert_eq!(v, serde_json::json!("market_cap_desc"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut p = MarketsRequestParams { per_page: 0, ..Default::default() };
        assert!(p.validate().unwrap_err().contains("per_page"));
        p.per_page = 251;
        assert!(p.validate().is_err());
        p.per_page = 250;
        p.page = 0;
        assert!(p.validate().unwrap_err().contains("page"));
    }
}
