use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::{Config, RATE_LIMIT_STATUSES};
use crate::error::{AppError, Result};
use crate::types::{CoinListing, MarketRecord};

/// Client for the CoinGecko REST API. Classifies every response into
/// success, `RateLimited` (throttling statuses) or `Remote` (hard failure).
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET /coins/list — the full universe of known coins.
    pub async fn fetch_coin_list(&self) -> Result<Vec<CoinListing>> {
        let url = format!("{}/coins/list", self.base_url);
        self.get_json(&url, &[]).await
    }

    /// GET /coins/markets — one page of market metrics for `currency`.
    pub async fn fetch_market_page(
        &self,
        currency: &str,
        price_change_window: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MarketRecord>> {
        let url = format!("{}/coins/markets", self.base_url);
        let query = [
            ("vs_currency", currency.to_lowercase()),
            ("price_change_percentage", price_change_window.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("order", "id_asc".to_string()),
        ];
        self.get_json(&url, &query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status();

        if RATE_LIMIT_STATUSES.contains(&status.as_u16()) {
            return Err(AppError::RateLimited);
        }
        if status.as_u16() != 200 {
            return Err(AppError::Remote {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown reason")
                    .to_string(),
                url: resp.url().to_string(),
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
