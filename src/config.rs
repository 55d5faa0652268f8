use crate::error::{AppError, Result};

pub const API_URL_BASE: &str = "https://api.coingecko.com/api/v3";

/// Maximum records per page accepted by the /coins/markets endpoint.
pub const MAX_PER_PAGE: u32 = 250;

/// Fixed backoff (seconds) applied when the API answers with a throttling status.
pub const RETRY_BACKOFF_SECS: u64 = 125;

/// HTTP statuses treated as transient throttling rather than hard failures.
pub const RATE_LIMIT_STATUSES: &[u16] = &[429, 502, 503, 504];

/// Rows per multi-row INSERT statement during bulk loads.
pub const DB_INSERT_BATCH: usize = 100;

/// Window over which the upstream API computes price-change percentage.
pub const PRICE_CHANGE_WINDOW: &str = "24h";

pub const DEFAULT_CURRENCY: &str = "gbp";
pub const DEFAULT_DB_PATH: &str = "crypto_market.sqlite";
pub const DEFAULT_REPORT_DIR: &str = "reports";
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// Currency prices are denominated in (VS_CURRENCY)
    pub vs_currency: String,
    pub price_change_window: String,
    pub page_size: u32,
    pub retry_backoff_secs: u64,
    pub db_path: String,
    pub db_batch_size: usize,
    /// Root directory for per-run report subdirectories (REPORT_DIR)
    pub report_dir: String,
    /// Absolute 24h percent-change cutoff for the large-change report (CHANGE_THRESHOLD_PCT)
    pub change_threshold: f64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("API_URL_BASE").unwrap_or_else(|_| API_URL_BASE.to_string()),
            vs_currency: std::env::var("VS_CURRENCY")
                .unwrap_or_else(|_| DEFAULT_CURRENCY.to_string())
                .to_lowercase(),
            price_change_window: PRICE_CHANGE_WINDOW.to_string(),
            page_size: MAX_PER_PAGE,
            retry_backoff_secs: std::env::var("RETRY_BACKOFF_SECS")
                .unwrap_or_else(|_| RETRY_BACKOFF_SECS.to_string())
                .parse::<u64>()
                .map_err(|_| {
                    AppError::Config(
                        "RETRY_BACKOFF_SECS must be a whole number of seconds".to_string(),
                    )
                })?,
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            db_batch_size: DB_INSERT_BATCH,
            report_dir: std::env::var("REPORT_DIR")
                .unwrap_or_else(|_| DEFAULT_REPORT_DIR.to_string()),
            change_threshold: std::env::var("CHANGE_THRESHOLD_PCT")
                .unwrap_or_else(|_| DEFAULT_CHANGE_THRESHOLD.to_string())
                .parse::<f64>()
                .map_err(|_| AppError::Config("CHANGE_THRESHOLD_PCT must be a number".to_string()))?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
