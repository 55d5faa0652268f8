use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Upstream answered with a throttling status (429/502/503/504).
    /// Recoverable; handled by the retry coordinator, never surfaced.
    #[error("rate limited by upstream API")]
    RateLimited,

    /// Non-2xx, non-throttling status. Fatal for the current run.
    #[error("remote API returned {status} ({reason}) for {url}")]
    Remote {
        status: u16,
        reason: String,
        url: String,
    },

    /// No ingestion has been recorded yet for the requested currency.
    #[error("no ingestion timestamp recorded for currency '{currency}'")]
    NotFound { currency: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
