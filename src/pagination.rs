use std::future::Future;
use std::time::Duration;

use tracing::info;

use crate::client::RemoteClient;
use crate::config::Config;
use crate::error::Result;
use crate::retry::with_rate_limit_retry;
use crate::types::MarketRecord;

/// Fetch every page of market data for `currency`, rate-limit retries included.
/// Page size is pinned to the API maximum so the request count stays minimal.
pub async fn fetch_all_market_data(
    client: &RemoteClient,
    cfg: &Config,
    currency: &str,
) -> Result<Vec<MarketRecord>> {
    let backoff = Duration::from_secs(cfg.retry_backoff_secs);
    let window = cfg.price_change_window.as_str();
    let per_page = cfg.page_size;

    collect_pages(|page| async move {
        with_rate_limit_retry(backoff, || {
            client.fetch_market_page(currency, window, page, per_page)
        })
        .await
    })
    .await
}

/// Drive `fetch_page` from page 1 upward, accumulating records until the
/// first empty page. The empty page is the only termination signal the
/// upstream API provides.
pub async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<MarketRecord>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<MarketRecord>>>,
{
    let mut page = 1u32;
    let mut records = Vec::new();

    loop {
        let batch = fetch_page(page).await?;
        if batch.is_empty() {
            break;
        }
        info!(page, batch = batch.len(), "market data page fetched");
        records.extend(batch);
        page += 1;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::cell::Cell;

    fn record(id: &str) -> MarketRecord {
        MarketRecord {
            id: id.to_string(),
            current_price: Some(1.0),
            price_change_24h: Some(0.5),
        }
    }

    #[tokio::test]
    async fn drains_full_pages_until_empty_page() {
        let calls = Cell::new(0u32);
        let records = collect_pages(|page| {
            calls.set(calls.get() + 1);
            async move {
                if page <= 3 {
                    Ok((0..250).map(|i| record(&format!("coin-{page}-{i}"))).collect())
                } else {
                    Ok(Vec::new())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(records.len(), 3 * 250);
        // three full pages plus the terminating empty page
        assert_eq!(calls.get(), 4);
        assert_eq!(records[0].id, "coin-1-0");
        assert_eq!(records[749].id, "coin-3-249");
    }

    #[tokio::test]
    async fn empty_first_page_yields_no_records() {
        let calls = Cell::new(0u32);
        let records = collect_pages(|_page| {
            calls.set(calls.get() + 1);
            async { Ok(Vec::new()) }
        })
        .await
        .unwrap();
        assert!(records.is_empty());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn page_error_aborts_the_drain() {
        let calls = Cell::new(0u32);
        let err = collect_pages(|page| {
            calls.set(calls.get() + 1);
            async move {
                if page == 1 {
                    Ok(vec![record("bitcoin")])
                } else {
                    Err(AppError::Remote {
                        status: 404,
                        reason: "Not Found".to_string(),
                        url: "https://example.com/coins/markets".to_string(),
                    })
                }
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.get(), 2);
        assert!(matches!(err, AppError::Remote { status: 404, .. }));
    }
}
