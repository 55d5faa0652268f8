use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::client::RemoteClient;
use crate::config::Config;
use crate::db::Store;
use crate::error::Result;
use crate::pagination::fetch_all_market_data;
use crate::report::{generate_report, ReportKind};
use crate::retry::with_rate_limit_retry;

/// One ingestion + report run: coin list → snapshot → pointer → reports,
/// strictly in sequence. Any error aborts the remainder of the run.
pub struct Pipeline {
    cfg: Config,
    client: RemoteClient,
    store: Store,
}

impl Pipeline {
    pub fn new(cfg: Config, client: RemoteClient, store: Store) -> Self {
        Self { cfg, client, store }
    }

    pub async fn run(&self) -> Result<()> {
        let currency = self.cfg.vs_currency.as_str();
        let backoff = Duration::from_secs(self.cfg.retry_backoff_secs);

        info!(currency, "ingestion run starting");

        let coins = with_rate_limit_retry(backoff, || self.client.fetch_coin_list()).await?;
        info!(coins = coins.len(), "coin list fetched");
        self.store
            .replace_coin_reference(&coins, self.cfg.db_batch_size)
            .await?;

        let records = fetch_all_market_data(&self.client, &self.cfg, currency).await?;
        info!(records = records.len(), "market data fetched");

        let run_timestamp = chrono::Utc::now().timestamp();
        self.store
            .replace_market_snapshot(&records, currency, run_timestamp, self.cfg.db_batch_size)
            .await?;

        let out_dir = Path::new(&self.cfg.report_dir);
        generate_report(
            &self.store,
            ReportKind::NoTradeInCurrency,
            currency,
            Some(run_timestamp),
            out_dir,
        )
        .await?;
        generate_report(
            &self.store,
            ReportKind::LargeChange24h {
                threshold: self.cfg.change_threshold,
            },
            currency,
            Some(run_timestamp),
            out_dir,
        )
        .await?;

        info!(run_timestamp, "ingestion run complete");
        Ok(())
    }
}
