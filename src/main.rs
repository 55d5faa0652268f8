mod client;
mod config;
mod db;
mod error;
mod pagination;
mod pipeline;
mod report;
mod retry;
mod types;

use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::client::RemoteClient;
use crate::config::Config;
use crate::db::Store;
use crate::error::Result;
use crate::pipeline::Pipeline;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let store = Store::open(&cfg.db_path).await?;
    let client = RemoteClient::new(&cfg)?;
    Pipeline::new(cfg, client, store).run().await
}
