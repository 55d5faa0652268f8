use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::db::models::{PriceChangeRow, UntradedCoinRow};
use crate::error::{AppError, Result};
use crate::types::{CoinListing, MarketRecord};

/// SQLite-backed store for the coin universe, the current market snapshot and
/// the per-currency latest-ingestion pointer. A single connection serves the
/// whole run; concurrent runs against the same file are unsupported.
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating the file if needed) and ensure the schema exists.
    pub async fn open(db_path: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Idempotent schema creation; safe to call on every startup.
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coins (
                id     TEXT NOT NULL PRIMARY KEY,
                symbol TEXT NOT NULL,
                name   TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS market_snapshot (
                coin_id                     TEXT NOT NULL,
                vs_currency                 TEXT NOT NULL,
                added_at                    INTEGER NOT NULL,
                current_price               REAL,
                price_change_percentage_24h REAL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_snapshot_coin ON market_snapshot(coin_id);")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS latest_ingestion (
                vs_currency      TEXT NOT NULL PRIMARY KEY,
                last_ingested_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Drop and rewrite the coin universe in one transaction, so readers see
    /// either the old or the new full table, never a partial mix.
    pub async fn replace_coin_reference(
        &self,
        coins: &[CoinListing],
        batch_size: usize,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM coins").execute(&mut *tx).await?;

        for chunk in coins.chunks(batch_size.max(1)) {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO coins (id, symbol, name) ");
            qb.push_values(chunk, |mut b, coin| {
                b.push_bind(&coin.id)
                    .push_bind(&coin.symbol)
                    .push_bind(&coin.name);
            });
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!(coins = coins.len(), "coin reference replaced");
        Ok(())
    }

    /// Drop and rewrite the snapshot table and advance the pointer for
    /// `currency`, all in one transaction. A crash leaves either the previous
    /// snapshot with the previous pointer, or the new pair, never a split.
    pub async fn replace_market_snapshot(
        &self,
        records: &[MarketRecord],
        currency: &str,
        run_timestamp: i64,
        batch_size: usize,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM market_snapshot")
            .execute(&mut *tx)
            .await?;

        for chunk in records.chunks(batch_size.max(1)) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO market_snapshot \
                 (coin_id, vs_currency, added_at, current_price, price_change_percentage_24h) ",
            );
            qb.push_values(chunk, |mut b, rec| {
                b.push_bind(&rec.id)
                    .push_bind(currency)
                    .push_bind(run_timestamp)
                    .push_bind(rec.current_price)
                    .push_bind(rec.price_change_24h);
            });
            qb.build().execute(&mut *tx).await?;
        }

        sqlx::query(
            "INSERT OR REPLACE INTO latest_ingestion (vs_currency, last_ingested_at) VALUES (?, ?)",
        )
        .bind(currency)
        .bind(run_timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            rows = records.len(),
            currency, run_timestamp, "market snapshot replaced"
        );
        Ok(())
    }

    /// Standalone pointer upsert; one row per currency.
    pub async fn update_latest_timestamp(&self, currency: &str, timestamp: i64) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO latest_ingestion (vs_currency, last_ingested_at) VALUES (?, ?)",
        )
        .bind(currency)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Timestamp of the most recent completed ingestion for `currency`.
    pub async fn latest_timestamp(&self, currency: &str) -> Result<i64> {
        let ts: Option<i64> =
            sqlx::query_scalar("SELECT last_ingested_at FROM latest_ingestion WHERE vs_currency = ?")
                .bind(currency)
                .fetch_optional(&self.pool)
                .await?;
        ts.ok_or_else(|| AppError::NotFound {
            currency: currency.to_string(),
        })
    }

    /// Coins with no priced snapshot row for the given run: either absent
    /// from the snapshot entirely, or present with a NULL price. The snapshot
    /// filters live in the ON clause so unmatched coins survive the left join.
    pub async fn untraded_coins(
        &self,
        currency: &str,
        timestamp: i64,
    ) -> Result<Vec<UntradedCoinRow>> {
        let rows = sqlx::query_as::<_, UntradedCoinRow>(
            r#"
            SELECT c.id, c.symbol, c.name
            FROM coins c
            LEFT JOIN market_snapshot m
                ON c.id = m.coin_id AND m.added_at = ? AND m.vs_currency = ?
            WHERE m.current_price IS NULL
            ORDER BY c.id
            "#,
        )
        .bind(timestamp)
        .bind(currency)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Coins whose absolute 24h change exceeds `threshold` in the given run.
    /// Coins without a snapshot row (or with a NULL change) never match.
    pub async fn large_changes(
        &self,
        currency: &str,
        timestamp: i64,
        threshold: f64,
    ) -> Result<Vec<PriceChangeRow>> {
        let rows = sqlx::query_as::<_, PriceChangeRow>(
            r#"
            SELECT c.id, c.symbol, c.name, m.price_change_percentage_24h
            FROM coins c
            JOIN market_snapshot m ON c.id = m.coin_id
            WHERE m.added_at = ? AND m.vs_currency = ?
                AND ABS(m.price_change_percentage_24h) > ?
            ORDER BY c.id
            "#,
        )
        .bind(timestamp)
        .bind(currency)
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
