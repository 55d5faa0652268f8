use serde::Serialize;

/// Row types produced by the report queries. Serialize drives the CSV
/// column order, FromRow the mapping from the SELECT list.

/// A coin with no priced snapshot row for the requested run and currency.
#[derive(Debug, PartialEq, sqlx::FromRow, Serialize)]
pub struct UntradedCoinRow {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// A coin whose absolute 24h price change exceeded the report threshold.
#[derive(Debug, PartialEq, sqlx::FromRow, Serialize)]
pub struct PriceChangeRow {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price_change_percentage_24h: Option<f64>,
}
