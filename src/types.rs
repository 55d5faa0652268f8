use serde::Deserialize;

// ---------------------------------------------------------------------------
// Wire types — shapes returned by the CoinGecko REST API
// ---------------------------------------------------------------------------

/// One entry from GET /coins/list: the identity of a known coin,
/// independent of any target currency.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinListing {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// One entry from GET /coins/markets. The endpoint returns many more fields;
/// only the ones the snapshot table keeps are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketRecord {
    pub id: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default, rename = "price_change_percentage_24h_in_currency")]
    pub price_change_24h: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_record_ignores_extra_fields_and_null_price() {
        let json = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://example.com/btc.png",
            "current_price": null,
            "market_cap": 1000000,
            "price_change_percentage_24h_in_currency": -3.25
        }"#;
        let rec: MarketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, "bitcoin");
        assert_eq!(rec.current_price, None);
        assert_eq!(rec.price_change_24h, Some(-3.25));
    }

    #[test]
    fn market_record_defaults_missing_optionals() {
        let rec: MarketRecord = serde_json::from_str(r#"{"id": "dogecoin"}"#).unwrap();
        assert_eq!(rec.id, "dogecoin");
        assert_eq!(rec.current_price, None);
        assert_eq!(rec.price_change_24h, None);
    }

    #[test]
    fn market_record_missing_id_is_an_error() {
        let res: Result<MarketRecord, _> = serde_json::from_str(r#"{"current_price": 1.0}"#);
        assert!(res.is_err());
    }

    #[test]
    fn coin_listing_decodes() {
        let listing: CoinListing =
            serde_json::from_str(r#"{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"}"#)
                .unwrap();
        assert_eq!(listing.id, "bitcoin");
        assert_eq!(listing.symbol, "btc");
        assert_eq!(listing.name, "Bitcoin");
    }
}
