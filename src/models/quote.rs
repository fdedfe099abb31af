use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Provider-agnostic market data snapshot.
///
/// Every adapter normalizes its upstream payload into this shape. The
/// `provider` field records which upstream actually produced the data and is
/// never rewritten, including when the quote is served from the cache or the
/// offline store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockQuote {
    /// Ticker symbol as requested
    pub symbol: String,

    /// Company name, when the provider supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    /// Current/last trade price (required)
    pub price: Decimal,

    /// Percent change versus previous close, in percent units (1.23 = +1.23%)
    pub change_percent: Decimal,

    /// Trading volume
    pub volume: u64,

    /// Market capitalization, normalized to an absolute value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,

    /// When the upstream produced the snapshot
    pub timestamp: DateTime<Utc>,

    /// The provider that produced this data (YAHOO, ALPHA_VANTAGE, FINNHUB)
    pub provider: String,
}

impl StockQuote {
    /// Create a quote with the minimal required fields.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        change_percent: Decimal,
        volume: u64,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            company: None,
            price,
            change_percent,
            volume,
            market_cap: None,
            timestamp: Utc::now(),
            provider: provider.into(),
        }
    }
}
