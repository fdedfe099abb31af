//! Finnhub adapter.
//!
//! Hits the `/quote` endpoint, which answers with single-letter numeric
//! fields (`c` current, `pc` previous close, `dp` percent change). Finnhub
//! never 404s an unknown symbol; it returns `c == 0` with all other fields
//! zeroed, so that shape is treated as symbol-not-found.

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{StockQuote, PROVIDER_FINNHUB};

use super::{status_error, transport_error, REQUEST_TIMEOUT};

const BASE_URL: &str = "https://finnhub.io/api/v1/quote";

#[derive(Debug, Deserialize)]
struct QuotePayload {
    /// Current price.
    c: Option<f64>,
    /// Percent change since previous close.
    dp: Option<f64>,
    /// Previous close.
    pc: Option<f64>,
    /// Unix timestamp of the quote.
    t: Option<i64>,
}

pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        let response = self
            .client
            .get(BASE_URL)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_FINNHUB, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(PROVIDER_FINNHUB, symbol, status));
        }

        let payload: QuotePayload = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER_FINNHUB, e))?;

        normalize_payload(symbol, payload)
    }
}

fn normalize_payload(symbol: &str, payload: QuotePayload) -> Result<StockQuote, MarketDataError> {
    let current = payload.c.unwrap_or(0.0);
    if current == 0.0 {
        return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
    }

    let price =
        Decimal::try_from(current).map_err(|e| MarketDataError::MalformedResponse {
            provider: PROVIDER_FINNHUB.to_string(),
            message: format!("unrepresentable price {}: {}", current, e),
        })?;

    let change_percent = percent_change(&payload, price)?;

    let timestamp = payload
        .t
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    // Finnhub's quote endpoint carries no volume or market cap.
    Ok(StockQuote {
        symbol: symbol.to_string(),
        company: None,
        price,
        change_percent,
        volume: 0,
        market_cap: None,
        timestamp,
        provider: PROVIDER_FINNHUB.to_string(),
    })
}

/// Prefer the upstream `dp` field; fall back to deriving it from the
/// previous close when `dp` is absent.
fn percent_change(payload: &QuotePayload, price: Decimal) -> Result<Decimal, MarketDataError> {
    if let Some(dp) = payload.dp {
        if let Ok(value) = Decimal::try_from(dp) {
            return Ok(value);
        }
    }

    let previous = payload
        .pc
        .filter(|pc| *pc != 0.0)
        .and_then(|pc| Decimal::try_from(pc).ok());

    match previous {
        Some(previous) => Ok((price - previous) / previous * Decimal::from(100)),
        None => Err(MarketDataError::MalformedResponse {
            provider: PROVIDER_FINNHUB.to_string(),
            message: "missing percent change and previous close".to_string(),
        }),
    }
}
