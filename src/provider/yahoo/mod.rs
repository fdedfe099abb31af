//! Yahoo Finance adapter.
//!
//! Fetches the quoteSummary `price` module and normalizes it into a
//! [`StockQuote`]. Yahoo needs no credential, which makes it the default
//! highest-priority provider. Percent change arrives as a fraction
//! (0.0123 = +1.23%) and is scaled to percent units; market cap falls back
//! to the formatted display string ("2.89T") when the raw value is missing.

mod models;

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{StockQuote, PROVIDER_YAHOO};

use super::normalize::{parse_percent, parse_scaled_number};
use super::{status_error, transport_error, REQUEST_TIMEOUT};
use self::models::{PriceModule, QuoteSummaryEnvelope, ValueNode};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        let url = format!("{}/{}?modules=price", BASE_URL, symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_YAHOO, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(PROVIDER_YAHOO, symbol, status));
        }

        let envelope: QuoteSummaryEnvelope = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER_YAHOO, e))?;

        let body = envelope.quote_summary;
        let mut results = match body.result {
            Some(results) if !results.is_empty() => results,
            _ => {
                // Yahoo reports unknown tickers through the error object
                // rather than a 404.
                return match body.error {
                    Some(error) => {
                        debug!(
                            "Yahoo rejected {}: {} ({})",
                            symbol,
                            error.code.as_deref().unwrap_or("unknown code"),
                            error.description.as_deref().unwrap_or("no description")
                        );
                        Err(MarketDataError::SymbolNotFound(symbol.to_string()))
                    }
                    None => Err(MarketDataError::MalformedResponse {
                        provider: PROVIDER_YAHOO.to_string(),
                        message: "empty quoteSummary result".to_string(),
                    }),
                };
            }
        };

        normalize_price_module(symbol, results.remove(0).price)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert the price module into a normalized quote.
///
/// Price, percent change and volume are required; a payload missing any of
/// them fails closed as MalformedResponse. Market cap is optional upstream
/// and stays optional here.
fn normalize_price_module(symbol: &str, price: PriceModule) -> Result<StockQuote, MarketDataError> {
    let malformed = |message: &str| MarketDataError::MalformedResponse {
        provider: PROVIDER_YAHOO.to_string(),
        message: message.to_string(),
    };

    let last_price = price
        .regular_market_price
        .as_ref()
        .and_then(|node| node.raw)
        .and_then(|raw| Decimal::try_from(raw).ok())
        .ok_or_else(|| malformed("missing regularMarketPrice"))?;

    let change_percent = price
        .regular_market_change_percent
        .as_ref()
        .and_then(node_percent)
        .ok_or_else(|| malformed("missing regularMarketChangePercent"))?;

    let volume = price
        .regular_market_volume
        .as_ref()
        .and_then(|node| node.raw)
        .map(|raw| raw as u64)
        .ok_or_else(|| malformed("missing regularMarketVolume"))?;

    let market_cap = price.market_cap.as_ref().and_then(node_scaled);

    let timestamp = price
        .regular_market_time
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Ok(StockQuote {
        symbol: price.symbol.unwrap_or_else(|| symbol.to_string()),
        company: price.short_name,
        price: last_price,
        change_percent,
        volume,
        market_cap,
        timestamp,
        provider: PROVIDER_YAHOO.to_string(),
    })
}

/// Percent change: raw is a fraction, fmt is already in percent units.
fn node_percent(node: &ValueNode) -> Option<Decimal> {
    if let Some(raw) = node.raw {
        return Decimal::try_from(raw).ok().map(|fraction| fraction * Decimal::from(100));
    }
    node.fmt.as_deref().and_then(parse_percent)
}

/// Scaled values like market cap: prefer raw, fall back to "2.89T" strings.
fn node_scaled(node: &ValueNode) -> Option<Decimal> {
    if let Some(raw) = node.raw {
        return Decimal::try_from(raw).ok();
    }
    node.fmt.as_deref().and_then(parse_scaled_number)
}
