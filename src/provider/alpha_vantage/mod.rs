//! Alpha Vantage adapter.
//!
//! Uses the GLOBAL_QUOTE function, which returns flat string fields keyed by
//! position ("05. price", "10. change percent"). The free tier is throttled
//! hard (5 requests/minute); a throttled call still comes back `200 OK` with
//! a "Note" or "Information" body instead of quote data, so that shape is
//! mapped to a rate-limit error rather than a parse failure.

use std::str::FromStr;

use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{StockQuote, PROVIDER_ALPHA_VANTAGE};

use super::normalize::parse_percent;
use super::{status_error, transport_error, REQUEST_TIMEOUT};

const BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Deserialize)]
struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

/// A quote payload. Every field is a string in the upstream JSON, and a
/// throttled or unknown-symbol response carries an empty object here.
#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
}

pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
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
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ALPHA_VANTAGE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(PROVIDER_ALPHA_VANTAGE, symbol, status));
        }

        let envelope: GlobalQuoteEnvelope = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER_ALPHA_VANTAGE, e))?;

        normalize_envelope(symbol, envelope)
    }
}

fn normalize_envelope(
    symbol: &str,
    envelope: GlobalQuoteEnvelope,
) -> Result<StockQuote, MarketDataError> {
    if envelope.note.is_some() || envelope.information.is_some() {
        return Err(MarketDataError::RateLimited {
            provider: PROVIDER_ALPHA_VANTAGE.to_string(),
        });
    }
    if let Some(message) = envelope.error_message {
        return Err(MarketDataError::MalformedResponse {
            provider: PROVIDER_ALPHA_VANTAGE.to_string(),
            message,
        });
    }

    let quote = envelope.global_quote.unwrap_or_default();

    // An unknown symbol yields "Global Quote": {} with 200 OK.
    let price = match quote.price.as_deref() {
        Some(raw) => Decimal::from_str(raw).map_err(|e| MarketDataError::MalformedResponse {
            provider: PROVIDER_ALPHA_VANTAGE.to_string(),
            message: format!("unparseable price '{}': {}", raw, e),
        })?,
        None => return Err(MarketDataError::SymbolNotFound(symbol.to_string())),
    };

    let change_percent = quote
        .change_percent
        .as_deref()
        .and_then(parse_percent)
        .ok_or_else(|| MarketDataError::MalformedResponse {
            provider: PROVIDER_ALPHA_VANTAGE.to_string(),
            message: "missing change percent".to_string(),
        })?;

    let volume = quote
        .volume
        .as_deref()
        .and_then(|raw| raw.parse::<u64>().ok())
        .ok_or_else(|| MarketDataError::MalformedResponse {
            provider: PROVIDER_ALPHA_VANTAGE.to_string(),
            message: "missing or unparseable volume".to_string(),
        })?;

    Ok(StockQuote {
        symbol: symbol.to_string(),
        company: None,
        price,
        change_percent,
        volume,
        market_cap: None,
        timestamp: Utc::now(),
        provider: PROVIDER_ALPHA_VANTAGE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn envelope(json: &str) -> GlobalQuoteEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalizes_quote_fields() {
        let envelope = envelope(
            r#"{
                "Global Quote": {
                    "01. symbol": "AAPL",
                    "05. price": "189.4100",
                    "06. volume": "52164500",
                    "09. change": "2.3100",
                    "10. change percent": "1.2345%"
                }
            }"#,
        );

        let quote = normalize_envelope("AAPL", envelope).unwrap();
        assert_eq!(quote.price, dec!(189.41));
        assert_eq!(quote.change_percent, dec!(1.2345));
        assert_eq!(quote.volume, 52_164_500);
        assert_eq!(quote.market_cap, None);
        assert_eq!(quote.provider, PROVIDER_ALPHA_VANTAGE);
    }

    #[test]
    fn test_empty_global_quote_is_not_found() {
        let envelope = envelope(r#"{"Global Quote": {}}"#);
        assert!(matches!(
            normalize_envelope("NOPE", envelope),
            Err(MarketDataError::SymbolNotFound(symbol)) if symbol == "NOPE"
        ));
    }

    #[test]
    fn test_throttle_note_is_rate_limited() {
        let envelope = envelope(
            r#"{"Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#,
        );
        assert!(matches!(
            normalize_envelope("AAPL", envelope),
            Err(MarketDataError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_information_key_is_rate_limited() {
        let envelope = envelope(r#"{"Information": "API key limit reached."}"#);
        assert!(matches!(
            normalize_envelope("AAPL", envelope),
            Err(MarketDataError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_missing_volume_fails_closed() {
        let envelope = envelope(
            r#"{"Global Quote": {"05. price": "189.41", "10. change percent": "1.23%"}}"#,
        );
        assert!(matches!(
            normalize_envelope("AAPL", envelope),
            Err(MarketDataError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_unparseable_volume_fails_closed() {
        let envelope = envelope(
            r#"{"Global Quote": {
                "05. price": "189.41",
                "06. volume": "N/A",
                "10. change percent": "1.23%"
            }}"#,
        );
        assert!(matches!(
            normalize_envelope("AAPL", envelope),
            Err(MarketDataError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_unparseable_price_is_malformed() {
        let envelope = envelope(r#"{"Global Quote": {"05. price": "not-a-number"}}"#);
        assert!(matches!(
            normalize_envelope("AAPL", envelope),
            Err(MarketDataError::MalformedResponse { provider, .. })
                if provider == PROVIDER_ALPHA_VANTAGE
        ));
    }
}
