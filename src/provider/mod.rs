//! Provider adapters and their shared plumbing.
//!
//! Each adapter owns its transport and parsing and normalizes the upstream
//! payload into a [`StockQuote`](crate::models::StockQuote). Dispatch is a
//! closed enum with one variant per concrete provider, selected once at
//! configuration-load time; nothing downstream knows which upstream answered
//! beyond the provenance field on the quote.

pub mod alpha_vantage;
pub mod finnhub;
pub mod normalize;
pub mod yahoo;

use std::time::Duration;

use log::{info, warn};
use reqwest::StatusCode;

use crate::errors::MarketDataError;
use crate::models::{
    ProviderSettings, StockQuote, PROVIDER_ALPHA_VANTAGE, PROVIDER_FINNHUB, PROVIDER_YAHOO,
};

pub use alpha_vantage::AlphaVantageProvider;
pub use finnhub::FinnhubProvider;
pub use yahoo::YahooProvider;

/// HTTP request timeout applied by every adapter's client.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Map a transport-level reqwest error into the provider-local taxonomy.
/// Timeouts and connection failures are both "the network did not deliver".
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> MarketDataError {
    if error.is_decode() {
        MarketDataError::MalformedResponse {
            provider: provider.to_string(),
            message: error.to_string(),
        }
    } else {
        MarketDataError::Timeout {
            context: provider.to_string(),
        }
    }
}

/// Map a non-success HTTP status into the provider-local taxonomy.
pub(crate) fn status_error(provider: &str, symbol: &str, status: StatusCode) -> MarketDataError {
    match status {
        StatusCode::NOT_FOUND => MarketDataError::SymbolNotFound(symbol.to_string()),
        StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited {
            provider: provider.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MarketDataError::Unauthorized {
            provider: provider.to_string(),
        },
        other => MarketDataError::MalformedResponse {
            provider: provider.to_string(),
            message: format!("unexpected status {}", other),
        },
    }
}

/// Closed dispatch over the concrete provider adapters.
pub enum ProviderAdapter {
    Yahoo(YahooProvider),
    AlphaVantage(AlphaVantageProvider),
    Finnhub(FinnhubProvider),
    #[cfg(test)]
    Mock(mock::MockProvider),
}

impl ProviderAdapter {
    /// Unique identifier, used for logging, rate limiting and provenance.
    pub fn id(&self) -> &str {
        match self {
            Self::Yahoo(_) => PROVIDER_YAHOO,
            Self::AlphaVantage(_) => PROVIDER_ALPHA_VANTAGE,
            Self::Finnhub(_) => PROVIDER_FINNHUB,
            #[cfg(test)]
            Self::Mock(provider) => provider.id,
        }
    }

    /// Fetch and normalize the current snapshot for one symbol.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        match self {
            Self::Yahoo(provider) => provider.fetch_quote(symbol).await,
            Self::AlphaVantage(provider) => provider.fetch_quote(symbol).await,
            Self::Finnhub(provider) => provider.fetch_quote(symbol).await,
            #[cfg(test)]
            Self::Mock(provider) => provider.fetch_quote(symbol).await,
        }
    }

    /// Construct the adapter for one provider setting.
    ///
    /// Returns `None` (with a logged reason) for disabled entries, keyed
    /// providers without a credential, and unknown ids.
    pub fn from_settings(settings: &ProviderSettings) -> Option<Self> {
        if !settings.enabled {
            info!("Provider '{}' is disabled, skipping.", settings.id);
            return None;
        }

        match settings.id.as_str() {
            PROVIDER_YAHOO => Some(Self::Yahoo(YahooProvider::new())),
            PROVIDER_ALPHA_VANTAGE => match settings.credential.as_deref() {
                Some(key) if !key.is_empty() => {
                    Some(Self::AlphaVantage(AlphaVantageProvider::new(key.to_string())))
                }
                _ => {
                    warn!(
                        "Provider '{}' is enabled but has no API key, skipping.",
                        settings.id
                    );
                    None
                }
            },
            PROVIDER_FINNHUB => match settings.credential.as_deref() {
                Some(key) if !key.is_empty() => {
                    Some(Self::Finnhub(FinnhubProvider::new(key.to_string())))
                }
                _ => {
                    warn!(
                        "Provider '{}' is enabled but has no API key, skipping.",
                        settings.id
                    );
                    None
                }
            },
            other => {
                warn!("Unknown market data provider id: {}. Skipping.", other);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use crate::errors::MarketDataError;
    use crate::models::StockQuote;

    /// Scripted adapter for orchestrator and coordinator tests. Counts calls
    /// and replays a fixed outcome, optionally after a delay.
    pub(crate) struct MockProvider {
        pub id: &'static str,
        pub outcome: Result<Decimal, MarketDataError>,
        pub delay: Duration,
        pub reject: Option<&'static str>,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockProvider {
        pub fn succeeding(id: &'static str, price: Decimal) -> Self {
            Self {
                id,
                outcome: Ok(price),
                delay: Duration::ZERO,
                reject: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(id: &'static str, error: MarketDataError) -> Self {
            Self {
                id,
                outcome: Err(error),
                delay: Duration::ZERO,
                reject: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Report this one symbol as unknown regardless of the scripted
        /// outcome.
        pub fn rejecting(mut self, symbol: &'static str) -> Self {
            self.reject = Some(symbol);
            self
        }

        pub fn call_count(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }

        pub async fn fetch_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            if self.reject == Some(symbol) {
                return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
            }
            match &self.outcome {
                Ok(price) => Ok(StockQuote::new(
                    symbol,
                    *price,
                    Decimal::ZERO,
                    1_000,
                    self.id,
                )),
                Err(error) => Err(error.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_skips_disabled() {
        let settings = ProviderSettings::new(PROVIDER_YAHOO, 1, 2.0).disabled();
        assert!(ProviderAdapter::from_settings(&settings).is_none());
    }

    #[test]
    fn test_from_settings_builds_yahoo_without_credential() {
        let settings = ProviderSettings::new(PROVIDER_YAHOO, 1, 2.0);
        let adapter = ProviderAdapter::from_settings(&settings).unwrap();
        assert_eq!(adapter.id(), PROVIDER_YAHOO);
    }

    #[test]
    fn test_from_settings_requires_credential_for_keyed_providers() {
        let settings = ProviderSettings::new(PROVIDER_ALPHA_VANTAGE, 2, 0.2);
        assert!(ProviderAdapter::from_settings(&settings).is_none());

        let settings = ProviderSettings::new(PROVIDER_FINNHUB, 3, 1.0).with_credential("token");
        let adapter = ProviderAdapter::from_settings(&settings).unwrap();
        assert_eq!(adapter.id(), PROVIDER_FINNHUB);
    }

    #[test]
    fn test_from_settings_skips_unknown_id() {
        let settings = ProviderSettings::new("POLYGON", 4, 1.0);
        assert!(ProviderAdapter::from_settings(&settings).is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error("YAHOO", "AAPL", StatusCode::TOO_MANY_REQUESTS),
            MarketDataError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error("FINNHUB", "AAPL", StatusCode::UNAUTHORIZED),
            MarketDataError::Unauthorized { .. }
        ));
        assert!(matches!(
            status_error("FINNHUB", "AAPL", StatusCode::FORBIDDEN),
            MarketDataError::Unauthorized { .. }
        ));
        assert!(matches!(
            status_error("YAHOO", "AAPL", StatusCode::NOT_FOUND),
            MarketDataError::SymbolNotFound(symbol) if symbol == "AAPL"
        ));
        assert!(matches!(
            status_error("YAHOO", "AAPL", StatusCode::INTERNAL_SERVER_ERROR),
            MarketDataError::MalformedResponse { .. }
        ));
    }
}
