//! Core data types for market data operations:
//! - `quote` - The normalized quote record (StockQuote)
//! - `config` - Provider and crate configuration (ProviderSettings, MarketDataConfig)

mod config;
mod quote;

pub use config::{
    MarketDataConfig, ProviderSettings, PROVIDER_ALPHA_VANTAGE, PROVIDER_FINNHUB, PROVIDER_YAHOO,
};
pub use quote::StockQuote;
