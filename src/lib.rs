//! Quotefeed Market Data Crate
//!
//! This crate fetches current stock quotes from multiple upstream providers
//! with automatic failover, so no single outage, throttle or revoked key
//! takes quote delivery down.
//!
//! # Overview
//!
//! The crate supports:
//! - Multiple providers: Yahoo Finance, Alpha Vantage, Finnhub
//! - Priority-ordered failover with non-blocking per-provider rate gates
//! - TTL caching with provenance preserved on every quote
//! - Concurrent multi-symbol fan-out with request coalescing
//! - An offline last-known-quote store as the final fallback
//!
//! # Architecture
//!
//! ```text
//! +---------------------+
//! |  MarketDataService  |  (facade)
//! +---------------------+
//!           |
//!           v
//! +---------------------+
//! |  FetchCoordinator   |  (coalescing, bounded fan-out, deadlines)
//! +---------------------+
//!           |
//!           v
//! +----------------------+
//! | FailoverOrchestrator |  (cache -> providers by priority -> offline)
//! +----------------------+
//!           |
//!           v
//! +---------------------+
//! |   ProviderAdapter   |  (Yahoo, AlphaVantage, Finnhub)
//! +---------------------+
//!           |
//!           v
//! +---------------------+
//! |     StockQuote      |  (normalized market data)
//! +---------------------+
//! ```
//!
//! # Core Types
//!
//! - [`StockQuote`] - Normalized quote with provenance
//! - [`MarketDataConfig`] - Provider list plus cache, deadline and fan-out knobs
//! - [`MarketDataError`] - Error taxonomy, including per-provider attempt lists
//! - [`MarketDataService`] - The public entry point

pub mod cache;
pub mod coordinator;
pub mod errors;
pub mod models;
pub mod notify;
pub mod provider;
pub mod registry;
pub mod service;
pub mod store;

pub use models::{
    MarketDataConfig, ProviderSettings, StockQuote, PROVIDER_ALPHA_VANTAGE, PROVIDER_FINNHUB,
    PROVIDER_YAHOO,
};

pub use cache::QuoteCache;
pub use coordinator::FetchCoordinator;
pub use errors::{ErrorKind, FailoverAction, MarketDataError, ProviderFailure};
pub use notify::{DataIntegrityNotifier, NoopNotifier};
pub use provider::{AlphaVantageProvider, FinnhubProvider, ProviderAdapter, YahooProvider};
pub use registry::{FailoverOrchestrator, FetchAttempts, RateLimiter};
pub use service::MarketDataService;
pub use store::{OfflineQuoteStore, SqliteQuoteStore};
