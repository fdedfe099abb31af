//! Public entry point tying the chain, coordinator and collaborators
//! together.

use std::collections::HashMap;
use std::sync::Arc;

use crate::coordinator::FetchCoordinator;
use crate::errors::MarketDataError;
use crate::models::{MarketDataConfig, StockQuote};
use crate::notify::{DataIntegrityNotifier, NoopNotifier};
use crate::registry::FailoverOrchestrator;
use crate::store::OfflineQuoteStore;

/// Facade over the whole pipeline: per-symbol resolution with failover,
/// caching, coalescing and bounded fan-out.
pub struct MarketDataService {
    orchestrator: Arc<FailoverOrchestrator>,
    coordinator: FetchCoordinator,
}

impl MarketDataService {
    /// Service with no notifier and no offline store.
    pub fn new(config: &MarketDataConfig) -> Self {
        Self::with_collaborators(config, Arc::new(NoopNotifier), None)
    }

    pub fn with_collaborators(
        config: &MarketDataConfig,
        notifier: Arc<dyn DataIntegrityNotifier>,
        store: Option<Arc<dyn OfflineQuoteStore>>,
    ) -> Self {
        let orchestrator = Arc::new(FailoverOrchestrator::from_config(config, notifier, store));
        let coordinator = FetchCoordinator::new(
            Arc::clone(&orchestrator),
            config.fetch_timeout(),
            config.max_concurrency,
        );
        Self {
            orchestrator,
            coordinator,
        }
    }

    /// Current quote for one symbol: cache, then providers in priority
    /// order, then the offline store.
    pub async fn get_stock_data(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        self.coordinator.fetch(symbol).await
    }

    /// Quotes for many symbols, resolved concurrently. Each distinct input
    /// symbol gets its own outcome.
    pub async fn get_stock_data_batch(
        &self,
        symbols: &[String],
    ) -> HashMap<String, Result<StockQuote, MarketDataError>> {
        self.coordinator.fetch_many(symbols).await
    }

    /// Fetch live data for a symbol even when the cache is fresh.
    pub async fn refresh(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        self.coordinator.refresh(symbol).await
    }

    /// Drop the cached quote for a symbol, forcing the next fetch to go to
    /// the providers.
    pub fn invalidate(&self, symbol: &str) {
        self.orchestrator.invalidate(symbol);
    }
}
