//! Priority-ordered failover over the configured providers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::cache::QuoteCache;
use crate::errors::{ErrorKind, FailoverAction, MarketDataError};
use crate::models::{MarketDataConfig, StockQuote};
use crate::notify::DataIntegrityNotifier;
use crate::provider::ProviderAdapter;
use crate::store::OfflineQuoteStore;

use super::attempts::FetchAttempts;
use super::rate_limiter::RateLimiter;

/// One provider in the chain. The enabled flag starts true and flips off for
/// the rest of the session when the provider reports a credential failure.
struct ProviderEntry {
    adapter: ProviderAdapter,
    enabled: AtomicBool,
}

impl ProviderEntry {
    fn new(adapter: ProviderAdapter) -> Self {
        Self {
            adapter,
            enabled: AtomicBool::new(true),
        }
    }
}

/// Resolves one symbol at a time by walking the provider chain in priority
/// order: cache first, then each provider that passes its rate gate, then
/// the offline store as a last resort.
///
/// The first provider to return a full quote wins; the rest are never
/// contacted. A provider that cannot be tried right now (rate gate closed,
/// disabled for the session) is skipped without waiting, and the skip is
/// recorded so an exhausted chain can report what happened per provider.
pub struct FailoverOrchestrator {
    entries: Vec<ProviderEntry>,
    limiter: RateLimiter,
    cache: QuoteCache,
    cache_ttl: Duration,
    notifier: Arc<dyn DataIntegrityNotifier>,
    store: Option<Arc<dyn OfflineQuoteStore>>,
}

impl FailoverOrchestrator {
    /// Build the chain from configuration. Disabled, credential-less keyed
    /// and unknown providers are dropped here; what remains is sorted by
    /// ascending priority (declaration order breaks ties).
    pub fn from_config(
        config: &MarketDataConfig,
        notifier: Arc<dyn DataIntegrityNotifier>,
        store: Option<Arc<dyn OfflineQuoteStore>>,
    ) -> Self {
        let limiter = RateLimiter::new();

        let mut settings: Vec<_> = config.providers.iter().collect();
        settings.sort_by_key(|s| s.priority);

        let mut entries = Vec::new();
        for setting in settings {
            if let Some(adapter) = ProviderAdapter::from_settings(setting) {
                limiter.configure(adapter.id(), setting.requests_per_second);
                entries.push(ProviderEntry::new(adapter));
            }
        }

        if entries.is_empty() {
            warn!("No market data providers are usable; only cached and offline quotes can be served.");
        }

        Self {
            entries,
            limiter,
            cache: QuoteCache::new(),
            cache_ttl: config.cache_ttl(),
            notifier,
            store,
        }
    }

    /// Resolve one symbol.
    ///
    /// `force_refresh` bypasses the fresh-cache check but still repopulates
    /// the cache on success.
    pub async fn resolve(
        &self,
        symbol: &str,
        force_refresh: bool,
    ) -> Result<StockQuote, MarketDataError> {
        if !force_refresh {
            if let Some(quote) = self.cache.get(symbol) {
                debug!("Cache hit for {} (from {})", symbol, quote.provider);
                return Ok(quote);
            }
        }

        let mut attempts = FetchAttempts::new();

        for entry in &self.entries {
            let id = entry.adapter.id();

            if !entry.enabled.load(Ordering::Relaxed) {
                attempts.record(id, ErrorKind::Unauthorized);
                continue;
            }

            if !self.limiter.try_acquire(id) {
                debug!("Rate gate closed for {}, skipping for {}", id, symbol);
                attempts.record(id, ErrorKind::RateLimited);
                continue;
            }

            match entry.adapter.fetch_quote(symbol).await {
                Ok(quote) => {
                    self.cache
                        .put(symbol, quote.clone(), self.cache_ttl);
                    self.publish(quote.clone());
                    return Ok(quote);
                }
                Err(error) => {
                    debug!("{} failed for {}: {}", id, symbol, error);
                    attempts.record(id, error.kind());
                    if error.failover_action() == FailoverAction::DisableProvider {
                        warn!(
                            "{} rejected our credential; disabling it for this session.",
                            id
                        );
                        entry.enabled.store(false, Ordering::Relaxed);
                    }
                }
            }
        }

        if let Some(store) = &self.store {
            // The store does disk I/O under a mutex, so keep it off the
            // runtime workers.
            let store = Arc::clone(store);
            let lookup_symbol = symbol.to_string();
            let lookup =
                tokio::task::spawn_blocking(move || store.get(&lookup_symbol)).await;
            match lookup {
                Ok(Ok(Some(quote))) => {
                    warn!(
                        "Serving offline quote for {} (from {}, saved {})",
                        symbol, quote.provider, quote.timestamp
                    );
                    return Ok(quote);
                }
                Ok(Ok(None)) => {}
                Ok(Err(error)) => warn!("Offline store lookup failed for {}: {}", symbol, error),
                Err(error) => warn!("Offline store lookup task failed for {}: {}", symbol, error),
            }
        }

        warn!(
            "All providers exhausted for {}: [{}]",
            symbol,
            attempts.summary()
        );

        if attempts.unanimous_not_found() {
            Err(MarketDataError::SymbolNotFound(symbol.to_string()))
        } else {
            Err(MarketDataError::AllProvidersExhausted {
                symbol: symbol.to_string(),
                attempts: attempts.into_failures(),
            })
        }
    }

    /// Drop any cached entry for the symbol.
    pub fn invalidate(&self, symbol: &str) {
        self.cache.invalidate(symbol);
    }

    /// Hand the freshly fetched quote to the notifier and the offline store
    /// off the request path. Neither outcome affects the caller.
    fn publish(&self, quote: StockQuote) {
        if let Some(store) = &self.store {
            let store = Arc::clone(store);
            let stored = quote.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(error) = store.put(&stored) {
                    warn!(
                        "Failed to persist offline quote for {}: {}",
                        stored.symbol, error
                    );
                }
            });
        }

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            notifier.on_quote_fetched(quote).await;
        });
    }

    #[cfg(test)]
    pub(crate) fn provider_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.adapter.id()).collect()
    }

    #[cfg(test)]
    pub(crate) fn with_adapters(
        adapters: Vec<(ProviderAdapter, f64)>,
        cache_ttl: Duration,
        notifier: Arc<dyn DataIntegrityNotifier>,
        store: Option<Arc<dyn OfflineQuoteStore>>,
    ) -> Self {
        let limiter = RateLimiter::new();
        let mut entries = Vec::new();
        for (adapter, requests_per_second) in adapters {
            limiter.configure(adapter.id(), requests_per_second);
            entries.push(ProviderEntry::new(adapter));
        }
        Self {
            entries,
            limiter,
            cache: QuoteCache::new(),
            cache_ttl,
            notifier,
            store,
        }
    }
}
