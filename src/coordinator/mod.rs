//! Concurrent fan-out with request coalescing.
//!
//! Many callers asking for the same symbol at the same time share one
//! resolution instead of racing each other through the provider chain.
//! Multi-symbol requests run in parallel under a bounded concurrency cap,
//! and every symbol gets an outcome; one failure never hides another
//! symbol's quote.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, StreamExt};
use log::debug;

use crate::errors::MarketDataError;
use crate::models::StockQuote;
use crate::registry::FailoverOrchestrator;

type SharedFetch = Shared<BoxFuture<'static, Result<StockQuote, MarketDataError>>>;

pub struct FetchCoordinator {
    orchestrator: Arc<FailoverOrchestrator>,
    in_flight: Arc<DashMap<String, SharedFetch>>,
    fetch_timeout: Duration,
    max_concurrency: usize,
}

impl FetchCoordinator {
    pub fn new(
        orchestrator: Arc<FailoverOrchestrator>,
        fetch_timeout: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            orchestrator,
            in_flight: Arc::new(DashMap::new()),
            fetch_timeout,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Resolve one symbol, joining an in-flight resolution when one exists.
    pub async fn fetch(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        self.shared_fetch(symbol).await
    }

    /// Resolve each distinct symbol concurrently, at most `max_concurrency`
    /// at a time. The result map has one entry per distinct input symbol.
    pub async fn fetch_many(
        &self,
        symbols: &[String],
    ) -> HashMap<String, Result<StockQuote, MarketDataError>> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = symbols.iter().filter(|s| seen.insert(s.as_str())).collect();

        debug!(
            "Fanning out {} symbol(s), cap {}",
            unique.len(),
            self.max_concurrency
        );

        stream::iter(unique.into_iter().map(|symbol| {
            let fetch = self.shared_fetch(symbol);
            async move { (symbol.clone(), fetch.await) }
        }))
        .buffer_unordered(self.max_concurrency)
        .collect()
        .await
    }

    /// Force a live refetch for one symbol, bypassing the fresh-cache check.
    /// Refreshes are not coalesced with ordinary fetches.
    pub async fn refresh(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        let resolve = self.orchestrator.resolve(symbol, true);
        match tokio::time::timeout(self.fetch_timeout, resolve).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                context: symbol.to_string(),
            }),
        }
    }

    /// The single in-flight resolution for a symbol. The winner of the entry
    /// race installs a future that removes itself on completion; everyone
    /// else clones the installed handle and awaits the same outcome.
    fn shared_fetch(&self, symbol: &str) -> SharedFetch {
        if let Some(existing) = self.in_flight.get(symbol) {
            return existing.clone();
        }

        match self.in_flight.entry(symbol.to_string()) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let orchestrator = Arc::clone(&self.orchestrator);
                let in_flight = Arc::clone(&self.in_flight);
                let symbol = symbol.to_string();
                let deadline = self.fetch_timeout;

                let fetch = async move {
                    let resolve = orchestrator.resolve(&symbol, false);
                    let result = match tokio::time::timeout(deadline, resolve).await {
                        Ok(result) => result,
                        Err(_) => Err(MarketDataError::Timeout {
                            context: symbol.clone(),
                        }),
                    };
                    in_flight.remove(&symbol);
                    result
                }
                .boxed()
                .shared();

                vacant.insert(fetch.clone());
                fetch
            }
        }
    }
}
