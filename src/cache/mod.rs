//! In-memory TTL cache for normalized quotes.
//!
//! Backed by a sharded concurrent map, so lookups and inserts contend only at
//! per-key granularity; a slow upstream call for one symbol never blocks
//! cache access for others, and no lock spans the whole cache.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

use crate::models::StockQuote;

/// One cached quote with its fetch time and validity window.
#[derive(Clone, Debug)]
struct CacheEntry {
    quote: StockQuote,
    fetched_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// A hit requires age strictly below the TTL; an entry whose age equals
    /// the TTL is already expired.
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

/// TTL-keyed store of normalized quotes.
///
/// The stored quote keeps the provenance of the provider that produced it;
/// a cache hit returns the quote unchanged.
#[derive(Default)]
pub struct QuoteCache {
    entries: DashMap<String, CacheEntry>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Look up a fresh quote. Expired entries are evicted on read.
    pub fn get(&self, symbol: &str) -> Option<StockQuote> {
        let expired = match self.entries.get(symbol) {
            Some(entry) if entry.is_fresh() => return Some(entry.quote.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            // Re-check under the removal guard: a concurrent put may have
            // refreshed the entry since the read above.
            self.entries.remove_if(symbol, |_, entry| !entry.is_fresh());
            debug!("cache entry for '{}' expired", symbol);
        }

        None
    }

    /// Store a quote with the given validity window, replacing any previous
    /// entry for the symbol.
    pub fn put(&self, symbol: &str, quote: StockQuote, ttl: Duration) {
        self.entries.insert(
            symbol.to_string(),
            CacheEntry {
                quote,
                fetched_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drop a single symbol's entry.
    pub fn invalidate(&self, symbol: &str) {
        self.entries.remove(symbol);
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backdate an entry's fetch time, for expiry tests.
    #[cfg(test)]
    pub(crate) fn backdate(&self, symbol: &str, by: Duration) {
        if let Some(mut entry) = self.entries.get_mut(symbol) {
            entry.fetched_at -= by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(symbol: &str, provider: &str) -> StockQuote {
        StockQuote::new(symbol, dec!(150.0), dec!(0.5), 1_000, provider)
    }

    #[test]
    fn test_put_then_get_within_ttl() {
        let cache = QuoteCache::new();
        cache.put("AAPL", quote("AAPL", "YAHOO"), Duration::from_secs(60));

        let hit = cache.get("AAPL").unwrap();
        assert_eq!(hit.symbol, "AAPL");
        // Provenance survives the cache round trip.
        assert_eq!(hit.provider, "YAHOO");
    }

    #[test]
    fn test_miss_for_unknown_symbol() {
        let cache = QuoteCache::new();
        assert!(cache.get("NOPE").is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = QuoteCache::new();
        cache.put("AAPL", quote("AAPL", "YAHOO"), Duration::from_secs(60));
        cache.backdate("AAPL", Duration::from_secs(61));

        assert!(cache.get("AAPL").is_none());
        // Expired entry was evicted on read.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_age_equal_to_ttl_is_a_miss() {
        let cache = QuoteCache::new();
        cache.put("AAPL", quote("AAPL", "YAHOO"), Duration::ZERO);
        assert!(cache.get("AAPL").is_none());
    }

    #[test]
    fn test_put_replaces_previous_entry() {
        let cache = QuoteCache::new();
        cache.put("AAPL", quote("AAPL", "YAHOO"), Duration::from_secs(60));
        cache.put("AAPL", quote("AAPL", "FINNHUB"), Duration::from_secs(60));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("AAPL").unwrap().provider, "FINNHUB");
    }

    #[test]
    fn test_invalidate() {
        let cache = QuoteCache::new();
        cache.put("AAPL", quote("AAPL", "YAHOO"), Duration::from_secs(60));
        cache.invalidate("AAPL");
        assert!(cache.get("AAPL").is_none());
    }

    #[test]
    fn test_symbols_are_independent() {
        let cache = QuoteCache::new();
        cache.put("AAPL", quote("AAPL", "YAHOO"), Duration::from_secs(60));
        cache.put("MSFT", quote("MSFT", "YAHOO"), Duration::from_secs(60));
        cache.backdate("AAPL", Duration::from_secs(120));

        assert!(cache.get("AAPL").is_none());
        assert!(cache.get("MSFT").is_some());
    }
}
