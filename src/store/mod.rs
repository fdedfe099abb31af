//! Offline quote persistence.
//!
//! The last good quote for each symbol is written through on every live
//! fetch and read back only after every provider has been exhausted. A
//! quote served from here keeps its original provenance; staleness is
//! visible through its timestamp.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::MarketDataError;
use crate::models::StockQuote;

/// Persistence boundary for last-known quotes.
///
/// Methods are synchronous; callers that must not block an async executor
/// wrap calls in `spawn_blocking` or accept the short critical section.
pub trait OfflineQuoteStore: Send + Sync {
    /// Last stored quote for the symbol, if any.
    fn get(&self, symbol: &str) -> Result<Option<StockQuote>, MarketDataError>;

    /// Insert or replace the stored quote for the symbol.
    fn put(&self, quote: &StockQuote) -> Result<(), MarketDataError>;
}

/// SQLite-backed store. Quotes are kept as JSON payloads keyed by symbol,
/// one row per symbol, newest write wins.
pub struct SqliteQuoteStore {
    conn: Mutex<Connection>,
}

impl SqliteQuoteStore {
    pub fn open(path: &str) -> Result<Self, MarketDataError> {
        let conn = Connection::open(path).map_err(store_error)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, MarketDataError> {
        let conn = Connection::open_in_memory().map_err(store_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, MarketDataError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS offline_quotes (
                symbol   TEXT PRIMARY KEY,
                payload  TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(store_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("Offline store mutex was poisoned; recovering.");
            poisoned.into_inner()
        })
    }
}

impl OfflineQuoteStore for SqliteQuoteStore {
    fn get(&self, symbol: &str) -> Result<Option<StockQuote>, MarketDataError> {
        let conn = self.lock_conn();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM offline_quotes WHERE symbol = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .optional()
            .map_err(store_error)?;

        match payload {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| MarketDataError::Store(format!("corrupt stored quote: {}", e))),
            None => Ok(None),
        }
    }

    fn put(&self, quote: &StockQuote) -> Result<(), MarketDataError> {
        let payload = serde_json::to_string(quote)
            .map_err(|e| MarketDataError::Store(format!("unserializable quote: {}", e)))?;

        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO offline_quotes (symbol, payload, saved_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(symbol) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at",
            params![quote.symbol, payload, Utc::now().to_rfc3339()],
        )
        .map_err(store_error)?;
        Ok(())
    }
}

fn store_error(error: rusqlite::Error) -> MarketDataError {
    MarketDataError::Store(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_symbol_is_none() {
        let store = SqliteQuoteStore::open_in_memory().unwrap();
        assert!(store.get("AAPL").unwrap().is_none());
    }

    #[test]
    fn test_put_then_get_round_trips() {
        let store = SqliteQuoteStore::open_in_memory().unwrap();
        let mut quote = StockQuote::new("AAPL", dec!(189.41), dec!(1.23), 52_000_000, "YAHOO");
        quote.market_cap = Some(dec!(2890000000000));

        store.put(&quote).unwrap();
        let loaded = store.get("AAPL").unwrap().unwrap();
        assert_eq!(loaded.symbol, "AAPL");
        assert_eq!(loaded.price, dec!(189.41));
        assert_eq!(loaded.market_cap, Some(dec!(2890000000000)));
        assert_eq!(loaded.provider, "YAHOO");
    }

    #[test]
    fn test_put_replaces_existing_row() {
        let store = SqliteQuoteStore::open_in_memory().unwrap();
        store
            .put(&StockQuote::new("AAPL", dec!(100), dec!(0), 1, "YAHOO"))
            .unwrap();
        store
            .put(&StockQuote::new("AAPL", dec!(101), dec!(0), 2, "FINNHUB"))
            .unwrap();

        let loaded = store.get("AAPL").unwrap().unwrap();
        assert_eq!(loaded.price, dec!(101));
        assert_eq!(loaded.provider, "FINNHUB");
    }
}
