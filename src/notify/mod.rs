//! Fire-and-forget hooks fired after a quote is fetched live.
//!
//! Notifiers run off the fetch path; a slow or failing notifier never delays
//! or fails the quote being returned to the caller.

use async_trait::async_trait;

use crate::models::StockQuote;

/// Receives every quote that came back from a live provider.
///
/// Implementations are spawned onto a background task, so they must be
/// `Send + Sync` and should swallow their own errors (logging them is the
/// usual response).
#[async_trait]
pub trait DataIntegrityNotifier: Send + Sync {
    async fn on_quote_fetched(&self, quote: StockQuote);
}

/// Default notifier that drops every event.
pub struct NoopNotifier;

#[async_trait]
impl DataIntegrityNotifier for NoopNotifier {
    async fn on_quote_fetched(&self, _quote: StockQuote) {}
}
