//! Per-provider failure tracking for one failover chain.

use crate::errors::{ErrorKind, ProviderFailure};

/// Accumulates what each provider answered while resolving one symbol, in
/// trial order. When the chain is exhausted the list rides along in
/// `AllProvidersExhausted`, so a caller can distinguish "nothing configured"
/// from "everyone rate-limited" from "truly unknown symbol".
#[derive(Clone, Debug, Default)]
pub struct FetchAttempts {
    failures: Vec<ProviderFailure>,
}

impl FetchAttempts {
    pub fn new() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, provider: &str, kind: ErrorKind) {
        self.failures.push(ProviderFailure {
            provider: provider.to_string(),
            kind,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when at least one provider was tried and every one of them
    /// affirmatively reported an unknown symbol.
    pub fn unanimous_not_found(&self) -> bool {
        !self.failures.is_empty()
            && self
                .failures
                .iter()
                .all(|failure| failure.kind == ErrorKind::NotFound)
    }

    pub fn into_failures(self) -> Vec<ProviderFailure> {
        self.failures
    }

    /// Summary for logging.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|failure| failure.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
