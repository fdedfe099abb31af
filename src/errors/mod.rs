//! Error types and failover classification for quote fetching.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`ErrorKind`]: The provider-local error taxonomy recorded per attempt
//! - [`FailoverAction`]: Classification driving the failover loop

mod failover;

pub use failover::FailoverAction;

use thiserror::Error;

/// Provider-local error taxonomy.
///
/// Every failure an adapter can report maps to exactly one kind. The
/// orchestrator records these per provider so an exhausted chain can
/// explain itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The provider affirmatively reported an unknown symbol.
    NotFound,
    /// The provider (or our own limiter) throttled the request.
    RateLimited,
    /// The request did not complete in time, or the network failed.
    Timeout,
    /// The provider answered, but the payload could not be fully parsed.
    MalformedResponse,
    /// Bad or missing credential.
    Unauthorized,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "NotFound"),
            Self::RateLimited => write!(f, "RateLimited"),
            Self::Timeout => write!(f, "Timeout"),
            Self::MalformedResponse => write!(f, "MalformedResponse"),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

/// One provider's failure within a failover chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderFailure {
    /// The provider that failed.
    pub provider: String,
    /// What went wrong.
    pub kind: ErrorKind,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.kind)
    }
}

/// Errors that can occur during market data operations.
///
/// Adapters only ever produce the provider-local variants (the first five);
/// the aggregate variants are produced by the orchestrator and coordinator.
/// The enum is `Clone` so a coalesced in-flight resolution can hand the same
/// outcome to every waiter.
#[derive(Error, Debug, Clone)]
pub enum MarketDataError {
    /// The requested symbol is unknown. As an aggregate result this means
    /// every enabled provider answered NotFound.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429 or throttle note).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request timed out. `context` is a provider id for an adapter-level
    /// timeout, or a symbol for a whole-chain deadline expiry.
    #[error("Timeout: {context}")]
    Timeout {
        /// Provider id or symbol, depending on which deadline expired
        context: String,
    },

    /// The provider returned a payload we could not fully parse.
    /// Partial records are never returned.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The provider that returned the payload
        provider: String,
        /// What failed to parse
        message: String,
    },

    /// The credential was rejected or missing. The orchestrator disables the
    /// provider for the rest of the session after one logged warning.
    #[error("Unauthorized: {provider}")]
    Unauthorized {
        /// The provider that rejected the credential
        provider: String,
    },

    /// Every enabled provider was tried and none produced a quote.
    /// An empty attempt list means no provider was configured at all.
    #[error("All providers exhausted for '{symbol}'")]
    AllProvidersExhausted {
        /// The symbol being resolved
        symbol: String,
        /// Per-provider error kinds, in trial order
        attempts: Vec<ProviderFailure>,
    },

    /// The offline quote store failed.
    #[error("Offline store error: {0}")]
    Store(String),
}

impl MarketDataError {
    /// The provider-local kind of this error.
    ///
    /// Aggregate variants are never produced by adapters; they classify as
    /// MalformedResponse if one ever reaches this path.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SymbolNotFound(_) => ErrorKind::NotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::AllProvidersExhausted { .. } | Self::Store(_) => ErrorKind::MalformedResponse,
        }
    }

    /// How the failover loop should react to this error.
    pub fn failover_action(&self) -> FailoverAction {
        match self.kind() {
            ErrorKind::Unauthorized => FailoverAction::DisableProvider,
            _ => FailoverAction::NextProvider,
        }
    }
}
