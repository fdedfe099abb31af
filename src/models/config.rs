//! Provider and crate configuration.
//!
//! Providers are configured as an ordered list; priority establishes a strict
//! total order among enabled providers, with ties broken by declaration
//! order. Settings are immutable for the session except the enabled flag,
//! which the orchestrator clears when a provider reports Unauthorized.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Yahoo Finance provider id.
pub const PROVIDER_YAHOO: &str = "YAHOO";
/// Alpha Vantage provider id.
pub const PROVIDER_ALPHA_VANTAGE: &str = "ALPHA_VANTAGE";
/// Finnhub provider id.
pub const PROVIDER_FINNHUB: &str = "FINNHUB";

/// Default cache TTL in seconds (5 minutes).
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default per-symbol fetch deadline in seconds.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default bounded-parallelism worker count for fan-out.
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Configuration for one upstream provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider identifier (see the `PROVIDER_*` constants)
    pub id: String,

    /// Whether the provider participates in failover
    pub enabled: bool,

    /// Priority among enabled providers; lower values are tried first
    pub priority: i32,

    /// Maximum request rate against this provider
    pub requests_per_second: f64,

    /// API key, for providers that require one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl ProviderSettings {
    pub fn new(id: impl Into<String>, priority: i32, requests_per_second: f64) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            priority,
            requests_per_second,
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Crate-level configuration: the ordered provider list plus cache, deadline
/// and fan-out knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// Providers in declaration order
    pub providers: Vec<ProviderSettings>,

    /// Cache time-to-live applied to every stored quote, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Deadline for one symbol's whole resolution chain, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum symbols resolved in parallel by `fetch_many`
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for MarketDataConfig {
    /// Yahoo enabled at highest priority; keyed providers present but
    /// disabled until a credential is supplied.
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderSettings::new(PROVIDER_YAHOO, 1, 2.0),
                ProviderSettings::new(PROVIDER_ALPHA_VANTAGE, 2, 0.2).disabled(),
                ProviderSettings::new(PROVIDER_FINNHUB, 3, 1.0).disabled(),
            ],
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl MarketDataConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketDataConfig::default();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.providers[0].id, PROVIDER_YAHOO);
        assert!(config.providers[0].enabled);
        assert!(!config.providers[1].enabled);
        assert!(!config.providers[2].enabled);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let json = r#"{
            "providers": [
                {"id": "YAHOO", "enabled": true, "priority": 1, "requests_per_second": 2.0}
            ]
        }"#;
        let config: MarketDataConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.max_concurrency, 4);
        assert!(config.providers[0].credential.is_none());
    }

    #[test]
    fn test_provider_settings_builders() {
        let settings = ProviderSettings::new(PROVIDER_FINNHUB, 3, 1.0)
            .with_credential("token")
            .disabled();
        assert_eq!(settings.credential.as_deref(), Some("token"));
        assert!(!settings.enabled);
    }
}
