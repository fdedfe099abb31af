//! Per-provider request-rate governor.
//!
//! Each provider gets an independent gate derived from its configured
//! requests-per-second rate: a permit is granted only when the minimum
//! inter-request interval has elapsed since the last grant. Decisions are
//! made atomically and never block; callers that are refused move on to the
//! next provider instead of waiting.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::warn;

/// Default rate for providers that were never configured: 1 request/second.
const DEFAULT_REQUESTS_PER_SECOND: f64 = 1.0;

/// Minimum-interval gate for a single provider.
#[derive(Debug)]
struct Gate {
    /// Time of the last granted permit.
    last_grant: Option<Instant>,
    /// Minimum spacing between granted permits.
    min_interval: Duration,
}

impl Gate {
    fn new(requests_per_second: f64) -> Self {
        // A non-positive rate disables throttling rather than dividing by
        // zero; the config layer treats it as "unlimited".
        let min_interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            last_grant: None,
            min_interval,
        }
    }

    /// Grant a permit iff the interval has elapsed. The first call always
    /// grants.
    fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        match self.last_grant {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_grant = Some(now);
                true
            }
        }
    }
}

/// Rate limiter holding one independent gate per provider.
///
/// Thread-safe; concurrent acquire attempts for the same provider are
/// serialized under one mutex so the configured rate is never exceeded
/// regardless of caller count.
pub struct RateLimiter {
    gates: Mutex<HashMap<String, Gate>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the gates mutex, recovering from poison if necessary.
    ///
    /// The worst case of recovering is one mistimed permit, which is better
    /// than panicking the fetch path.
    fn lock_gates(&self) -> MutexGuard<'_, HashMap<String, Gate>> {
        self.gates.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set the rate for a provider, resetting its gate.
    pub fn configure(&self, provider: &str, requests_per_second: f64) {
        let mut gates = self.lock_gates();
        gates.insert(provider.to_string(), Gate::new(requests_per_second));
    }

    /// Try to acquire a permit without waiting.
    ///
    /// Returns true if the permit was granted, false if the provider is
    /// currently throttled. Unconfigured providers get a default gate.
    pub fn try_acquire(&self, provider: &str) -> bool {
        let mut gates = self.lock_gates();
        let gate = gates
            .entry(provider.to_string())
            .or_insert_with(|| Gate::new(DEFAULT_REQUESTS_PER_SECOND));
        gate.try_acquire()
    }

    /// Forget a provider's gate, so its next acquire is granted immediately.
    pub fn reset(&self, provider: &str) {
        let mut gates = self.lock_gates();
        gates.remove(provider);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_first_acquire_grants() {
        let mut gate = Gate::new(1.0);
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_gate_blocks_within_interval() {
        let mut gate = Gate::new(1.0); // one per second
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
    }

    #[test]
    fn test_gate_grants_after_interval() {
        let mut gate = Gate::new(1.0);
        assert!(gate.try_acquire());

        // Pretend the last grant happened two seconds ago.
        gate.last_grant = Some(Instant::now() - Duration::from_secs(2));
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_zero_rate_never_throttles() {
        let mut gate = Gate::new(0.0);
        assert!(gate.try_acquire());
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_limiter_per_provider_isolation() {
        let limiter = RateLimiter::new();
        limiter.configure("PROVIDER_A", 1.0);
        limiter.configure("PROVIDER_B", 1.0);

        assert!(limiter.try_acquire("PROVIDER_A"));
        assert!(!limiter.try_acquire("PROVIDER_A"));

        // Provider B has its own gate.
        assert!(limiter.try_acquire("PROVIDER_B"));
    }

    #[test]
    fn test_limiter_default_gate_for_unconfigured_provider() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire("UNKNOWN"));
        assert!(!limiter.try_acquire("UNKNOWN"));
    }

    #[test]
    fn test_limiter_reset_restores_permit() {
        let limiter = RateLimiter::new();
        limiter.configure("PROVIDER_A", 0.001);
        assert!(limiter.try_acquire("PROVIDER_A"));
        assert!(!limiter.try_acquire("PROVIDER_A"));

        limiter.reset("PROVIDER_A");
        assert!(limiter.try_acquire("PROVIDER_A"));
    }

    #[test]
    fn test_limiter_configure_replaces_gate() {
        let limiter = RateLimiter::new();
        limiter.configure("PROVIDER_A", 0.001);
        assert!(limiter.try_acquire("PROVIDER_A"));
        assert!(!limiter.try_acquire("PROVIDER_A"));

        limiter.configure("PROVIDER_A", 1000.0);
        assert!(limiter.try_acquire("PROVIDER_A"));
    }

    #[test]
    fn test_concurrent_acquires_grant_at_most_one_permit() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let limiter = Arc::new(RateLimiter::new());
        limiter.configure("SHARED", 0.001); // effectively one permit total
        let grants = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let grants = Arc::clone(&grants);
                std::thread::spawn(move || {
                    if limiter.try_acquire("SHARED") {
                        grants.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(grants.load(Ordering::SeqCst), 1);
    }
}
