//! Provider chain management: rate gating, attempt tracking and failover.

mod attempts;
mod orchestrator;
mod rate_limiter;

pub use attempts::FetchAttempts;
pub use orchestrator::FailoverOrchestrator;
pub use rate_limiter::RateLimiter;
