/// Classification for the failover loop.
///
/// The orchestrator never retries the same provider within one resolution;
/// instant failover substitutes for retry. The only question an error
/// answers is whether the provider stays in the pool for later requests.
///
/// | Action | Try Next Provider? | Provider Stays Enabled? |
/// |--------|--------------------|-------------------------|
/// | `NextProvider` | Yes | Yes |
/// | `DisableProvider` | Yes | No (for the session) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailoverAction {
    /// Record the failure and move on to the next provider in the chain.
    NextProvider,

    /// Move on, and exclude this provider from all later resolutions in this
    /// session. Used for Unauthorized: a rejected credential will not start
    /// working without operator intervention, so repeating the call only
    /// burns rate budget.
    DisableProvider,
}
