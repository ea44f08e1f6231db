// src/config.rs
// =============================================================================
// Runtime settings for an audit.
//
// Everything that controls how we talk to remote servers lives here:
// - The user agent we identify ourselves with
// - How long we wait for the page and for each link probe
// - How many link probes run at once, and the overall link-check budget
//
// The CLI fills an AuditConfig from its flags; tests use Default and tweak
// individual fields.
// =============================================================================

use std::time::Duration;

/// User agent sent on every request so site owners can identify the crawler.
pub const DEFAULT_USER_AGENT: &str = "SiteAuditorBot/1.0";

/// Timeout for fetching the page under analysis.
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 10;

/// Timeout for each individual link probe.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Maximum number of link probes in flight at once.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 16;

/// Wall-clock budget for the whole link-check phase.
pub const DEFAULT_LINK_BUDGET_SECS: u64 = 60;

/// Maximum redirect hops followed by the HTTP client.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub user_agent: String,
    pub page_timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_concurrency: usize,
    /// None disables the budget; each probe is then bounded only by its own timeout.
    pub link_budget: Option<Duration>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            link_budget: Some(Duration::from_secs(DEFAULT_LINK_BUDGET_SECS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_design_values() {
        let config = AuditConfig::default();
        assert_eq!(config.page_timeout, Duration::from_secs(10));
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert!(config.probe_concurrency >= 10 && config.probe_concurrency <= 20);
        assert!(config.user_agent.starts_with("SiteAuditorBot/"));
    }
}
