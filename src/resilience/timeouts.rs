//! Timeout enforcement and forced-delay injection.
//!
//! # Responsibilities
//! - Hold the upstream call bound
//! - Decide which requests ask the upstream to stall
//!
//! # Design Decisions
//! - The bound always applies; the `timeouts` flag only controls injection
//! - Injection is deterministic (every Nth request) so the timeout path can
//!   be exercised on demand
//! - The gateway never sleeps; the wait hint is sent to the upstream

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::features::{FeatureFlag, FeatureRegistry};

/// Produces the upstream `wait` hint for requests while `timeouts` is on.
#[derive(Debug)]
pub struct DelayInjector {
    features: Arc<FeatureRegistry>,
    counter: AtomicU64,
    every_nth: u64,
    wait_secs: u64,
}

impl DelayInjector {
    pub fn new(config: &TimeoutConfig, features: Arc<FeatureRegistry>) -> Self {
        Self {
            features,
            counter: AtomicU64::new(0),
            every_nth: config.inject_every_nth.max(1),
            wait_secs: config.inject_wait_secs,
        }
    }

    /// Count this request and return the wait hint it should carry.
    ///
    /// Requests are only counted while the flag is enabled.
    pub fn next_wait(&self) -> Option<u64> {
        if !self.features.is_flag_enabled(FeatureFlag::Timeouts) {
            return None;
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if n % self.every_nth == 0 {
            tracing::debug!(request = n, wait_secs = self.wait_secs, "Injecting upstream delay");
            Some(self.wait_secs)
        } else {
            None
        }
    }

    /// Requests counted so far.
    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

/// Upstream call bound from configuration.
pub fn upstream_bound(config: &TimeoutConfig) -> Duration {
    Duration::from_millis(config.upstream_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injector(enabled: bool) -> DelayInjector {
        let features = Arc::new(FeatureRegistry::new());
        features.set_flag(FeatureFlag::Timeouts, enabled);
        DelayInjector::new(&TimeoutConfig::default(), features)
    }

    #[test]
    fn test_every_fifth_request_waits() {
        let injector = injector(true);
        let hints: Vec<_> = (0..10).map(|_| injector.next_wait()).collect();
        let waited: Vec<_> = hints
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.map(|_| i + 1))
            .collect();
        assert_eq!(waited, vec![5, 10]);
        assert_eq!(hints[4], Some(5));
    }

    #[test]
    fn test_disabled_does_not_count() {
        let injector = injector(false);
        for _ in 0..12 {
            assert_eq!(injector.next_wait(), None);
        }
        assert_eq!(injector.count(), 0);
    }

    #[test]
    fn test_default_bound_is_three_seconds() {
        assert_eq!(upstream_bound(&TimeoutConfig::default()), Duration::from_secs(3));
    }
}
