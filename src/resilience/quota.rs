//! Fixed-window request quota.
//!
//! # Responsibilities
//! - Count admitted requests inside the current window
//! - Reset the window the first time it is observed to be stale
//! - Report how long a rejected caller should wait
//!
//! # Design Decisions
//! - Whole window state lives in one mutex so concurrent checks cannot
//!   both take the last slot
//! - Policy (limit, window) is swappable at runtime without losing the count
//! - Uses tokio's clock so tests can pause and advance time

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::time::Instant;

use crate::config::QuotaConfig;
use crate::features::{FeatureFlag, FeatureRegistry};

/// Limit and window length for the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub limit: u32,
    pub window: Duration,
}

impl From<&QuotaConfig> for QuotaPolicy {
    fn from(config: &QuotaConfig) -> Self {
        Self {
            limit: config.limit,
            window: Duration::from_secs(config.window_secs),
        }
    }
}

/// Result of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// `resourceQuotas` is off; nothing was counted.
    Disabled,
    /// Request counted. `used` includes this request.
    Admitted { used: u32, limit: u32 },
    /// Window is full.
    Rejected { retry_after: Duration },
}

impl QuotaDecision {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, QuotaDecision::Rejected { .. })
    }
}

/// Point-in-time view of the window, for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaSnapshot {
    pub used: u32,
    pub limit: u32,
    pub window_secs: u64,
    pub window_remaining_ms: u64,
}

#[derive(Debug)]
struct QuotaWindow {
    count: u32,
    started: Instant,
}

impl QuotaWindow {
    fn fresh() -> Self {
        Self {
            count: 0,
            started: Instant::now(),
        }
    }
}

/// Fixed-window limiter gated by the `resourceQuotas` flag.
pub struct QuotaLimiter {
    features: Arc<FeatureRegistry>,
    policy: ArcSwap<QuotaPolicy>,
    window: Mutex<QuotaWindow>,
}

impl QuotaLimiter {
    pub fn new(policy: QuotaPolicy, features: Arc<FeatureRegistry>) -> Self {
        Self {
            features,
            policy: ArcSwap::from_pointee(policy),
            window: Mutex::new(QuotaWindow::fresh()),
        }
    }

    /// Count this request against the window if quotas are enabled.
    pub fn check(&self) -> QuotaDecision {
        if !self.features.is_flag_enabled(FeatureFlag::ResourceQuotas) {
            return QuotaDecision::Disabled;
        }

        let policy = **self.policy.load();
        let now = Instant::now();
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);

        let elapsed = now.duration_since(window.started);
        if elapsed > policy.window {
            tracing::debug!(previous_count = window.count, "Quota window expired, resetting");
            window.count = 0;
            window.started = now;
        }

        if window.count < policy.limit {
            window.count += 1;
            QuotaDecision::Admitted {
                used: window.count,
                limit: policy.limit,
            }
        } else {
            let retry_after = policy
                .window
                .saturating_sub(now.duration_since(window.started));
            QuotaDecision::Rejected { retry_after }
        }
    }

    /// Start a new, empty window now.
    pub fn reset(&self) {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        *window = QuotaWindow::fresh();
    }

    /// Replace the limit/window pair. The running count is kept.
    pub fn update_policy(&self, policy: QuotaPolicy) {
        let previous = self.policy.swap(Arc::new(policy));
        if *previous != policy {
            tracing::info!(
                limit = policy.limit,
                window_secs = policy.window.as_secs(),
                "Quota policy updated"
            );
        }
    }

    pub fn policy(&self) -> QuotaPolicy {
        **self.policy.load()
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        let policy = self.policy();
        let window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        let remaining = policy.window.saturating_sub(window.started.elapsed());
        QuotaSnapshot {
            used: window.count,
            limit: policy.limit,
            window_secs: policy.window.as_secs(),
            window_remaining_ms: remaining.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, window_secs: u64) -> (QuotaLimiter, Arc<FeatureRegistry>) {
        let features = Arc::new(FeatureRegistry::new());
        features.set_flag(FeatureFlag::ResourceQuotas, true);
        let policy = QuotaPolicy {
            limit,
            window: Duration::from_secs(window_secs),
        };
        (QuotaLimiter::new(policy, features.clone()), features)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_request_rejected_within_window() {
        let (quota, _) = limiter(5, 5);
        for i in 1..=5 {
            assert_eq!(quota.check(), QuotaDecision::Admitted { used: i, limit: 5 });
        }
        match quota.check() {
            QuotaDecision::Rejected { retry_after } => {
                assert!(retry_after <= Duration::from_secs(5));
                assert!(retry_after > Duration::ZERO);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_elapsing() {
        let (quota, _) = limiter(5, 5);
        for _ in 0..5 {
            assert!(quota.check().is_admitted());
        }
        assert!(!quota.check().is_admitted());

        tokio::time::advance(Duration::from_millis(5_001)).await;
        assert_eq!(quota.check(), QuotaDecision::Admitted { used: 1, limit: 5 });
        assert_eq!(quota.snapshot().used, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_tracks_remaining_window() {
        let (quota, _) = limiter(1, 10);
        assert!(quota.check().is_admitted());
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(
            quota.check(),
            QuotaDecision::Rejected {
                retry_after: Duration::from_secs(6)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_flag_never_rejects() {
        let (quota, features) = limiter(1, 60);
        features.set_flag(FeatureFlag::ResourceQuotas, false);
        for _ in 0..20 {
            assert_eq!(quota.check(), QuotaDecision::Disabled);
        }
        assert_eq!(quota.snapshot().used, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_count() {
        let (quota, _) = limiter(2, 60);
        quota.check();
        quota.check();
        assert!(!quota.check().is_admitted());
        quota.reset();
        assert!(quota.check().is_admitted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_update_keeps_count() {
        let (quota, _) = limiter(2, 60);
        quota.check();
        quota.check();
        assert!(!quota.check().is_admitted());

        quota.update_policy(QuotaPolicy {
            limit: 3,
            window: Duration::from_secs(60),
        });
        assert_eq!(quota.check(), QuotaDecision::Admitted { used: 3, limit: 3 });
        assert!(!quota.check().is_admitted());
    }

    #[test]
    fn test_concurrent_checks_never_exceed_limit() {
        let (quota, _) = limiter(5, 60);
        let quota = Arc::new(quota);
        let admitted = Arc::new(std::sync::atomic::AtomicU32::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let quota = quota.clone();
                let admitted = admitted.clone();
                std::thread::spawn(move || {
                    for _ in 0..4 {
                        if let QuotaDecision::Admitted { .. } = quota.check() {
                            admitted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(std::sync::atomic::Ordering::SeqCst), 5);
    }
}
