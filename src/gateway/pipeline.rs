//! Orchestration of the gateway stages.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;

use crate::cache::ResponseCache;
use crate::config::{FeaturesConfig, GatewayConfig};
use crate::features::{FeatureFlag, FeatureRegistry};
use crate::gateway::input::{InputPolicy, InputRejection};
use crate::gateway::outcome::ValidationOutcome;
use crate::observability::metrics;
use crate::resilience::concurrency::{Admission, ConcurrencyLimiter};
use crate::resilience::quota::{QuotaDecision, QuotaLimiter, QuotaPolicy, QuotaSnapshot};
use crate::resilience::timeouts::{upstream_bound, DelayInjector};
use crate::upstream::{AddressValidator, DependencyClient, DependencyResult};

/// A decoded inbound request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub address: Option<String>,
}

impl ValidationRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }
}

/// Errors building a gateway from configuration.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid input pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Counters for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStats {
    pub requests_total: u64,
    pub cache_entries: usize,
    pub concurrency_capacity: usize,
    pub concurrency_available: usize,
    pub quota: QuotaSnapshot,
    pub timeout_counter: u64,
}

/// Runs each request through quota, input, cache, concurrency and upstream.
pub struct ValidationGateway {
    features: Arc<FeatureRegistry>,
    quota: QuotaLimiter,
    concurrency: ConcurrencyLimiter,
    cache: ResponseCache,
    delays: DelayInjector,
    input: InputPolicy,
    upstream: DependencyClient,
    requests: AtomicU64,
    /// `[features]` as last read from configuration.
    file_features: ArcSwap<FeaturesConfig>,
}

impl ValidationGateway {
    /// Build a gateway with a fresh registry seeded from `config.features`.
    pub fn new(
        config: &GatewayConfig,
        validator: Arc<dyn AddressValidator>,
    ) -> Result<Self, GatewayError> {
        let features = Arc::new(FeatureRegistry::with_flags(config.features.entries()));
        Self::with_features(config, validator, features)
    }

    /// Build a gateway around an existing registry.
    pub fn with_features(
        config: &GatewayConfig,
        validator: Arc<dyn AddressValidator>,
        features: Arc<FeatureRegistry>,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            quota: QuotaLimiter::new(QuotaPolicy::from(&config.quota), features.clone()),
            concurrency: ConcurrencyLimiter::new(
                config.concurrency.max_in_flight,
                features.clone(),
            ),
            cache: ResponseCache::new(features.clone()),
            delays: DelayInjector::new(&config.timeouts, features.clone()),
            input: InputPolicy::new(&config.input)?,
            upstream: DependencyClient::new(validator, upstream_bound(&config.timeouts)),
            requests: AtomicU64::new(0),
            file_features: ArcSwap::from_pointee(config.features.clone()),
            features,
        })
    }

    /// Decide and, if admitted, forward one request.
    pub async fn handle(&self, request: ValidationRequest) -> ValidationOutcome {
        let id = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        let span = tracing::info_span!("validate", request = id);
        let outcome = self.run_stages(request).instrument(span).await;
        metrics::record_outcome(outcome.status.as_str());
        outcome
    }

    async fn run_stages(&self, request: ValidationRequest) -> ValidationOutcome {
        let wait = self.delays.next_wait();

        if let QuotaDecision::Rejected { retry_after } = self.quota.check() {
            tracing::warn!(retry_after_ms = retry_after.as_millis() as u64, "Quota exceeded");
            return ValidationOutcome::rejected_quota(retry_after);
        }

        let Some(address) = request.address else {
            tracing::error!("Request carries no address");
            return ValidationOutcome::rejected_input(InputRejection::Missing.to_string());
        };

        if self.features.is_flag_enabled(FeatureFlag::InputValidation) {
            if let Err(rejection) = self.input.check(&address) {
                tracing::error!(address = %address, reason = %rejection, "Address rejected");
                return ValidationOutcome::rejected_input(rejection.to_string());
            }
        }

        tracing::info!(address = %address, "Received address");

        if let Some(entry) = self.cache.lookup(&address) {
            tracing::info!(address = %address, message = %entry.message, "Cache hit");
            return ValidationOutcome::success(entry.into(), true);
        }

        // Held until this function returns, whichever branch below is taken.
        let _permit = match self.concurrency.try_acquire() {
            Admission::Admitted(permit) => Some(permit),
            Admission::Disabled => None,
            Admission::Rejected => {
                tracing::warn!(
                    capacity = self.concurrency.capacity(),
                    "Concurrency limit reached"
                );
                return ValidationOutcome::rejected_concurrency();
            }
        };

        match self.upstream.call(&address, wait).await {
            DependencyResult::Success(response) => {
                self.cache.store(&address, response.clone().into());
                ValidationOutcome::success(response, false)
            }
            DependencyResult::Timeout => ValidationOutcome::rejected_timeout(self.upstream.bound()),
            DependencyResult::Failed(_) => ValidationOutcome::failure(),
        }
    }

    /// Control-plane flag update. Returns false for unknown names.
    ///
    /// Switching `resourceQuotas` on starts a fresh quota window.
    pub fn set_flag(&self, name: &str, enabled: bool) -> bool {
        let Ok(flag) = name.parse::<FeatureFlag>() else {
            tracing::warn!(feature = %name, "Unknown feature flag");
            return false;
        };
        self.apply_flag(flag, enabled);
        true
    }

    fn apply_flag(&self, flag: FeatureFlag, enabled: bool) {
        let previous = self.features.set_flag(flag, enabled);
        if flag == FeatureFlag::ResourceQuotas && enabled {
            self.quota.reset();
        }
        if previous != enabled {
            tracing::info!(feature = %flag, enabled, "Feature updated");
        }
    }

    pub fn flags(&self) -> BTreeMap<FeatureFlag, bool> {
        self.features.list()
    }

    /// Apply a reloaded configuration.
    ///
    /// Quota policy takes effect immediately. A flag is only touched when its
    /// `[features]` value differs from the previous file, so control-plane
    /// toggles survive unrelated edits. The concurrency capacity, upstream
    /// bound and input pattern need a restart.
    pub fn apply_config(&self, config: &GatewayConfig) {
        self.quota.update_policy(QuotaPolicy::from(&config.quota));
        let previous = self.file_features.swap(Arc::new(config.features.clone()));
        let changed = config
            .features
            .entries()
            .into_iter()
            .zip(previous.entries())
            .filter(|((_, now), (_, before))| now != before);
        for ((flag, enabled), _) in changed {
            self.apply_flag(flag, enabled);
        }
        if config.concurrency.max_in_flight != self.concurrency.capacity() {
            tracing::warn!(
                current = self.concurrency.capacity(),
                requested = config.concurrency.max_in_flight,
                "Concurrency capacity change requires a restart"
            );
        }
        if upstream_bound(&config.timeouts) != self.upstream.bound() {
            tracing::warn!("Upstream timeout change requires a restart");
        }
    }

    pub fn features(&self) -> &Arc<FeatureRegistry> {
        &self.features
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn concurrency(&self) -> &ConcurrencyLimiter {
        &self.concurrency
    }

    pub fn quota(&self) -> &QuotaLimiter {
        &self.quota
    }

    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            requests_total: self.requests.load(Ordering::SeqCst),
            cache_entries: self.cache.len(),
            concurrency_capacity: self.concurrency.capacity(),
            concurrency_available: self.concurrency.available(),
            quota: self.quota.snapshot(),
            timeout_counter: self.delays.count(),
        }
    }
}
