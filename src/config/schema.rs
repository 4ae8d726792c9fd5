//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::features::FeatureFlag;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Fixed-window quota settings.
    pub quota: QuotaConfig,

    /// In-flight upstream call limit.
    pub concurrency: ConcurrencyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Downstream validator settings.
    pub upstream: UpstreamConfig,

    /// Address pattern settings.
    pub input: InputConfig,

    /// Initial state of the feature flags.
    pub features: FeaturesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Quota configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Requests admitted per window.
    pub limit: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            window_secs: 5,
        }
    }
}

/// Concurrency limiter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Maximum simultaneous upstream calls.
    pub max_in_flight: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_in_flight: 5 }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound on one upstream call in milliseconds.
    pub upstream_ms: u64,

    /// Bound on a whole inbound HTTP request in seconds.
    pub request_secs: u64,

    /// With `timeouts` on, every Nth request asks the upstream to stall.
    pub inject_every_nth: u64,

    /// Stall length requested from the upstream, in seconds.
    pub inject_wait_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_ms: 3_000,
            request_secs: 30,
            inject_every_nth: 5,
            inject_wait_secs: 5,
        }
    }
}

/// Downstream validator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Root URL of the validator; `/validate` is appended.
    pub base_url: String,

    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Idle pooled connections kept per host.
    pub pool_max_idle: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://external_api:8001".to_string(),
            connect_timeout_ms: 1_000,
            pool_max_idle: 32,
        }
    }
}

/// Input validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pattern the trimmed address must match.
    pub pattern: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pattern: "^[A-Za-z0-9 ,.#-]+$".to_string(),
        }
    }
}

/// Startup values for the feature flags. All off by default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturesConfig {
    pub resource_quotas: bool,
    pub concurrency: bool,
    pub efficiency: bool,
    pub timeouts: bool,
    pub input_validation: bool,
}

impl FeaturesConfig {
    pub fn entries(&self) -> [(FeatureFlag, bool); 5] {
        [
            (FeatureFlag::ResourceQuotas, self.resource_quotas),
            (FeatureFlag::Concurrency, self.concurrency),
            (FeatureFlag::Efficiency, self.efficiency),
            (FeatureFlag::Timeouts, self.timeouts),
            (FeatureFlag::InputValidation, self.input_validation),
        ]
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
