//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts > 0, addresses parse)
//! - Keep the request timeout longer than the upstream bound
//! - Check the input pattern compiles and the upstream URL is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a socket address: {value}")]
    BadAddress { field: &'static str, value: String },

    #[error("upstream.base_url is invalid: {0}")]
    BadUrl(String),

    #[error("input.pattern does not compile: {0}")]
    BadPattern(String),

    #[error("observability.log_level is not a level filter: {0}")]
    BadLogLevel(String),

    #[error("timeouts.request_secs ({request_ms} ms) must exceed upstream_ms ({upstream_ms} ms)")]
    RequestShorterThanUpstream { request_ms: u64, upstream_ms: u64 },
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let nonzero = [
        ("quota.limit", config.quota.limit as u64),
        ("quota.window_secs", config.quota.window_secs),
        ("concurrency.max_in_flight", config.concurrency.max_in_flight as u64),
        ("timeouts.upstream_ms", config.timeouts.upstream_ms),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.inject_every_nth", config.timeouts.inject_every_nth),
        ("listener.max_body_bytes", config.listener.max_body_bytes as u64),
    ];
    for (field, value) in nonzero {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    // The HTTP layer timeout must not fire before the upstream bound does.
    let request_ms = config.timeouts.request_secs.saturating_mul(1_000);
    if request_ms != 0 && request_ms <= config.timeouts.upstream_ms {
        errors.push(ValidationError::RequestShorterThanUpstream {
            request_ms,
            upstream_ms: config.timeouts.upstream_ms,
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    match url::Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::BadUrl(format!(
            "unsupported scheme {}",
            url.scheme()
        ))),
        Err(e) => errors.push(ValidationError::BadUrl(e.to_string())),
    }

    if let Err(e) = regex::Regex::new(&config.input.pattern) {
        errors.push(ValidationError::BadPattern(e.to_string()));
    }

    if config
        .observability
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .is_err()
    {
        errors.push(ValidationError::BadLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.quota.limit = 0;
        config.quota.window_secs = 0;
        config.timeouts.upstream_ms = 0;
        config.input.pattern = "[unclosed".into();
        config.upstream.base_url = "ftp://validator".into();
        config.listener.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::Zero { field: "quota.limit" }));
        assert!(errors.contains(&ValidationError::Zero { field: "quota.window_secs" }));
        assert!(errors.contains(&ValidationError::Zero { field: "timeouts.upstream_ms" }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::BadPattern(_))));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::BadUrl(_))));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::BadAddress { .. })));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());
        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_request_bound_must_cover_upstream_bound() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 3;
        config.timeouts.upstream_ms = 3_000;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::RequestShorterThanUpstream {
                request_ms: 3_000,
                upstream_ms: 3_000,
            }])
        );

        config.timeouts.request_secs = 4;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut config = GatewayConfig::default();
        config.observability.log_level = "loud".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::BadLogLevel("loud".into())])
        );
    }
}
