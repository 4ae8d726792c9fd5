//! Per-request decision surfaced to the HTTP layer.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::upstream::ValidationResponse;

/// Terminal state of one validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Failure,
    RejectedQuota,
    RejectedConcurrency,
    RejectedInput,
    RejectedTimeout,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Failure => "failure",
            OutcomeStatus::RejectedQuota => "rejected_quota",
            OutcomeStatus::RejectedConcurrency => "rejected_concurrency",
            OutcomeStatus::RejectedInput => "rejected_input",
            OutcomeStatus::RejectedTimeout => "rejected_timeout",
        }
    }

    /// Transport status code for this outcome.
    pub fn http_code(&self) -> u16 {
        match self {
            OutcomeStatus::Success => 200,
            OutcomeStatus::RejectedQuota | OutcomeStatus::RejectedConcurrency => 429,
            OutcomeStatus::RejectedInput | OutcomeStatus::RejectedTimeout => 400,
            OutcomeStatus::Failure => 500,
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of a validation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub status: OutcomeStatus,

    /// Present only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<bool>,

    pub message: String,

    #[serde(default)]
    pub sourced_from_cache: bool,

    /// Seconds until the quota window reopens. Only on `rejected_quota`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl ValidationOutcome {
    fn rejected(status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            validation: None,
            message: message.into(),
            sourced_from_cache: false,
            retry_after_secs: None,
        }
    }

    pub fn success(response: ValidationResponse, sourced_from_cache: bool) -> Self {
        Self {
            status: OutcomeStatus::Success,
            validation: Some(response.validation),
            message: response.message,
            sourced_from_cache,
            retry_after_secs: None,
        }
    }

    pub fn failure() -> Self {
        Self::rejected(
            OutcomeStatus::Failure,
            "Failed to validate address with external service",
        )
    }

    pub fn rejected_quota(retry_after: Duration) -> Self {
        // Round up so a client never retries into a still-closed window.
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        let mut outcome = Self::rejected(
            OutcomeStatus::RejectedQuota,
            format!("Quota exceeded. Please wait {} seconds before retrying.", secs),
        );
        outcome.retry_after_secs = Some(secs);
        outcome
    }

    pub fn rejected_concurrency() -> Self {
        Self::rejected(
            OutcomeStatus::RejectedConcurrency,
            "Too many concurrent requests. Please retry shortly.",
        )
    }

    pub fn rejected_input(message: impl Into<String>) -> Self {
        Self::rejected(OutcomeStatus::RejectedInput, message)
    }

    pub fn rejected_timeout(bound: Duration) -> Self {
        let message = if bound.subsec_millis() == 0 {
            format!("The request timed out after {} seconds", bound.as_secs())
        } else {
            format!("The request timed out after {} ms", bound.as_millis())
        };
        Self::rejected(OutcomeStatus::RejectedTimeout, message)
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OutcomeStatus::Success.http_code(), 200);
        assert_eq!(OutcomeStatus::RejectedQuota.http_code(), 429);
        assert_eq!(OutcomeStatus::RejectedConcurrency.http_code(), 429);
        assert_eq!(OutcomeStatus::RejectedInput.http_code(), 400);
        assert_eq!(OutcomeStatus::RejectedTimeout.http_code(), 400);
        assert_eq!(OutcomeStatus::Failure.http_code(), 500);
    }

    #[test]
    fn test_quota_retry_rounds_up() {
        let outcome = ValidationOutcome::rejected_quota(Duration::from_millis(2_100));
        assert_eq!(outcome.retry_after_secs, Some(3));
        assert!(outcome.message.contains("wait 3 seconds"));
        assert_eq!(outcome.validation, None);
    }

    #[test]
    fn test_timeout_message() {
        let outcome = ValidationOutcome::rejected_timeout(Duration::from_secs(3));
        assert_eq!(outcome.message, "The request timed out after 3 seconds");
        let outcome = ValidationOutcome::rejected_timeout(Duration::from_millis(250));
        assert_eq!(outcome.message, "The request timed out after 250 ms");
    }

    #[test]
    fn test_wire_shape() {
        let outcome = ValidationOutcome::success(
            ValidationResponse {
                validation: true,
                message: "Address is valid.".into(),
            },
            true,
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["validation"], true);
        assert_eq!(json["sourced_from_cache"], true);
        assert!(json.get("retry_after_secs").is_none());

        let json = serde_json::to_value(ValidationOutcome::rejected_concurrency()).unwrap();
        assert_eq!(json["status"], "rejected_concurrency");
        assert!(json.get("validation").is_none());
    }
}
