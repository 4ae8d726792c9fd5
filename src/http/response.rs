//! Outcome → HTTP response mapping.
//!
//! # Responsibilities
//! - Map each outcome status to its transport code
//! - Add `Retry-After` on quota rejections
//! - Serialize the outcome as the JSON body

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::gateway::{OutcomeStatus, ValidationOutcome};

pub fn status_code(status: OutcomeStatus) -> StatusCode {
    match status {
        OutcomeStatus::Success => StatusCode::OK,
        OutcomeStatus::RejectedQuota | OutcomeStatus::RejectedConcurrency => {
            StatusCode::TOO_MANY_REQUESTS
        }
        OutcomeStatus::RejectedInput | OutcomeStatus::RejectedTimeout => StatusCode::BAD_REQUEST,
        OutcomeStatus::Failure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ValidationOutcome {
    fn into_response(self) -> Response {
        let code = status_code(self.status);
        let retry_after = self.retry_after_secs;
        let mut response = (code, Json(self)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_codes_match_outcome_table() {
        for status in [
            OutcomeStatus::Success,
            OutcomeStatus::Failure,
            OutcomeStatus::RejectedQuota,
            OutcomeStatus::RejectedConcurrency,
            OutcomeStatus::RejectedInput,
            OutcomeStatus::RejectedTimeout,
        ] {
            assert_eq!(status_code(status).as_u16(), status.http_code());
        }
    }

    #[test]
    fn test_retry_after_header() {
        let response = ValidationOutcome::rejected_quota(Duration::from_secs(4)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "4");

        let response = ValidationOutcome::rejected_concurrency().into_response();
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
