//! Data-plane handler.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::gateway::{ValidationOutcome, ValidationRequest};
use crate::http::request::request_id;
use crate::http::server::AppState;

/// `POST /validate`
pub async fn validate_address(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: ValidationRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        // Undecodable bodies stop here, before the delay counter and the quota
        // window see them.
        Err(e) => {
            tracing::error!(
                request_id = %request_id(&headers),
                error = %e,
                "Malformed JSON received"
            );
            return ValidationOutcome::rejected_input("Malformed JSON").into_response();
        }
    };

    state.gateway.handle(request).await.into_response()
}
