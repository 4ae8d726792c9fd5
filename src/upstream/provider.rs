//! Stand-in address provider.
//!
//! A slow, metered downstream service that knows a fixed list of street
//! names. It honours the `?wait=N` hint by sleeping before it answers, which
//! is how the gateway's timeout path gets exercised.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::upstream::types::ValidationResponse;

/// Price charged per validation call, in hundredths of a franc.
const CENTS_PER_CALL: u64 = 1;

const KNOWN_ADDRESSES: &[&str] = &[
    "Main Street", "Main Avenue", "Maple Street", "Elm Street", "Oak Avenue", "Pine Street",
    "Urb. dos Camarinhos", "Rua da fonte", "Impasse de Fougeres", "Travessa da Encosta",
    "Impasse des Fougeres", "Impasse des Alpes", "Cherry Lane", "Cherry Court",
    "Orchard Road", "Grove Lane", "Forest Drive", "Hill Valley", "Summer Road",
    "River Road", "Lake Avenue", "Winter Lane", "Spring Street", "Autumn Road",
    "Park Avenue", "Cedar Lane", "Aspen Drive", "Vine Street", "Rose Lane",
    "Lily Road", "Daisy Drive", "Hyacinth Drive", "Sunflower Lane", "Tulip Street",
    "Magnolia Avenue", "Holly Drive", "Jasmine Lane", "Fern Street", "Birch Road",
    "Walnut Street", "Peach Road", "Apple Lane", "Pear Street", "Cherry Boulevard",
    "Orange Avenue", "Banana Drive", "Grape Road", "Lemon Lane", "Plum Street",
    "Watermelon Drive", "Kiwi Lane", "Mango Street", "Apricot Avenue", "Papaya Drive",
    "Coconut Lane", "Pineapple Street", "Melon Road", "Strawberry Lane", "Raspberry Street",
    "Blueberry Avenue", "Blackberry Lane", "Nectarine Street", "Grapefruit Road", "Lime Lane",
    "Fig Street", "Almond Drive", "Chestnut Lane", "Hazelnut Street", "Macadamia Road",
    "Pecan Lane", "Brazil Nut Street", "Pistachio Drive", "Cashew Lane", "Beech Road",
    "Sycamore Street", "Poplar Lane", "Cypress Drive", "Alder Street", "Willow Lane",
    "Teak Road", "Bamboo Street", "Pine Drive", "Sequoia Lane", "Cedar Street",
    "Oak Drive", "Maple Lane", "Aspen Street", "Fir Road", "Elm Lane", "Birch Street",
    "Cherry Road", "Peach Lane", "Pear Drive", "Orange Street", "Plum Road",
    "Apricot Street", "Apple Drive", "Mango Lane", "Banana Street", "Coconut Road",
    "Pineapple Lane", "Melon Drive",
];

/// Shared provider state.
#[derive(Debug)]
pub struct ProviderState {
    addresses: HashSet<String>,
    calls: AtomicU64,
}

impl ProviderState {
    pub fn new() -> Self {
        Self::with_addresses(KNOWN_ADDRESSES.iter().map(|s| s.to_string()))
    }

    pub fn with_addresses(addresses: impl IntoIterator<Item = String>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
            calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, address: &str) -> ValidationResponse {
        if self.addresses.contains(address) {
            ValidationResponse {
                validation: true,
                message: "Address is valid.".to_string(),
            }
        } else {
            ValidationResponse {
                validation: false,
                message: "Address is not valid.".to_string(),
            }
        }
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
pub struct WaitParams {
    /// Seconds to stall before answering.
    pub wait: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProviderRequest {
    address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Billing {
    pub calls: u64,
    pub total_charge: String,
}

/// Router exposing `POST /validate` and `GET /billing`.
pub fn router(state: Arc<ProviderState>) -> Router {
    Router::new()
        .route("/validate", post(validate))
        .route("/billing", get(billing))
        .with_state(state)
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

async fn validate(
    State(state): State<Arc<ProviderState>>,
    Query(params): Query<WaitParams>,
    body: Bytes,
) -> Response {
    let request: ProviderRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(_) => {
            tracing::error!("Malformed request or missing 'address' field");
            return bad_request("Malformed request, address field missing or bad JSON");
        }
    };

    let address = match request.address {
        Some(address) if !address.is_empty() => address,
        _ => {
            tracing::error!("Received empty query for address validation");
            return bad_request("Address field is required");
        }
    };

    if let Some(wait) = params.wait {
        let Ok(delay) = Duration::try_from_secs_f64(wait) else {
            tracing::error!(wait, "Rejected unusable wait parameter");
            return bad_request("wait must be a non-negative number of seconds");
        };
        if !delay.is_zero() {
            tracing::info!(wait_secs = wait, "Delaying response as requested");
            tokio::time::sleep(delay).await;
        }
    }

    let result = state.lookup(&address);
    let calls = state.calls.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::info!(
        address = %address,
        message = %result.message,
        total_charge = %format_charge(calls),
        "Validated address, charged 0.01 CHF"
    );

    Json(result).into_response()
}

async fn billing(State(state): State<Arc<ProviderState>>) -> Json<Billing> {
    let calls = state.calls();
    Json(Billing {
        calls,
        total_charge: format_charge(calls),
    })
}

fn format_charge(calls: u64) -> String {
    let cents = calls * CENTS_PER_CALL;
    format!("{}.{:02} CHF", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_addresses() {
        let state = ProviderState::new();
        assert!(state.lookup("Main Street").validation);
        assert!(state.lookup("Travessa da Encosta").validation);
        assert!(state.lookup("Impasse des Fougeres").validation);
        assert!(!state.lookup("Main St!").validation);
        assert!(!state.lookup("main street").validation);
    }

    #[tokio::test]
    async fn test_unusable_wait_is_bad_request() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt; // for `oneshot`

        let state = Arc::new(ProviderState::new());
        for wait in ["1e30", "-1", "NaN"] {
            let request = Request::builder()
                .method("POST")
                .uri(format!("/validate?wait={wait}"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"address":"Main Street"}"#))
                .unwrap();
            let response = router(state.clone()).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "wait={wait}");
        }
        assert_eq!(state.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fractional_wait_is_honoured() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt; // for `oneshot`

        let request = Request::builder()
            .method("POST")
            .uri("/validate?wait=0.5")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"address":"Main Street"}"#))
            .unwrap();
        let started = tokio::time::Instant::now();
        let response = router(Arc::new(ProviderState::new()))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn test_charge_format() {
        assert_eq!(format_charge(0), "0.00 CHF");
        assert_eq!(format_charge(7), "0.07 CHF");
        assert_eq!(format_charge(250), "2.50 CHF");
    }
}
