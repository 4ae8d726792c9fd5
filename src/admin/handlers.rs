use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::features::FeatureFlag;
use crate::gateway::GatewayStats;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub feature: String,
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FlagList {
    pub status: String,
    pub flags: BTreeMap<FeatureFlag, bool>,
}

fn toggle_error(code: StatusCode, message: &str) -> Response {
    (
        code,
        Json(ToggleResponse {
            status: "error".to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// `POST /toggle-feature`
pub async fn set_feature(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ToggleRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Failed to update feature flag");
            return toggle_error(StatusCode::BAD_REQUEST, "Failed to update feature flag");
        }
    };

    if !state.gateway.set_flag(&request.feature, request.enabled) {
        return toggle_error(StatusCode::NOT_FOUND, "Feature not found.");
    }

    tracing::info!(
        feature = %request.feature,
        enabled = state.gateway.features().is_enabled(&request.feature),
        "Feature toggled via control plane"
    );
    Json(ToggleResponse {
        status: "success".to_string(),
        message: format!("Feature '{}' updated.", request.feature),
    })
    .into_response()
}

/// `GET /toggle-feature`
pub async fn list_features(State(state): State<AppState>) -> Json<FlagList> {
    Json(FlagList {
        status: "success".to_string(),
        flags: state.gateway.flags(),
    })
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_stats(State(state): State<AppState>) -> Json<GatewayStats> {
    Json(state.gateway.stats())
}

pub async fn clear_cache(State(state): State<AppState>) -> Json<serde_json::Value> {
    let removed = state.gateway.cache().clear();
    tracing::info!(removed, "Response cache cleared");
    Json(serde_json::json!({ "removed": removed }))
}
