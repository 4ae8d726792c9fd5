//! Control plane and operator endpoints.
//!
//! No authentication: whoever can reach the listener can flip flags.

pub mod handlers;

use axum::{
    routing::{delete, get},
    Router,
};

use self::handlers::*;
use crate::http::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle-feature", get(list_features).post(set_feature))
        .route("/admin/status", get(get_status))
        .route("/admin/stats", get(get_stats))
        .route("/admin/cache", delete(clear_cache))
}
