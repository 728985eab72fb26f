//! Health check handler

use axum::extract::State;
use axum::Json;

use super::spots::SpotAppState;
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::dto::HealthResponse;

/// `GET /health`
pub async fn health_check(State(state): State<SpotAppState>) -> ApiResult<HealthResponse> {
    Ok(Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        spots: state.service.list().await.len(),
        update_feeds: state.service.update_feed_count(),
    })))
}
