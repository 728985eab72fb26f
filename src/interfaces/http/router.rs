//! API router

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::SharedSpotService;
use crate::interfaces::ws::{ws_spot_updates_handler, NotificationState};

use super::handlers::{health, spots, SpotAppState};

/// Create the API router with all routes
pub fn create_api_router(service: SharedSpotService) -> Router {
    let spot_state = SpotAppState {
        service: service.clone(),
    };

    let spot_routes = Router::new()
        .route("/", get(spots::list_spots).post(spots::add_spot))
        .route("/nearby", get(spots::nearby_spots))
        .route("/{id}", get(spots::get_spot).patch(spots::update_spot))
        .route("/{id}/reserve", post(spots::reserve_spot))
        .route("/{id}/unreserve", post(spots::unreserve_spot))
        .route("/{id}/unavailable", post(spots::mark_spot_unavailable))
        .route("/{id}/address", post(spots::refresh_spot_address))
        .with_state(spot_state.clone());

    // Update WebSocket (no auth for the upgrade)
    let notification_routes = Router::new()
        .route("/spots", get(ws_spot_updates_handler))
        .with_state(NotificationState { service });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .with_state(spot_state)
        .nest("/api/v1/spots", spot_routes)
        .nest("/api/v1/ws", notification_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
