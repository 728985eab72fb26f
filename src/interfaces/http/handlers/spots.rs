//! Parking spot HTTP handlers

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::application::SharedSpotService;
use crate::domain::{DomainError, Location, ParkingSpot, SpotId, SpotPatch};
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::dto::{
    AddSpotRequest, AddedSpotResponse, NearbyQuery, NearbyResponse, UpdateSpotRequest,
};

/// Application state for spot handlers.
#[derive(Clone)]
pub struct SpotAppState {
    pub service: SharedSpotService,
}

/// `GET /api/v1/spots`
pub async fn list_spots(State(state): State<SpotAppState>) -> ApiResult<Vec<ParkingSpot>> {
    let spots = state.service.list().await;
    Ok(Json(ApiResponse::success(spots.to_vec())))
}

/// `GET /api/v1/spots/{id}`
pub async fn get_spot(
    State(state): State<SpotAppState>,
    Path(id): Path<SpotId>,
) -> ApiResult<ParkingSpot> {
    let spot = state.service.get(id).await?;
    Ok(Json(ApiResponse::success(spot)))
}

/// `GET /api/v1/spots/nearby`
pub async fn nearby_spots(
    State(state): State<SpotAppState>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult<NearbyResponse> {
    let location = optional_location(query.lat, query.lon)?;
    let radius_km = query.radius_km.unwrap_or(state.service.radius_km());
    let spots = state.service.nearby(location, Some(radius_km)).await?;

    Ok(Json(ApiResponse::success(NearbyResponse {
        location,
        radius_km,
        spots,
    })))
}

/// `POST /api/v1/spots`
pub async fn add_spot(
    State(state): State<SpotAppState>,
    ValidatedJson(request): ValidatedJson<AddSpotRequest>,
) -> ApiResult<AddedSpotResponse> {
    let added = match optional_location(request.latitude, request.longitude)? {
        Some(location) => state.service.add_spot(location).await?,
        None => state.service.add_spot_here().await?,
    };
    Ok(Json(ApiResponse::success(added.into())))
}

/// `PATCH /api/v1/spots/{id}`
pub async fn update_spot(
    State(state): State<SpotAppState>,
    Path(id): Path<SpotId>,
    ValidatedJson(request): ValidatedJson<UpdateSpotRequest>,
) -> ApiResult<ParkingSpot> {
    let patch: SpotPatch = request.into();
    if patch.is_empty() {
        return Err(DomainError::Validation("no fields to update".into()).into());
    }
    let spot = state.service.update(id, patch).await?;
    Ok(Json(ApiResponse::success(spot)))
}

/// `POST /api/v1/spots/{id}/reserve`
pub async fn reserve_spot(
    State(state): State<SpotAppState>,
    Path(id): Path<SpotId>,
) -> ApiResult<ParkingSpot> {
    let spot = state.service.reserve(id).await?;
    Ok(Json(ApiResponse::success(spot)))
}

/// `POST /api/v1/spots/{id}/unreserve`
pub async fn unreserve_spot(
    State(state): State<SpotAppState>,
    Path(id): Path<SpotId>,
) -> ApiResult<ParkingSpot> {
    let spot = state.service.unreserve(id).await?;
    Ok(Json(ApiResponse::success(spot)))
}

/// `POST /api/v1/spots/{id}/unavailable`
pub async fn mark_spot_unavailable(
    State(state): State<SpotAppState>,
    Path(id): Path<SpotId>,
) -> ApiResult<ParkingSpot> {
    let spot = state.service.mark_unavailable(id).await?;
    Ok(Json(ApiResponse::success(spot)))
}

/// `POST /api/v1/spots/{id}/address`
pub async fn refresh_spot_address(
    State(state): State<SpotAppState>,
    Path(id): Path<SpotId>,
) -> ApiResult<ParkingSpot> {
    let spot = state.service.refresh_address(id).await?;
    Ok(Json(ApiResponse::success(spot)))
}

/// Coordinates must come as a pair: both present or both absent.
fn optional_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Location>, DomainError> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Location::new(latitude, longitude).map(Some),
        (None, None) => Ok(None),
        _ => Err(DomainError::Validation(
            "latitude and longitude must be given together".into(),
        )),
    }
}
