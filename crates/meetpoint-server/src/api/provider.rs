//! Thin proxies over the map provider for clients that cannot hold the key.

use axum::{extract::State, Extension, Json};
use meetpoint_core::{Location, Point, TransportMode, Venue, VenueCategory};
use meetpoint_planner::{locate_address, seconds_to_minutes, DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_provider_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeRequest {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchNearbyRequest {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub category: VenueCategory,
    #[serde(default)]
    pub keyword: String,
    pub radius: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionRequest {
    pub origin: Point,
    pub destination: Point,
    #[serde(default)]
    pub mode: TransportMode,
}

#[derive(Debug, Serialize)]
pub(super) struct DirectionItem {
    pub mode: TransportMode,
    pub seconds: u32,
    pub minutes: u32,
}

fn validate_point(request_id: &str, field: &str, point: Point) -> Result<(), ApiError> {
    point
        .validate()
        .map_err(|e| ApiError::new(request_id, "validation_error", format!("{field}: {e}")))
}

/// POST /api/v1/geocode
pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<GeocodeRequest>,
) -> Result<Json<ApiResponse<Location>>, ApiError> {
    let rid = &req_id.0;
    if body.address.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "address must not be blank",
        ));
    }

    let location = locate_address(state.geocoder.as_ref(), &body.address)
        .await
        .map_err(|e| map_provider_error(rid, &e))?;

    Ok(Json(ApiResponse::new(req_id.0, location)))
}

/// POST /api/v1/search-nearby
pub(super) async fn search_nearby(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchNearbyRequest>,
) -> Result<Json<ApiResponse<Vec<Venue>>>, ApiError> {
    let rid = &req_id.0;
    let center = Point::new(body.lat, body.lng);
    validate_point(rid, "center", center)?;

    let radius = body.radius.unwrap_or(DEFAULT_RADIUS_METERS);
    if radius == 0 || radius > MAX_RADIUS_METERS {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("radius must be 1-{MAX_RADIUS_METERS} meters"),
        ));
    }

    let venues = state
        .places
        .search_nearby(center, &body.category, radius, body.keyword.trim())
        .await
        .map_err(|e| map_provider_error(rid, &e))?;

    Ok(Json(ApiResponse::new(req_id.0, venues)))
}

/// POST /api/v1/direction
pub(super) async fn direction(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<DirectionRequest>,
) -> Result<Json<ApiResponse<DirectionItem>>, ApiError> {
    let rid = &req_id.0;
    validate_point(rid, "origin", body.origin)?;
    validate_point(rid, "destination", body.destination)?;

    let seconds = state
        .travel
        .travel_time(body.origin, body.destination, body.mode)
        .await
        .map_err(|e| map_provider_error(rid, &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        DirectionItem {
            mode: body.mode,
            seconds,
            minutes: seconds_to_minutes(f64::from(seconds)),
        },
    )))
}
