mod find;
mod locations;
mod provider;
mod teams;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use meetpoint_core::{Geocoder, LocationStore, PlaceSearch, ProviderError, StoreError, TravelTimeProvider};
use meetpoint_planner::MeetingPlanner;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId, REQUEST_ID_HEADER};

/// Shared handler state.
///
/// Team routes go straight to Postgres through `pool`; location, find, and
/// provider routes only see the trait objects.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub store: Arc<dyn LocationStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub places: Arc<dyn PlaceSearch>,
    pub travel: Arc<dyn TravelTimeProvider>,
    pub planner: MeetingPlanner,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "no_origins" => StatusCode::UNPROCESSABLE_ENTITY,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &meetpoint_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_store_error(request_id: &str, error: &StoreError) -> ApiError {
    match error {
        StoreError::TeamNotFound(team_id) => {
            ApiError::new(request_id, "not_found", format!("team {team_id} not found"))
        }
        StoreError::Backend(source) => {
            tracing::error!(error = %source, "location store failure");
            ApiError::new(request_id, "internal_error", "location store failure")
        }
    }
}

pub(super) fn map_provider_error(request_id: &str, error: &ProviderError) -> ApiError {
    match error {
        ProviderError::NotFound(_) | ProviderError::NoRoute => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
        _ => {
            tracing::warn!(error = %error, "map provider call failed");
            ApiError::new(request_id, "upstream_error", error.to_string())
        }
    }
}

/// Rejects blank path identifiers before they reach the store.
pub(super) fn require_user_id(request_id: &str, user_id: &str) -> Result<String, ApiError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "user_id must not be blank",
        ));
    }
    Ok(trimmed.to_owned())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/teams", post(teams::create_team))
        .route("/api/v1/teams/join", post(teams::join_team))
        .route("/api/v1/teams/{team_id}", get(teams::get_team))
        .route("/api/v1/members/{user_id}/teams", get(teams::list_member_teams))
        .route(
            "/api/v1/teams/{team_id}/locations",
            get(teams::list_team_locations),
        )
        .route(
            "/api/v1/teams/{team_id}/members/{user_id}/locations",
            get(locations::get_member_locations)
                .put(locations::replace_member_locations)
                .delete(locations::clear_member_locations),
        )
        .route(
            "/api/v1/teams/{team_id}/members/{user_id}/find",
            post(find::find_meeting_places),
        )
        .route("/api/v1/geocode", post(provider::geocode))
        .route("/api/v1/search-nearby", post(provider::search_nearby))
        .route("/api/v1/direction", post(provider::direction))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match meetpoint_db::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
