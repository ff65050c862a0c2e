//! A member's own location list: read, replace, clear.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use meetpoint_core::{CoreError, Location, LocationSet, Session};
use meetpoint_planner::{ManagerError, PersistedLocations};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_store_error, require_user_id, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ReplaceLocationsRequest {
    pub locations: Vec<Location>,
    /// Index into `locations`; defaults to the first entry.
    #[serde(default)]
    pub primary: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct MemberLocations {
    pub user_id: String,
    pub primary_index: Option<usize>,
    pub locations: Vec<Location>,
}

impl From<&LocationSet> for MemberLocations {
    fn from(set: &LocationSet) -> Self {
        Self {
            user_id: set.owner_id().to_owned(),
            primary_index: set.primary_index(),
            locations: set.entries().to_vec(),
        }
    }
}

pub(super) fn map_manager_error(request_id: &str, error: &ManagerError) -> ApiError {
    match error {
        ManagerError::Location(e @ CoreError::DuplicateLocation { .. }) => {
            ApiError::new(request_id, "conflict", e.to_string())
        }
        ManagerError::Location(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        ManagerError::Store(e) => map_store_error(request_id, e),
    }
}

/// GET /api/v1/teams/{team_id}/members/{user_id}/locations
pub(super) async fn get_member_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((team_id, user_id)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<MemberLocations>>, ApiError> {
    let rid = &req_id.0;
    let user_id = require_user_id(rid, &user_id)?;

    let persisted = PersistedLocations::load(Session::new(team_id, user_id), state.store.clone())
        .await
        .map_err(|e| map_manager_error(rid, &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        MemberLocations::from(persisted.set()),
    )))
}

/// PUT /api/v1/teams/{team_id}/members/{user_id}/locations
///
/// The body replaces the whole list. Entries are validated in order exactly
/// as individual adds would be; any rejection leaves the stored list as it was.
pub(super) async fn replace_member_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((team_id, user_id)): Path<(Uuid, String)>,
    Json(body): Json<ReplaceLocationsRequest>,
) -> Result<Json<ApiResponse<MemberLocations>>, ApiError> {
    let rid = &req_id.0;
    let user_id = require_user_id(rid, &user_id)?;
    let session = Session::new(team_id, user_id.clone());

    let mut persisted =
        PersistedLocations::new(session, LocationSet::new(user_id), state.store.clone());
    persisted
        .replace_with(body.locations, body.primary)
        .await
        .map_err(|e| map_manager_error(rid, &e))?;

    tracing::info!(
        %team_id,
        user_id = persisted.session().user_id.as_str(),
        count = persisted.set().len(),
        "member locations replaced"
    );

    Ok(Json(ApiResponse::new(
        req_id.0,
        MemberLocations::from(persisted.set()),
    )))
}

/// DELETE /api/v1/teams/{team_id}/members/{user_id}/locations
pub(super) async fn clear_member_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((team_id, user_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    let rid = &req_id.0;
    let user_id = require_user_id(rid, &user_id)?;
    let session = Session::new(team_id, user_id.clone());

    PersistedLocations::new(session, LocationSet::new(user_id), state.store.clone())
        .clear()
        .await
        .map_err(|e| map_manager_error(rid, &e))?;

    Ok(StatusCode::NO_CONTENT)
}
