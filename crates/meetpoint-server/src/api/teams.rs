//! Team creation, joining by invite code, team lookups, and the team-wide
//! location view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use meetpoint_core::{normalize_invite_code, StoredLocation};
use meetpoint_db::{TeamRow, TeamSummaryRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, map_store_error, require_user_id, ApiError, ApiResponse, AppState};

const MAX_TEAM_NAME_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
pub(super) struct CreateTeamRequest {
    pub name: String,
    pub created_by: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct JoinTeamRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TeamItem {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<TeamRow> for TeamItem {
    fn from(row: TeamRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct TeamSummaryItem {
    #[serde(flatten)]
    pub team: TeamItem,
    /// Members with at least one stored location.
    pub member_count: i64,
}

impl From<TeamSummaryRow> for TeamSummaryItem {
    fn from(row: TeamSummaryRow) -> Self {
        Self {
            team: TeamItem::from(row.team),
            member_count: row.member_count,
        }
    }
}

/// POST /api/v1/teams
pub(super) async fn create_team(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeamItem>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > MAX_TEAM_NAME_CHARS {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("name must be 1-{MAX_TEAM_NAME_CHARS} characters"),
        ));
    }
    let created_by = body.created_by.trim();
    if created_by.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "created_by must not be blank",
        ));
    }

    let team = meetpoint_db::create_team(&state.pool, name, created_by)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(team_id = %team.id, created_by, "team created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, TeamItem::from(team))),
    ))
}

/// POST /api/v1/teams/join
pub(super) async fn join_team(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<JoinTeamRequest>,
) -> Result<Json<ApiResponse<TeamItem>>, ApiError> {
    let rid = &req_id.0;

    let code = normalize_invite_code(&body.code)
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let team = meetpoint_db::get_team_by_code(&state.pool, &code)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("no team with code {code}")))?;

    Ok(Json(ApiResponse::new(req_id.0, TeamItem::from(team))))
}

/// GET /api/v1/teams/{team_id}
pub(super) async fn get_team(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TeamSummaryItem>>, ApiError> {
    let rid = &req_id.0;
    let team = meetpoint_db::get_team(&state.pool, team_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("team {team_id} not found")))?;

    Ok(Json(ApiResponse::new(req_id.0, TeamSummaryItem::from(team))))
}

/// GET /api/v1/members/{user_id}/teams
///
/// Teams in which the user has stored a location.
pub(super) async fn list_member_teams(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<TeamSummaryItem>>>, ApiError> {
    let rid = &req_id.0;
    let user_id = require_user_id(rid, &user_id)?;
    let teams = meetpoint_db::list_member_teams(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        teams.into_iter().map(TeamSummaryItem::from).collect(),
    )))
}

/// GET /api/v1/teams/{team_id}/locations
pub(super) async fn list_team_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<StoredLocation>>>, ApiError> {
    let rows = state
        .store
        .list_by_team(team_id)
        .await
        .map_err(|e| map_store_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse::new(req_id.0, rows)))
}
