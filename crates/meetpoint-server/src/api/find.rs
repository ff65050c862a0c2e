use axum::{
    extract::{Path, State},
    Extension, Json,
};
use meetpoint_core::Session;
use meetpoint_planner::{FindOutcome, FindRequest, PlanError, RankedResult};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_store_error, require_user_id, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct FindResponse {
    pub status: &'static str,
    pub message: String,
    pub results: Vec<RankedResult>,
    pub total_feasible: usize,
    pub considered: usize,
}

impl From<FindOutcome> for FindResponse {
    fn from(outcome: FindOutcome) -> Self {
        let message = outcome.message();
        match outcome {
            FindOutcome::NoCandidates => Self {
                status: "no_candidates",
                message,
                results: Vec::new(),
                total_feasible: 0,
                considered: 0,
            },
            FindOutcome::NoneWithinBudget { considered } => Self {
                status: "none_within_budget",
                message,
                results: Vec::new(),
                total_feasible: 0,
                considered,
            },
            FindOutcome::Found {
                results,
                total_feasible,
                considered,
            } => Self {
                status: "found",
                message,
                results,
                total_feasible,
                considered,
            },
        }
    }
}

fn map_plan_error(request_id: &str, error: &PlanError) -> ApiError {
    match error {
        PlanError::NoOrigins => ApiError::new(request_id, "no_origins", error.to_string()),
        PlanError::InvalidRequest(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        PlanError::Store(e) => map_store_error(request_id, e),
    }
}

/// POST /api/v1/teams/{team_id}/members/{user_id}/find
///
/// Origins are the caller's stored list plus the latest location of every
/// other member of the team.
pub(super) async fn find_meeting_places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((team_id, user_id)): Path<(Uuid, String)>,
    Json(request): Json<FindRequest>,
) -> Result<Json<ApiResponse<FindResponse>>, ApiError> {
    let rid = &req_id.0;
    let user_id = require_user_id(rid, &user_id)?;
    let session = Session::new(team_id, user_id);

    let outcome = state
        .planner
        .find_for_member(&session, &request)
        .await
        .map_err(|e| map_plan_error(rid, &e))?;

    Ok(Json(ApiResponse::new(req_id.0, FindResponse::from(outcome))))
}
