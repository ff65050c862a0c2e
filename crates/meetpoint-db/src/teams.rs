//! Database operations for the `teams` table.

use chrono::{DateTime, Utc};
use meetpoint_core::generate_invite_code;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Fresh codes tried before giving up on a collision streak.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// A row from the `teams` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Creates a team with a freshly generated invite code.
///
/// A code that collides with an existing team is discarded and a new one
/// drawn, up to a small fixed number of attempts.
///
/// # Errors
///
/// Returns [`DbError::InviteCodeExhausted`] if every attempt collided, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_team(pool: &PgPool, name: &str, created_by: &str) -> Result<TeamRow, DbError> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = generate_invite_code();
        let row = sqlx::query_as::<_, TeamRow>(
            "INSERT INTO teams (id, name, code, created_by) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (code) DO NOTHING \
             RETURNING id, name, code, created_by, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(&code)
        .bind(created_by)
        .fetch_optional(pool)
        .await?;

        if let Some(team) = row {
            return Ok(team);
        }
        tracing::debug!(attempt, code = %code, "invite code collision; retrying");
    }
    Err(DbError::InviteCodeExhausted {
        attempts: MAX_CODE_ATTEMPTS,
    })
}

/// Returns the team with `code`, or `None` if not found.
///
/// `code` must already be normalized (see `meetpoint_core::normalize_invite_code`).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_team_by_code(pool: &PgPool, code: &str) -> Result<Option<TeamRow>, DbError> {
    let row = sqlx::query_as::<_, TeamRow>(
        "SELECT id, name, code, created_by, created_at FROM teams WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// A team with the number of members that have stored at least one location.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamSummaryRow {
    #[sqlx(flatten)]
    pub team: TeamRow,
    pub member_count: i64,
}

const SUMMARY_COLUMNS: &str = "SELECT t.id, t.name, t.code, t.created_by, t.created_at, \
     (SELECT COUNT(DISTINCT m.user_id) FROM member_locations m WHERE m.team_id = t.id) \
         AS member_count \
     FROM teams t";

/// Returns the team with `team_id` and its member count, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_team(pool: &PgPool, team_id: Uuid) -> Result<Option<TeamSummaryRow>, DbError> {
    let row = sqlx::query_as::<_, TeamSummaryRow>(&format!("{SUMMARY_COLUMNS} WHERE t.id = $1"))
        .bind(team_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Teams in which `user_id` has stored a location, newest team first.
///
/// Membership is implied by location rows; creating a team does not make
/// the creator a member until they save a location in it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_member_teams(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<TeamSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, TeamSummaryRow>(&format!(
        "{SUMMARY_COLUMNS} \
         WHERE t.id IN (SELECT DISTINCT team_id FROM member_locations WHERE user_id = $1) \
         ORDER BY t.created_at DESC, t.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
