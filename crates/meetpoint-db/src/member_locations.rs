//! Database operations for the `member_locations` table.

use chrono::{DateTime, Utc};
use meetpoint_core::{NewStoredLocation, StoredLocation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `member_locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberLocationRow {
    pub id: i64,
    pub team_id: Uuid,
    pub user_id: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub is_primary: bool,
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberLocationRow> for StoredLocation {
    fn from(row: MemberLocationRow) -> Self {
        Self {
            user_id: row.user_id,
            lat: row.lat,
            lng: row.lng,
            address: row.address,
            is_primary: row.is_primary,
            position: row.position,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, team_id, user_id, lat, lng, address, is_primary, position, updated_at \
     FROM member_locations";

/// Replaces every stored location of `user_id` in `team_id` with `locations`.
///
/// Delete and insert run in one transaction, so readers see either the old
/// list or the new one. List order becomes `position`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails; the transaction is
/// rolled back.
pub async fn replace_member_locations(
    pool: &PgPool,
    team_id: Uuid,
    user_id: &str,
    locations: &[NewStoredLocation],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM member_locations WHERE team_id = $1 AND user_id = $2")
        .bind(team_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let mut inserted = 0;
    if !locations.is_empty() {
        let mut lats: Vec<f64> = Vec::with_capacity(locations.len());
        let mut lngs: Vec<f64> = Vec::with_capacity(locations.len());
        let mut addresses: Vec<String> = Vec::with_capacity(locations.len());
        let mut primaries: Vec<bool> = Vec::with_capacity(locations.len());
        let mut positions: Vec<i32> = Vec::with_capacity(locations.len());

        for (i, loc) in locations.iter().enumerate() {
            lats.push(loc.lat);
            lngs.push(loc.lng);
            addresses.push(loc.address.clone());
            primaries.push(loc.is_primary);
            positions.push(i32::try_from(i).unwrap_or(i32::MAX));
        }

        inserted = sqlx::query(
            "INSERT INTO member_locations \
                 (team_id, user_id, lat, lng, address, is_primary, position) \
             SELECT $1, $2, * FROM UNNEST(\
                 $3::float8[], $4::float8[], $5::text[], $6::bool[], $7::int4[])",
        )
        .bind(team_id)
        .bind(user_id)
        .bind(&lats)
        .bind(&lngs)
        .bind(&addresses)
        .bind(&primaries)
        .bind(&positions)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Every member's stored locations in `team_id`, ordered by user then position.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_team_locations(
    pool: &PgPool,
    team_id: Uuid,
) -> Result<Vec<MemberLocationRow>, DbError> {
    let rows = sqlx::query_as::<_, MemberLocationRow>(&format!(
        "{SELECT_COLUMNS} WHERE team_id = $1 ORDER BY user_id, position"
    ))
    .bind(team_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
