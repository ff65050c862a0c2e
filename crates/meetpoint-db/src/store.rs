//! Postgres-backed [`LocationStore`].

use async_trait::async_trait;
use meetpoint_core::{LocationStore, NewStoredLocation, StoreError, StoredLocation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::member_locations::{list_team_locations, replace_member_locations};
use crate::DbError;

/// Postgres `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_store_error(team_id: Uuid, err: DbError) -> StoreError {
    if let DbError::Sqlx(sqlx::Error::Database(db)) = &err {
        if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return StoreError::TeamNotFound(team_id);
        }
    }
    StoreError::Backend(Box::new(err))
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn replace_all(
        &self,
        team_id: Uuid,
        user_id: &str,
        locations: &[NewStoredLocation],
    ) -> Result<(), StoreError> {
        let inserted = replace_member_locations(&self.pool, team_id, user_id, locations)
            .await
            .map_err(|e| to_store_error(team_id, e))?;
        tracing::debug!(%team_id, user_id, inserted, "replaced member locations");
        Ok(())
    }

    async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<StoredLocation>, StoreError> {
        let rows = list_team_locations(&self.pool, team_id)
            .await
            .map_err(|e| to_store_error(team_id, e))?;
        Ok(rows.into_iter().map(StoredLocation::from).collect())
    }
}
