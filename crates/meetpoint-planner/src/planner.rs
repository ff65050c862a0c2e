//! The "find meeting places" run.

use std::sync::Arc;

use meetpoint_core::{
    LocationSet, LocationStore, PlaceSearch, Session, StoredLocation, TravelTimeProvider,
};
use serde::Serialize;

use crate::collect::{collect_candidates, CollectOutcome};
use crate::error::PlanError;
use crate::matrix::build_matrix;
use crate::origins::assemble_origins;
use crate::rank::{evaluate, top_results, RankedResult};
use crate::request::FindRequest;

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Result of a run that had at least one origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FindOutcome {
    /// No venue was found near any origin.
    NoCandidates,
    /// Venues were found but none is reachable by everyone within budget.
    NoneWithinBudget { considered: usize },
    Found {
        /// Best results first, at most [`crate::RESULTS_CAP`].
        results: Vec<RankedResult>,
        total_feasible: usize,
        considered: usize,
    },
}

impl FindOutcome {
    /// A user-facing line describing the outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NoCandidates => {
                "No venues found near anyone. Try another category or a wider radius.".to_string()
            }
            Self::NoneWithinBudget { considered } => format!(
                "None of the {considered} venues found is reachable by everyone in time. Try raising the time budget."
            ),
            Self::Found {
                results,
                total_feasible,
                ..
            } => format!(
                "Showing {} of {total_feasible} venues everyone can reach in time.",
                results.len()
            ),
        }
    }

    #[must_use]
    pub fn results(&self) -> &[RankedResult] {
        match self {
            Self::Found { results, .. } => results,
            _ => &[],
        }
    }
}

/// Wires collection, the travel matrix, and ranking together.
#[derive(Clone)]
pub struct MeetingPlanner {
    places: Arc<dyn PlaceSearch>,
    travel: Arc<dyn TravelTimeProvider>,
    store: Arc<dyn LocationStore>,
    max_concurrency: usize,
}

impl MeetingPlanner {
    pub fn new(
        places: Arc<dyn PlaceSearch>,
        travel: Arc<dyn TravelTimeProvider>,
        store: Arc<dyn LocationStore>,
    ) -> Self {
        Self {
            places,
            travel,
            store,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Caps in-flight provider calls per fan-out; `0` is treated as `1`.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Finds venues every origin can reach within the request's budget.
    ///
    /// Origins are all of `own` plus the last stored location of every other
    /// member of the session's team.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidRequest`] if the request fails validation.
    /// - [`PlanError::NoOrigins`] if nobody has a usable location.
    /// - [`PlanError::Store`] if team locations cannot be read.
    pub async fn find(
        &self,
        session: &Session,
        own: &LocationSet,
        request: &FindRequest,
    ) -> Result<FindOutcome, PlanError> {
        request.validate()?;
        let team_rows = self.store.list_by_team(session.team_id).await?;
        self.plan(session, own, &team_rows, request).await
    }

    /// Like [`MeetingPlanner::find`], with the requester's own origins taken
    /// from the same team read as everyone else's.
    ///
    /// # Errors
    ///
    /// See [`MeetingPlanner::find`].
    pub async fn find_for_member(
        &self,
        session: &Session,
        request: &FindRequest,
    ) -> Result<FindOutcome, PlanError> {
        request.validate()?;
        let team_rows = self.store.list_by_team(session.team_id).await?;
        let own = LocationSet::from_stored(session.user_id.clone(), &team_rows);
        self.plan(session, &own, &team_rows, request).await
    }

    async fn plan(
        &self,
        session: &Session,
        own: &LocationSet,
        team_rows: &[StoredLocation],
        request: &FindRequest,
    ) -> Result<FindOutcome, PlanError> {
        let origins = assemble_origins(session, own, team_rows);
        if origins.is_empty() {
            return Err(PlanError::NoOrigins);
        }

        let candidates = match collect_candidates(
            self.places.as_ref(),
            &origins,
            &request.category,
            request.radius_meters,
            &request.keyword,
            self.max_concurrency,
        )
        .await
        {
            CollectOutcome::Candidates(found) => found,
            CollectOutcome::NoCandidates => {
                tracing::info!(
                    team_id = %session.team_id,
                    user_id = %session.user_id,
                    origins = origins.len(),
                    category = %request.category,
                    "find run found no candidates"
                );
                return Ok(FindOutcome::NoCandidates);
            }
        };
        let considered = candidates.len();

        let budget_seconds = request.budget_seconds();
        let matrix = build_matrix(
            self.travel.as_ref(),
            &origins,
            candidates,
            request.mode,
            budget_seconds,
            self.max_concurrency,
        )
        .await;
        let ranked = evaluate(matrix, budget_seconds, request.rank_by);
        let total_feasible = ranked.len();

        tracing::info!(
            team_id = %session.team_id,
            user_id = %session.user_id,
            origins = origins.len(),
            considered,
            feasible = total_feasible,
            mode = %request.mode,
            rank_by = %request.rank_by,
            budget_minutes = request.budget_minutes,
            "find run complete"
        );

        if ranked.is_empty() {
            return Ok(FindOutcome::NoneWithinBudget { considered });
        }
        Ok(FindOutcome::Found {
            results: top_results(ranked),
            total_feasible,
            considered,
        })
    }
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;
