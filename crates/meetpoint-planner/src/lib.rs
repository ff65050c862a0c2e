//! Meeting-place planning: candidate collection, travel matrix, feasibility
//! ranking, and the orchestration that ties them to a team's locations.

pub mod collect;
pub mod error;
pub mod locations;
pub mod matrix;
pub mod origins;
pub mod planner;
pub mod rank;
pub mod request;

#[cfg(test)]
mod test_support;

pub use collect::{collect_candidates, Candidate, CollectOutcome};
pub use error::{ManagerError, PlanError};
pub use locations::{
    locate_address, resolve_point, resolve_typed_point, PersistedLocations, UNKNOWN_ADDRESS,
};
pub use matrix::{build_matrix, CandidateSamples, TravelSample};
pub use origins::{assemble_origins, RunOrigin};
pub use planner::{FindOutcome, MeetingPlanner, DEFAULT_MAX_CONCURRENCY};
pub use rank::{evaluate, seconds_to_minutes, top_results, RankedResult, RESULTS_CAP};
pub use request::{FindRequest, DEFAULT_RADIUS_METERS, MAX_BUDGET_MINUTES, MAX_RADIUS_METERS};
