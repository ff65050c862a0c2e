use meetpoint_core::{RankBy, TransportMode, VenueCategory};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

pub const DEFAULT_RADIUS_METERS: u32 = 5_000;
pub const MAX_RADIUS_METERS: u32 = 50_000;
pub const MAX_BUDGET_MINUTES: u32 = 240;

/// Parameters of one "find meeting places" run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindRequest {
    #[serde(default)]
    pub mode: TransportMode,
    /// Maximum acceptable one-way travel time for every origin.
    pub budget_minutes: u32,
    #[serde(default)]
    pub category: VenueCategory,
    #[serde(default)]
    pub rank_by: RankBy,
    #[serde(default = "default_radius")]
    pub radius_meters: u32,
    #[serde(default)]
    pub keyword: String,
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS_METERS
}

impl FindRequest {
    #[must_use]
    pub fn new(
        mode: TransportMode,
        budget_minutes: u32,
        category: VenueCategory,
        rank_by: RankBy,
    ) -> Self {
        Self {
            mode,
            budget_minutes,
            category,
            rank_by,
            radius_meters: DEFAULT_RADIUS_METERS,
            keyword: String::new(),
        }
    }

    #[must_use]
    pub fn budget_seconds(&self) -> u32 {
        self.budget_minutes.saturating_mul(60)
    }

    /// # Errors
    ///
    /// Returns [`PlanError::InvalidRequest`] when the budget or radius is
    /// outside the accepted range.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.budget_minutes == 0 || self.budget_minutes > MAX_BUDGET_MINUTES {
            return Err(PlanError::InvalidRequest(format!(
                "budget_minutes must be between 1 and {MAX_BUDGET_MINUTES}, got {}",
                self.budget_minutes
            )));
        }
        if self.radius_meters == 0 || self.radius_meters > MAX_RADIUS_METERS {
            return Err(PlanError::InvalidRequest(format!(
                "radius_meters must be between 1 and {MAX_RADIUS_METERS}, got {}",
                self.radius_meters
            )));
        }
        Ok(())
    }
}
