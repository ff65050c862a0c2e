//! Boundary traits for the external services the planner orchestrates.
//!
//! Implementations live in `meetpoint-amap` (geocoding, place search,
//! routing) and `meetpoint-db` (location store). Tests use in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{GeocodedAddress, Point, StoredLocation, TransportMode, Venue, VenueCategory};

/// Failure of a geocode, search, or travel-time call.
///
/// The planner recovers from these locally (zero results for search, a
/// budget-equal sample for travel time); only direct proxy calls surface
/// them to users.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider rejected the request: {0}")]
    Rejected(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("no route between the requested points")]
    NoRoute,

    #[error("no match for {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("team {0} not found")]
    TeamNotFound(Uuid),

    #[error("location store failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves free text to coordinates.
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, ProviderError>;

    /// Resolves a map click to a formatted address.
    async fn reverse_geocode(&self, point: Point) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_nearby(
        &self,
        center: Point,
        category: &VenueCategory,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<Venue>, ProviderError>;
}

#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    /// One-way travel time in seconds.
    async fn travel_time(
        &self,
        origin: Point,
        destination: Point,
        mode: TransportMode,
    ) -> Result<u32, ProviderError>;
}

/// A new row for [`LocationStore::replace_all`]; list order becomes `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStoredLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub is_primary: bool,
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Replaces every stored location of `user_id` within `team_id`.
    async fn replace_all(
        &self,
        team_id: Uuid,
        user_id: &str,
        locations: &[NewStoredLocation],
    ) -> Result<(), StoreError>;

    /// Snapshot of every member's stored locations in the team.
    async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<StoredLocation>, StoreError>;
}
