pub mod app_config;
pub mod config;
pub mod invite;
pub mod location_set;
pub mod provider;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use invite::{generate_invite_code, normalize_invite_code, INVITE_CODE_LEN};
pub use location_set::{LocationSet, PROXIMITY_EPSILON_DEG};
pub use provider::{
    Geocoder, LocationStore, NewStoredLocation, PlaceSearch, ProviderError, StoreError, TravelTimeProvider,
};
pub use types::{
    GeocodedAddress, Location, Origin, Point, RankBy, Session, StoredLocation, TransportMode,
    Venue, VenueCategory,
};

use thiserror::Error;

/// Errors raised by the pure domain layer.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("a location within {epsilon}° of ({lat}, {lng}) is already in the set")]
    DuplicateLocation { lat: f64, lng: f64, epsilon: f64 },

    #[error("index {index} is out of range for a set of {len} locations")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("invalid transport mode: {0}")]
    InvalidTransportMode(String),

    #[error("invalid ranking criterion: {0}")]
    InvalidRankBy(String),

    #[error("invalid venue category: {0}")]
    InvalidCategory(String),

    #[error("invalid invite code: {0}")]
    InvalidInviteCode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
