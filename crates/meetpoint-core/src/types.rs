//! Domain types shared by every meetpoint crate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// A WGS-84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within `[-90, 90]` x `[-180, 180]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }

    /// Map SDKs report `0` on an axis for a click that never resolved.
    #[must_use]
    pub fn is_unresolved_click(&self) -> bool {
        self.lat == 0.0 || self.lng == 0.0
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] if [`Point::is_valid`] fails.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoreError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    /// Both coordinate deltas strictly below `epsilon` degrees.
    #[must_use]
    pub fn is_near(&self, other: &Point, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() < epsilon && (self.lng - other.lng).abs() < epsilon
    }

    /// `"lng,lat"` with six decimals, the order AMap expects.
    #[must_use]
    pub fn to_lng_lat(&self) -> String {
        format!("{:.6},{:.6}", self.lng, self.lat)
    }
}

/// A resolved place: coordinates plus a human-readable address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Location {
    pub fn new(lat: f64, lng: f64, address: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            address: address.into(),
        }
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

/// One of a user's candidate starting points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub owner_id: String,
    pub is_primary: bool,
}

impl Origin {
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

/// Output of forward geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

impl From<GeocodedAddress> for Location {
    fn from(g: GeocodedAddress) -> Self {
        Self {
            lat: g.lat,
            lng: g.lng,
            address: g.formatted_address,
        }
    }
}

/// A venue returned by the place-search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Provider-assigned identifier; the identity used for de-duplication.
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Point,
    /// Provider category label, e.g. `"餐饮服务;中餐厅;火锅店"`.
    pub category: String,
    /// Distance in meters from the searched point, when the provider reports it.
    pub distance: Option<u32>,
}

/// One row of a member's stored location list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLocation {
    pub user_id: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub is_primary: bool,
    /// Zero-based order within the owner's list.
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

impl StoredLocation {
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

/// Explicit request context: which team, and who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub team_id: Uuid,
    pub user_id: String,
}

impl Session {
    pub fn new(team_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            team_id,
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Driving,
    Transit,
    Walking,
}

impl TransportMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Transit => "transit",
            Self::Walking => "walking",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(Self::Driving),
            "transit" | "bus" | "public" => Ok(Self::Transit),
            "walking" | "walk" => Ok(Self::Walking),
            other => Err(CoreError::InvalidTransportMode(other.to_string())),
        }
    }
}

/// Ranking criterion for feasible venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    /// Minimize the worst traveler's time.
    #[default]
    Max,
    /// Minimize the group's average time.
    Avg,
}

impl RankBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Avg => "avg",
        }
    }
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Self::Max),
            "avg" | "average" => Ok(Self::Avg),
            other => Err(CoreError::InvalidRankBy(other.to_string())),
        }
    }
}

/// A six-digit AMap POI type code, e.g. `"050000"` for dining.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VenueCategory(String);

/// Named categories offered to users, keyed by POI type code.
pub const KNOWN_CATEGORIES: &[(&str, &str)] = &[
    ("050000", "dining"),
    ("080000", "entertainment"),
    ("100000", "shopping"),
    ("110000", "hotel"),
    ("120000", "sightseeing"),
];

impl VenueCategory {
    /// Accepts either a six-digit code or one of the names in
    /// [`KNOWN_CATEGORIES`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCategory`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if raw.len() == 6 && raw.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self(raw.to_string()));
        }
        KNOWN_CATEGORIES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(raw))
            .map(|(code, _)| Self((*code).to_string()))
            .ok_or_else(|| CoreError::InvalidCategory(raw.to_string()))
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        KNOWN_CATEGORIES
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, name)| *name)
    }
}

impl Default for VenueCategory {
    fn default() -> Self {
        Self("050000".to_string())
    }
}

impl fmt::Display for VenueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VenueCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VenueCategory {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VenueCategory> for String {
    fn from(value: VenueCategory) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_validity_rejects_out_of_range_and_nan() {
        assert!(Point::new(31.23, 121.47).is_valid());
        assert!(Point::new(0.0, 0.0).is_valid());
        assert!(!Point::new(91.0, 121.47).is_valid());
        assert!(!Point::new(31.23, -180.5).is_valid());
        assert!(!Point::new(f64::NAN, 121.47).is_valid());
    }

    #[test]
    fn zero_on_either_axis_is_an_unresolved_click() {
        assert!(Point::new(0.0, 121.47).is_unresolved_click());
        assert!(Point::new(31.23, 0.0).is_unresolved_click());
        assert!(!Point::new(31.23, 121.47).is_unresolved_click());
    }

    #[test]
    fn is_near_requires_both_deltas_below_epsilon() {
        let a = Point::new(31.0, 121.0);
        assert!(a.is_near(&Point::new(31.000_05, 121.000_05), 1e-4));
        assert!(!a.is_near(&Point::new(31.000_05, 121.000_2), 1e-4));
        assert!(!a.is_near(&Point::new(31.000_2, 121.0), 1e-4));
    }

    #[test]
    fn lng_lat_string_puts_longitude_first() {
        let p = Point::new(31.5, 121.25);
        assert_eq!(p.to_lng_lat(), "121.250000,31.500000");
    }

    #[test]
    fn transport_mode_parses_aliases() {
        assert_eq!("Driving".parse::<TransportMode>(), Ok(TransportMode::Driving));
        assert_eq!("bus".parse::<TransportMode>(), Ok(TransportMode::Transit));
        assert_eq!("walk".parse::<TransportMode>(), Ok(TransportMode::Walking));
        assert!("teleport".parse::<TransportMode>().is_err());
    }

    #[test]
    fn rank_by_parses_and_displays() {
        assert_eq!("avg".parse::<RankBy>(), Ok(RankBy::Avg));
        assert_eq!(RankBy::Max.to_string(), "max");
        assert!("median".parse::<RankBy>().is_err());
    }

    #[test]
    fn venue_category_accepts_codes_and_names() {
        assert_eq!(VenueCategory::parse("080000").unwrap().code(), "080000");
        let hotel = VenueCategory::parse("Hotel").unwrap();
        assert_eq!(hotel.code(), "110000");
        assert_eq!(hotel.label(), Some("hotel"));
        assert_eq!(VenueCategory::default().label(), Some("dining"));
        assert!(VenueCategory::parse("05000x").is_err());
        assert!(VenueCategory::parse("bowling").is_err());
    }

    #[test]
    fn venue_category_serde_round_trips_through_code() {
        let json = serde_json::to_string(&VenueCategory::parse("dining").unwrap()).unwrap();
        assert_eq!(json, "\"050000\"");
        let back: VenueCategory = serde_json::from_str("\"shopping\"").unwrap();
        assert_eq!(back.code(), "100000");
    }

    #[test]
    fn transport_mode_serializes_lowercase() {
        let json = serde_json::to_string(&TransportMode::Transit).unwrap();
        assert_eq!(json, "\"transit\"");
    }
}
