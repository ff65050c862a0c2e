//! Wire types for the AMap v3 web service API.
//!
//! AMap encodes numbers as strings, coordinates as `"lng,lat"`, and empty
//! text fields as `[]`; the raw structs keep those shapes and the client
//! converts them into core types.

use meetpoint_core::Point;
use serde::{Deserialize, Deserializer, Serialize};

/// Common envelope fields present on every response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub infocode: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceAroundResponse {
    #[serde(default)]
    pub pois: Vec<RawPoi>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPoi {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub location: String,
    #[serde(default, rename = "type", deserialize_with = "text_or_empty")]
    pub kind: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub distance: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub geocodes: Vec<RawGeocode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGeocode {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub formatted_address: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegeoResponse {
    pub regeocode: Option<RawRegeocode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRegeocode {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub formatted_address: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionResponse {
    pub route: Option<RawRoute>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRoute {
    /// Driving and walking.
    #[serde(default)]
    pub paths: Vec<RawLeg>,
    /// Transit.
    #[serde(default)]
    pub transits: Vec<RawLeg>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLeg {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub duration: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub distance: String,
}

/// First route returned for a direction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub seconds: u32,
    pub meters: u32,
}

/// Accepts a string, a number, or AMap's `[]` placeholder for "no value".
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Parses AMap's `"lng,lat"` coordinate string.
pub(crate) fn parse_lng_lat(raw: &str) -> Option<Point> {
    let (lng, lat) = raw.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    Some(Point::new(lat, lng))
}
