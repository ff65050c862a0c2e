//! HTTP client for the AMap v3 web service API.
//!
//! Every response is checked for `"status": "1"`; failures surface as
//! [`AmapError::Api`]. Transient failures (network, 5xx, QPS limits) are
//! retried with back-off.

use std::time::Duration;

use meetpoint_core::{AppConfig, GeocodedAddress, Point, TransportMode, Venue, VenueCategory};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::AmapError;
use crate::retry::retry_with_backoff;
use crate::types::{
    parse_lng_lat, DirectionResponse, Envelope, GeocodeResponse, PlaceAroundResponse, RawLeg,
    RegeoResponse, Route,
};

const DEFAULT_BASE_URL: &str = "https://restapi.amap.com";
const DEFAULT_TRANSIT_CITY: &str = "全国";
/// Results requested per nearby search.
pub const NEARBY_PAGE_SIZE: u32 = 30;

/// Client for the AMap web service API.
///
/// Use [`AmapClient::new`] for production or [`AmapClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct AmapClient {
    client: Client,
    key: String,
    base_url: Url,
    transit_city: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl AmapClient {
    /// # Errors
    ///
    /// Returns [`AmapError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(key: &str, timeout_secs: u64) -> Result<Self, AmapError> {
        Self::with_base_url(key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`AmapError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`AmapError::Config`] if `base_url` is not a valid URL.
    pub fn with_base_url(key: &str, timeout_secs: u64, base_url: &str) -> Result<Self, AmapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("meetpoint/0.1")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| AmapError::Config(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            key: key.to_owned(),
            base_url,
            transit_city: DEFAULT_TRANSIT_CITY.to_owned(),
            max_retries: 2,
            backoff_base_ms: 500,
        })
    }

    /// Builds a client from the application's provider settings.
    ///
    /// # Errors
    ///
    /// See [`AmapClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AmapError> {
        Ok(Self::with_base_url(
            &config.amap_key,
            config.provider_timeout_secs,
            &config.amap_base_url,
        )?
        .with_retry(config.provider_max_retries, config.provider_backoff_base_ms)
        .with_transit_city(&config.transit_city))
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// City used to scope transit routing.
    #[must_use]
    pub fn with_transit_city(mut self, city: &str) -> Self {
        city.clone_into(&mut self.transit_city);
        self
    }

    /// Venues of `category` within `radius_meters` of `center`.
    ///
    /// POIs without a parseable location are skipped.
    ///
    /// # Errors
    ///
    /// - [`AmapError::Api`] if AMap rejects the request.
    /// - [`AmapError::Http`] on network failure or non-2xx status.
    /// - [`AmapError::Deserialize`] if the body has an unexpected shape.
    pub async fn search_nearby(
        &self,
        center: Point,
        category: &VenueCategory,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<Venue>, AmapError> {
        let location = center.to_lng_lat();
        let radius = radius_meters.to_string();
        let offset = NEARBY_PAGE_SIZE.to_string();
        let response: PlaceAroundResponse = self
            .get(
                "v3/place/around",
                &[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("types", category.code()),
                    ("keywords", keyword),
                    ("offset", offset.as_str()),
                    ("page", "1"),
                    ("extensions", "base"),
                ],
            )
            .await?;

        let venues = response
            .pois
            .into_iter()
            .filter_map(|poi| {
                let Some(location) = parse_lng_lat(&poi.location) else {
                    tracing::debug!(poi = %poi.id, raw = %poi.location, "skipping POI without location");
                    return None;
                };
                Some(Venue {
                    id: poi.id,
                    name: poi.name,
                    address: poi.address,
                    location,
                    category: poi.kind,
                    distance: poi.distance.parse().ok(),
                })
            })
            .collect();
        Ok(venues)
    }

    /// The first route AMap proposes from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// - [`AmapError::NoRoute`] if AMap returns no path or transit plan.
    /// - [`AmapError::Malformed`] if the duration is not a number.
    /// - Otherwise as [`AmapClient::search_nearby`].
    pub async fn route(
        &self,
        origin: Point,
        destination: Point,
        mode: TransportMode,
    ) -> Result<Route, AmapError> {
        let from = origin.to_lng_lat();
        let to = destination.to_lng_lat();
        let mut params: Vec<(&str, &str)> = vec![("origin", from.as_str()), ("destination", to.as_str())];
        let path = match mode {
            TransportMode::Driving => {
                params.push(("strategy", "0"));
                "v3/direction/driving"
            }
            TransportMode::Walking => "v3/direction/walking",
            TransportMode::Transit => {
                params.push(("city", self.transit_city.as_str()));
                "v3/direction/transit/integrated"
            }
        };

        let response: DirectionResponse = self.get(path, &params).await?;
        let route = response.route.unwrap_or_default();
        let leg = match mode {
            TransportMode::Transit => route.transits.into_iter().next(),
            TransportMode::Driving | TransportMode::Walking => route.paths.into_iter().next(),
        }
        .ok_or(AmapError::NoRoute)?;
        parse_leg(&leg, path)
    }

    /// # Errors
    ///
    /// - [`AmapError::NotFound`] if AMap has no match for `address`.
    /// - [`AmapError::Malformed`] if the match has no usable location.
    /// - Otherwise as [`AmapClient::search_nearby`].
    pub async fn geocode(&self, address: &str) -> Result<GeocodedAddress, AmapError> {
        let response: GeocodeResponse = self.get("v3/geocode/geo", &[("address", address)]).await?;
        let first = response
            .geocodes
            .into_iter()
            .next()
            .ok_or_else(|| AmapError::NotFound(address.to_owned()))?;
        let point = parse_lng_lat(&first.location).ok_or_else(|| AmapError::Malformed {
            context: "v3/geocode/geo".to_owned(),
            detail: format!("location '{}'", first.location),
        })?;
        Ok(GeocodedAddress {
            lat: point.lat,
            lng: point.lng,
            formatted_address: first.formatted_address,
        })
    }

    /// Formatted address for `point`.
    ///
    /// # Errors
    ///
    /// - [`AmapError::NotFound`] if AMap returns no address.
    /// - Otherwise as [`AmapClient::search_nearby`].
    pub async fn reverse_geocode(&self, point: Point) -> Result<String, AmapError> {
        let location = point.to_lng_lat();
        let response: RegeoResponse = self
            .get("v3/geocode/regeo", &[("location", location.as_str()), ("extensions", "base")])
            .await?;
        response
            .regeocode
            .map(|r| r.formatted_address)
            .filter(|a| !a.trim().is_empty())
            .ok_or(AmapError::NotFound(location))
    }

    /// Builds `{base}/{path}?key=..&{params}` with percent-encoded values.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, AmapError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| AmapError::Config(format!("invalid path '{path}': {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AmapError> {
        let url = self.build_url(path, params)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(&url)
        })
        .await?;
        serde_json::from_value(body).map_err(|e| AmapError::Deserialize {
            context: path.to_owned(),
            source: e,
        })
    }

    /// Sends a GET, asserts a 2xx status, parses JSON, and checks the envelope.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, AmapError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let text = response.text().await?;
        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| AmapError::Deserialize {
                context: url.path().to_owned(),
                source: e,
            })?;
        Self::check_envelope(&body, url.path())?;
        Ok(body)
    }

    fn check_envelope(body: &serde_json::Value, context: &str) -> Result<(), AmapError> {
        let envelope: Envelope =
            serde_json::from_value(body.clone()).map_err(|e| AmapError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;
        if envelope.status == "1" {
            return Ok(());
        }
        Err(AmapError::Api {
            info: if envelope.info.is_empty() {
                "unknown error".to_owned()
            } else {
                envelope.info
            },
            infocode: envelope.infocode,
        })
    }
}

fn parse_leg(leg: &RawLeg, context: &str) -> Result<Route, AmapError> {
    let seconds = parse_whole(&leg.duration).ok_or_else(|| AmapError::Malformed {
        context: context.to_owned(),
        detail: format!("duration '{}'", leg.duration),
    })?;
    Ok(Route {
        seconds,
        meters: parse_whole(&leg.distance).unwrap_or(0),
    })
}

/// AMap sometimes reports durations as `"1260"` and sometimes `"1260.0"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_whole(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
            .map(|v| v.round() as u32)
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
