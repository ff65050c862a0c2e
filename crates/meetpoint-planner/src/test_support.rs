//! In-memory fakes for the provider and store traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use meetpoint_core::{
    GeocodedAddress, Geocoder, LocationStore, NewStoredLocation, PlaceSearch, Point,
    ProviderError, StoreError, StoredLocation, TransportMode, TravelTimeProvider, Venue,
    VenueCategory,
};
use uuid::Uuid;

use crate::collect::Candidate;
use crate::origins::RunOrigin;

pub(crate) fn run_origin(id: &str, lat: f64, lng: f64, is_own: bool) -> RunOrigin {
    let owner = id.split('#').next().unwrap_or(id);
    RunOrigin {
        id: id.to_string(),
        owner_id: owner.to_string(),
        location: Point::new(lat, lng),
        address: format!("{id} address"),
        is_own,
    }
}

pub(crate) fn venue(id: &str, name: &str) -> Venue {
    Venue {
        id: id.to_string(),
        name: name.to_string(),
        address: format!("{name} street"),
        location: Point::new(31.15, 121.15),
        category: "餐饮服务;中餐厅".to_string(),
        distance: Some(250),
    }
}

pub(crate) fn candidate(id: &str, lat: f64, lng: f64) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: format!("venue {id}"),
        address: format!("{id} road"),
        location: Point::new(lat, lng),
        category: "050000".to_string(),
        distance_hint: None,
    }
}

/// Search results keyed by the searched point; unknown points fail.
#[derive(Default)]
pub(crate) struct FakePlaces {
    by_point: HashMap<String, Vec<Venue>>,
    calls: Mutex<Vec<(String, u32, String)>>,
}

impl FakePlaces {
    pub(crate) fn with(mut self, center: Point, venues: Vec<Venue>) -> Self {
        self.by_point.insert(center.to_lng_lat(), venues);
        self
    }

    /// `(category code, radius, keyword)` per call.
    pub(crate) fn calls(&self) -> Vec<(String, u32, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceSearch for FakePlaces {
    async fn search_nearby(
        &self,
        center: Point,
        category: &VenueCategory,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<Venue>, ProviderError> {
        self.calls.lock().unwrap().push((
            category.code().to_string(),
            radius_meters,
            keyword.to_string(),
        ));
        self.by_point
            .get(&center.to_lng_lat())
            .cloned()
            .ok_or_else(|| ProviderError::Unavailable("no fixture".to_string()))
    }
}

type TravelFn = dyn Fn(Point, Point, TransportMode) -> Result<u32, ProviderError> + Send + Sync;

pub(crate) struct FakeTravel {
    answer: Box<TravelFn>,
    calls: AtomicUsize,
}

impl FakeTravel {
    pub(crate) fn new(
        answer: impl Fn(Point, Point, TransportMode) -> Result<u32, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            answer: Box::new(answer),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TravelTimeProvider for FakeTravel {
    async fn travel_time(
        &self,
        origin: Point,
        destination: Point,
        mode: TransportMode,
    ) -> Result<u32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)(origin, destination, mode)
    }
}

#[derive(Default)]
pub(crate) struct FakeStore {
    rows: Mutex<HashMap<Uuid, Vec<StoredLocation>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl FakeStore {
    pub(crate) fn seed(&self, team_id: Uuid, rows: Vec<StoredLocation>) {
        self.rows.lock().unwrap().entry(team_id).or_default().extend(rows);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn rows_for(&self, team_id: Uuid, user_id: &str) -> Vec<StoredLocation> {
        let mut rows: Vec<StoredLocation> = self
            .rows
            .lock()
            .unwrap()
            .get(&team_id)
            .map(|rows| rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
            .unwrap_or_default();
        rows.sort_by_key(|r| r.position);
        rows
    }
}

#[async_trait]
impl LocationStore for FakeStore {
    async fn replace_all(
        &self,
        team_id: Uuid,
        user_id: &str,
        locations: &[NewStoredLocation],
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".into()));
        }
        let now = Utc::now();
        let mut guard = self.rows.lock().unwrap();
        let team = guard.entry(team_id).or_default();
        team.retain(|r| r.user_id != user_id);
        team.extend(locations.iter().enumerate().map(|(i, l)| StoredLocation {
            user_id: user_id.to_string(),
            lat: l.lat,
            lng: l.lng,
            address: l.address.clone(),
            is_primary: l.is_primary,
            position: i32::try_from(i).unwrap(),
            updated_at: now,
        }));
        Ok(())
    }

    async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<StoredLocation>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&team_id)
            .cloned()
            .unwrap_or_default())
    }
}

pub(crate) struct FakeGeocoder {
    pub(crate) forward: Option<GeocodedAddress>,
    pub(crate) reverse: Option<String>,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, ProviderError> {
        self.forward
            .clone()
            .ok_or_else(|| ProviderError::NotFound(address.to_string()))
    }

    async fn reverse_geocode(&self, _point: Point) -> Result<String, ProviderError> {
        self.reverse
            .clone()
            .ok_or_else(|| ProviderError::Unavailable("regeo down".to_string()))
    }
}
