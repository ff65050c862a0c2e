//! [`AmapClient`] as the planner's geocoder, place search and travel-time
//! provider.

use async_trait::async_trait;
use meetpoint_core::{
    GeocodedAddress, Geocoder, PlaceSearch, Point, ProviderError, TransportMode,
    TravelTimeProvider, Venue, VenueCategory,
};

use crate::client::AmapClient;

#[async_trait]
impl Geocoder for AmapClient {
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, ProviderError> {
        Ok(AmapClient::geocode(self, address).await?)
    }

    async fn reverse_geocode(&self, point: Point) -> Result<String, ProviderError> {
        Ok(AmapClient::reverse_geocode(self, point).await?)
    }
}

#[async_trait]
impl PlaceSearch for AmapClient {
    async fn search_nearby(
        &self,
        center: Point,
        category: &VenueCategory,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<Venue>, ProviderError> {
        Ok(AmapClient::search_nearby(self, center, category, radius_meters, keyword).await?)
    }
}

#[async_trait]
impl TravelTimeProvider for AmapClient {
    async fn travel_time(
        &self,
        origin: Point,
        destination: Point,
        mode: TransportMode,
    ) -> Result<u32, ProviderError> {
        Ok(self.route(origin, destination, mode).await?.seconds)
    }
}
