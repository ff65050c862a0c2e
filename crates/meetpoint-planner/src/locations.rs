//! Write-through location management and point/address resolution.

use std::sync::Arc;

use meetpoint_core::{
    CoreError, GeocodedAddress, Geocoder, Location, LocationSet, LocationStore, Point,
    ProviderError, Session,
};

use crate::error::ManagerError;

/// Address used when a map click cannot be reverse-geocoded.
pub const UNKNOWN_ADDRESS: &str = "unknown address";

/// A user's [`LocationSet`] that mirrors every mutation into the store.
///
/// Each successful in-memory mutation replaces the user's full stored list.
/// If that write fails the mutation is kept and [`ManagerError::Store`] is
/// returned, so the caller can retry with [`PersistedLocations::sync`].
pub struct PersistedLocations {
    session: Session,
    set: LocationSet,
    store: Arc<dyn LocationStore>,
}

impl PersistedLocations {
    /// Loads the user's stored list for the session's team.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] if the store cannot be read.
    pub async fn load(session: Session, store: Arc<dyn LocationStore>) -> Result<Self, ManagerError> {
        let rows = store.list_by_team(session.team_id).await?;
        let set = LocationSet::from_stored(session.user_id.clone(), &rows);
        Ok(Self { session, set, store })
    }

    /// Wraps an existing set without touching the store.
    #[must_use]
    pub fn new(session: Session, set: LocationSet, store: Arc<dyn LocationStore>) -> Self {
        Self { session, set, store }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn set(&self) -> &LocationSet {
        &self.set
    }

    /// # Errors
    ///
    /// [`ManagerError::Location`] if the set rejects the entry (nothing is
    /// written), [`ManagerError::Store`] if the write-through fails.
    pub async fn add(&mut self, location: Location) -> Result<(), ManagerError> {
        self.set.add(location)?;
        self.sync().await
    }

    /// # Errors
    ///
    /// See [`PersistedLocations::add`].
    pub async fn remove(&mut self, index: usize) -> Result<Location, ManagerError> {
        let removed = self.set.remove(index)?;
        self.sync().await?;
        Ok(removed)
    }

    /// # Errors
    ///
    /// See [`PersistedLocations::add`].
    pub async fn set_primary(&mut self, index: usize) -> Result<(), ManagerError> {
        self.set.set_primary(index)?;
        self.sync().await
    }

    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] if the write-through fails.
    pub async fn clear(&mut self) -> Result<(), ManagerError> {
        self.set.clear();
        self.sync().await
    }

    /// Replaces the whole list, validating every entry as [`LocationSet::add`]
    /// would. Nothing changes (in memory or in the store) if any entry or
    /// the primary index is rejected.
    ///
    /// # Errors
    ///
    /// See [`PersistedLocations::add`].
    pub async fn replace_with(
        &mut self,
        locations: Vec<Location>,
        primary: Option<usize>,
    ) -> Result<(), ManagerError> {
        let mut next = LocationSet::new(self.session.user_id.clone());
        for location in locations {
            next.add(location)?;
        }
        if let Some(index) = primary {
            next.set_primary(index)?;
        }
        self.set = next;
        self.sync().await
    }

    /// Writes the current list to the store.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] if the write fails.
    pub async fn sync(&self) -> Result<(), ManagerError> {
        let rows = self.set.to_stored();
        self.store
            .replace_all(self.session.team_id, &self.session.user_id, &rows)
            .await
            .map_err(|e| {
                tracing::warn!(
                    team_id = %self.session.team_id,
                    user_id = %self.session.user_id,
                    error = %e,
                    "failed to persist location list"
                );
                ManagerError::Store(e)
            })
    }
}

/// Turns a map click into a [`Location`].
///
/// # Errors
///
/// Returns [`CoreError::InvalidCoordinate`] for an out-of-range point or an
/// unresolved click. A failed reverse lookup is not an error: the address
/// becomes [`UNKNOWN_ADDRESS`].
pub async fn resolve_point(geocoder: &dyn Geocoder, point: Point) -> Result<Location, CoreError> {
    if point.is_unresolved_click() {
        return Err(CoreError::InvalidCoordinate {
            lat: point.lat,
            lng: point.lng,
        });
    }
    resolve_typed_point(geocoder, point).await
}

/// Turns explicitly entered coordinates into a [`Location`]. Unlike
/// [`resolve_point`], a zero axis is accepted.
///
/// # Errors
///
/// Returns [`CoreError::InvalidCoordinate`] if the point is not finite or
/// out of range.
pub async fn resolve_typed_point(
    geocoder: &dyn Geocoder,
    point: Point,
) -> Result<Location, CoreError> {
    point.validate()?;
    let address = match geocoder.reverse_geocode(point).await {
        Ok(address) if !address.trim().is_empty() => address,
        Ok(_) => UNKNOWN_ADDRESS.to_string(),
        Err(e) => {
            tracing::warn!(lat = point.lat, lng = point.lng, error = %e, "reverse geocode failed");
            UNKNOWN_ADDRESS.to_string()
        }
    };
    Ok(Location::new(point.lat, point.lng, address))
}

/// Forward-geocodes free text into a [`Location`], keeping the query as the
/// address when the provider returns no formatted one.
///
/// # Errors
///
/// Propagates the provider failure; a result with unusable coordinates is
/// reported as [`ProviderError::NotFound`].
pub async fn locate_address(geocoder: &dyn Geocoder, query: &str) -> Result<Location, ProviderError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ProviderError::NotFound("empty address".to_string()));
    }
    let GeocodedAddress {
        lat,
        lng,
        formatted_address,
    } = geocoder.geocode(query).await?;
    if !Point::new(lat, lng).is_valid() {
        return Err(ProviderError::NotFound(query.to_string()));
    }
    let address = if formatted_address.trim().is_empty() {
        query.to_string()
    } else {
        formatted_address
    };
    Ok(Location::new(lat, lng, address))
}

#[cfg(test)]
#[path = "locations_test.rs"]
mod tests;
