//! Ordered per-user list of origin locations with a single primary entry.
//!
//! The set is an ordered sequence plus a separate primary index. It never
//! talks to storage itself; callers persist the whole list after every
//! successful mutation (see `meetpoint_planner::PersistedLocations`).

use crate::provider::NewStoredLocation;
use crate::types::{Location, Origin, StoredLocation};
use crate::CoreError;

/// Two locations closer than this on both axes are the same place (~11 m).
pub const PROXIMITY_EPSILON_DEG: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationSet {
    owner_id: String,
    entries: Vec<Location>,
    primary: Option<usize>,
}

impl LocationSet {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            entries: Vec::new(),
            primary: None,
        }
    }

    /// Rebuilds a set from stored rows.
    ///
    /// Rows are ordered by `position`; rows belonging to other users are
    /// ignored. The first row flagged primary wins, otherwise index 0 is
    /// primary. Rows that duplicate an earlier entry or carry invalid
    /// coordinates are dropped.
    pub fn from_stored(owner_id: impl Into<String>, rows: &[StoredLocation]) -> Self {
        let mut set = Self::new(owner_id);
        let mut owned: Vec<&StoredLocation> = rows
            .iter()
            .filter(|r| r.user_id == set.owner_id)
            .collect();
        owned.sort_by_key(|r| r.position);

        let mut stored_primary = None;
        for row in owned {
            let location = Location::new(row.lat, row.lng, row.address.clone());
            if set.add(location).is_ok() && row.is_primary && stored_primary.is_none() {
                stored_primary = Some(set.entries.len() - 1);
            }
        }
        if let Some(index) = stored_primary {
            set.primary = Some(index);
        }
        set
    }

    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    #[must_use]
    pub fn primary_index(&self) -> Option<usize> {
        self.primary
    }

    #[must_use]
    pub fn primary(&self) -> Option<&Location> {
        self.primary.and_then(|i| self.entries.get(i))
    }

    /// Appends `location`; the first entry becomes primary.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidCoordinate`] if the point is not finite or out of range.
    /// - [`CoreError::DuplicateLocation`] if an entry lies within
    ///   [`PROXIMITY_EPSILON_DEG`] of `location`.
    pub fn add(&mut self, location: Location) -> Result<(), CoreError> {
        let point = location.point();
        point.validate()?;
        if self
            .entries
            .iter()
            .any(|e| e.point().is_near(&point, PROXIMITY_EPSILON_DEG))
        {
            return Err(CoreError::DuplicateLocation {
                lat: location.lat,
                lng: location.lng,
                epsilon: PROXIMITY_EPSILON_DEG,
            });
        }
        self.entries.push(location);
        if self.primary.is_none() {
            self.primary = Some(0);
        }
        Ok(())
    }

    /// Removes and returns the entry at `index`.
    ///
    /// Removing the primary promotes whatever now sits at index 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] for an invalid index.
    pub fn remove(&mut self, index: usize) -> Result<Location, CoreError> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        self.primary = match self.primary {
            _ if self.entries.is_empty() => None,
            Some(p) if p == index => Some(0),
            Some(p) if p > index => Some(p - 1),
            other => other,
        };
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] for an invalid index.
    pub fn set_primary(&mut self, index: usize) -> Result<(), CoreError> {
        self.check_index(index)?;
        self.primary = Some(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.primary = None;
    }

    /// Entries as origin records, in order.
    #[must_use]
    pub fn origins(&self) -> Vec<Origin> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| Origin {
                lat: e.lat,
                lng: e.lng,
                address: e.address.clone(),
                owner_id: self.owner_id.clone(),
                is_primary: self.primary == Some(i),
            })
            .collect()
    }

    /// Rows for a full replace of the owner's stored list.
    #[must_use]
    pub fn to_stored(&self) -> Vec<NewStoredLocation> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| NewStoredLocation {
                lat: e.lat,
                lng: e.lng,
                address: e.address.clone(),
                is_primary: self.primary == Some(i),
            })
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<(), CoreError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(CoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}

#[cfg(test)]
#[path = "location_set_test.rs"]
mod tests;
