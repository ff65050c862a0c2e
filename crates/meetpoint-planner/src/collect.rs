//! Candidate collection: one nearby search per origin, merged by venue id.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use meetpoint_core::{PlaceSearch, Point, Venue, VenueCategory};
use serde::Serialize;

use crate::origins::RunOrigin;

/// A venue discovered near at least one origin, pending evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Point,
    pub category: String,
    pub distance_hint: Option<u32>,
}

impl From<Venue> for Candidate {
    fn from(v: Venue) -> Self {
        Self {
            id: v.id,
            name: v.name,
            address: v.address,
            location: v.location,
            category: v.category,
            distance_hint: v.distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectOutcome {
    Candidates(Vec<Candidate>),
    /// Every search came back empty or failed.
    NoCandidates,
}

/// Searches around every origin and merges the results by provider id.
///
/// Searches run concurrently (at most `concurrency` in flight) but results
/// are merged in origin order, so the first origin to report a venue owns
/// its metadata. A failed search is logged and contributes nothing.
pub async fn collect_candidates(
    places: &dyn PlaceSearch,
    origins: &[RunOrigin],
    category: &VenueCategory,
    radius_meters: u32,
    keyword: &str,
    concurrency: usize,
) -> CollectOutcome {
    let searches: Vec<_> = origins
        .iter()
        .map(|origin| async move {
            match places
                .search_nearby(origin.location, category, radius_meters, keyword)
                .await
            {
                Ok(venues) => venues,
                Err(e) => {
                    tracing::warn!(
                        origin = %origin.id,
                        category = %category,
                        error = %e,
                        "nearby search failed; treating as zero results"
                    );
                    Vec::new()
                }
            }
        })
        .collect();
    let per_origin: Vec<Vec<Venue>> = stream::iter(searches)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Candidate> = Vec::new();
    for venue in per_origin.into_iter().flatten() {
        if venue.id.is_empty() {
            continue;
        }
        if seen.insert(venue.id.clone()) {
            merged.push(Candidate::from(venue));
        }
    }

    tracing::debug!(
        origins = origins.len(),
        candidates = merged.len(),
        "candidate collection finished"
    );

    if merged.is_empty() {
        CollectOutcome::NoCandidates
    } else {
        CollectOutcome::Candidates(merged)
    }
}
