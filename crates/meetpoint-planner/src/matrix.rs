//! Travel matrix: one travel-time sample per (origin, candidate) pair.

use futures::stream::{self, StreamExt};
use meetpoint_core::{TransportMode, TravelTimeProvider};
use serde::Serialize;

use crate::collect::Candidate;
use crate::origins::RunOrigin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelSample {
    pub origin_id: String,
    pub candidate_id: String,
    pub mode: TransportMode,
    pub seconds: u32,
    pub is_own_origin: bool,
    /// The provider failed and `seconds` is the budget sentinel.
    pub is_fallback: bool,
}

/// A candidate with one sample per origin of the run, in origin order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSamples {
    pub candidate: Candidate,
    pub samples: Vec<TravelSample>,
}

/// Requests a travel time for every (origin, candidate) pair.
///
/// Pairs are issued concurrently with at most `concurrency` in flight. A
/// failed pair is recorded as exactly `budget_seconds` with `is_fallback`
/// set. Candidates keep their input order.
pub async fn build_matrix(
    travel: &dyn TravelTimeProvider,
    origins: &[RunOrigin],
    candidates: Vec<Candidate>,
    mode: TransportMode,
    budget_seconds: u32,
    concurrency: usize,
) -> Vec<CandidateSamples> {
    let pairs: Vec<(usize, usize)> = (0..candidates.len())
        .flat_map(|c| (0..origins.len()).map(move |o| (c, o)))
        .collect();

    let candidates_ref = &candidates;
    let timed: Vec<(usize, usize, Option<u32>)> = stream::iter(pairs)
        .map(|(c, o)| async move {
            let origin = &origins[o];
            let candidate = &candidates_ref[c];
            match travel
                .travel_time(origin.location, candidate.location, mode)
                .await
            {
                Ok(secs) => (c, o, Some(secs)),
                Err(e) => {
                    tracing::warn!(
                        origin = %origin.id,
                        candidate = %candidate.id,
                        mode = %mode,
                        error = %e,
                        "travel time lookup failed; using budget as fallback"
                    );
                    (c, o, None)
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    // (seconds, is_fallback) per [candidate][origin]
    let mut grid: Vec<Vec<(u32, bool)>> =
        vec![vec![(budget_seconds, true); origins.len()]; candidates.len()];
    for (c, o, secs) in timed {
        if let Some(s) = secs {
            grid[c][o] = (s, false);
        }
    }

    candidates
        .into_iter()
        .zip(grid)
        .map(|(candidate, row)| {
            let samples = origins
                .iter()
                .zip(row)
                .map(|(origin, (seconds, is_fallback))| TravelSample {
                    origin_id: origin.id.clone(),
                    candidate_id: candidate.id.clone(),
                    mode,
                    seconds,
                    is_own_origin: origin.is_own,
                    is_fallback,
                })
                .collect();
            CandidateSamples { candidate, samples }
        })
        .collect()
}
