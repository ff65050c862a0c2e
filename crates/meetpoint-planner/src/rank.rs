//! Feasibility filter and ranking over a completed travel matrix.

use meetpoint_core::RankBy;
use serde::Serialize;

use crate::collect::Candidate;
use crate::matrix::{CandidateSamples, TravelSample};

/// How many results a caller presents.
pub const RESULTS_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub max_time_minutes: u32,
    pub avg_time_minutes: u32,
    pub max_time_seconds: u32,
    pub avg_time_seconds: f64,
    pub per_origin_times: Vec<TravelSample>,
}

impl RankedResult {
    /// At least one sample is a fallback rather than a provider answer.
    #[must_use]
    pub fn has_estimates(&self) -> bool {
        self.per_origin_times.iter().any(|s| s.is_fallback)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn seconds_to_minutes(seconds: f64) -> u32 {
    (seconds / 60.0).round().max(0.0) as u32
}

/// Keeps candidates whose worst traveler arrives within `budget_seconds`
/// and orders them by `rank_by`.
///
/// The worst time is the larger of the slowest other member and the
/// requester's slowest own origin; either side defaults to 0 when absent.
/// The average covers every sample, fallbacks included. The sort is stable,
/// so ties keep the input order. Candidates with no samples are dropped.
#[must_use]
pub fn evaluate(
    matrix: Vec<CandidateSamples>,
    budget_seconds: u32,
    rank_by: RankBy,
) -> Vec<RankedResult> {
    let mut kept: Vec<RankedResult> = matrix
        .into_iter()
        .filter(|entry| !entry.samples.is_empty())
        .filter_map(|entry| {
            let max_other = max_seconds(&entry.samples, false);
            let max_own = max_seconds(&entry.samples, true);
            let max_time = max_other.max(max_own);
            if max_time > budget_seconds {
                return None;
            }
            let avg = mean_seconds(&entry.samples);
            Some(RankedResult {
                candidate: entry.candidate,
                max_time_minutes: seconds_to_minutes(f64::from(max_time)),
                avg_time_minutes: seconds_to_minutes(avg),
                max_time_seconds: max_time,
                avg_time_seconds: avg,
                per_origin_times: entry.samples,
            })
        })
        .collect();

    match rank_by {
        RankBy::Max => kept.sort_by_key(|r| r.max_time_seconds),
        RankBy::Avg => kept.sort_by(|a, b| a.avg_time_seconds.total_cmp(&b.avg_time_seconds)),
    }
    kept
}

/// The first [`RESULTS_CAP`] results of an already ranked list.
#[must_use]
pub fn top_results(mut ranked: Vec<RankedResult>) -> Vec<RankedResult> {
    ranked.truncate(RESULTS_CAP);
    ranked
}

fn max_seconds(samples: &[TravelSample], own: bool) -> u32 {
    samples
        .iter()
        .filter(|s| s.is_own_origin == own)
        .map(|s| s.seconds)
        .max()
        .unwrap_or(0)
}

#[allow(clippy::cast_precision_loss)]
fn mean_seconds(samples: &[TravelSample]) -> f64 {
    let total: u64 = samples.iter().map(|s| u64::from(s.seconds)).sum();
    total as f64 / samples.len() as f64
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod tests;
