use meetpoint_core::TransportMode;

use super::*;
use crate::test_support::candidate;

fn sample(origin: &str, secs: u32, own: bool) -> TravelSample {
    TravelSample {
        origin_id: origin.to_string(),
        candidate_id: String::new(),
        mode: TransportMode::Driving,
        seconds: secs,
        is_own_origin: own,
        is_fallback: false,
    }
}

fn entry(id: &str, samples: Vec<TravelSample>) -> CandidateSamples {
    CandidateSamples {
        candidate: candidate(id, 31.2, 121.2),
        samples,
    }
}

fn ids(results: &[RankedResult]) -> Vec<&str> {
    results.iter().map(|r| r.candidate.id.as_str()).collect()
}

#[test]
fn max_time_is_the_larger_of_own_and_other() {
    let ranked = evaluate(
        vec![entry(
            "a",
            vec![sample("me#0", 300, true), sample("bob#0", 500, false)],
        )],
        600,
        RankBy::Max,
    );
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].max_time_seconds, 500);
    assert_eq!(ranked[0].max_time_minutes, 8);
    assert!((ranked[0].avg_time_seconds - 400.0).abs() < f64::EPSILON);
    assert_eq!(ranked[0].avg_time_minutes, 7);
}

#[test]
fn reported_minutes_match_rounded_samples() {
    let matrix = vec![
        entry("a", vec![sample("me#0", 89, true), sample("bob#0", 29, false)]),
        entry("b", vec![sample("me#0", 150, true), sample("bob#0", 91, false)]),
        entry("c", vec![sample("me#0", 0, true), sample("bob#0", 599, false)]),
    ];
    for r in evaluate(matrix, 600, RankBy::Max) {
        let max = r.per_origin_times.iter().map(|s| s.seconds).max().unwrap();
        assert_eq!(r.max_time_minutes, seconds_to_minutes(f64::from(max)));
        assert!(r.max_time_seconds <= 600);
    }
}

#[test]
fn budget_is_inclusive_and_one_over_is_dropped() {
    let matrix = vec![
        entry("at", vec![sample("me#0", 600, true)]),
        entry("over", vec![sample("me#0", 100, true), sample("bob#0", 601, false)]),
    ];
    let ranked = evaluate(matrix, 600, RankBy::Max);
    assert_eq!(ids(&ranked), ["at"]);
}

#[test]
fn missing_side_defaults_to_zero() {
    let only_own = evaluate(vec![entry("a", vec![sample("me#0", 120, true)])], 600, RankBy::Max);
    assert_eq!(only_own[0].max_time_seconds, 120);

    let only_other = evaluate(vec![entry("a", vec![sample("bob#0", 240, false)])], 600, RankBy::Max);
    assert_eq!(only_other[0].max_time_seconds, 240);
}

#[test]
fn candidates_without_samples_are_dropped() {
    assert!(evaluate(vec![entry("a", Vec::new())], 600, RankBy::Avg).is_empty());
}

#[test]
fn fallback_sample_counts_unmodified_in_average() {
    let mut fallback = sample("bob#0", 600, false);
    fallback.is_fallback = true;
    let ranked = evaluate(
        vec![entry("a", vec![sample("me#0", 0, true), fallback])],
        600,
        RankBy::Avg,
    );
    assert_eq!(ranked.len(), 1);
    assert!((ranked[0].avg_time_seconds - 300.0).abs() < f64::EPSILON);
    assert_eq!(ranked[0].max_time_seconds, 600);
    assert!(ranked[0].has_estimates());
}

#[test]
fn max_and_avg_orderings_differ() {
    let matrix = vec![
        // max 500, avg 300
        entry("spiky", vec![sample("me#0", 100, true), sample("bob#0", 500, false)]),
        // max 400, avg 400
        entry("even", vec![sample("me#0", 400, true), sample("bob#0", 400, false)]),
    ];
    assert_eq!(ids(&evaluate(matrix.clone(), 600, RankBy::Max)), ["even", "spiky"]);
    assert_eq!(ids(&evaluate(matrix, 600, RankBy::Avg)), ["spiky", "even"]);
}

#[test]
fn ties_keep_merge_order() {
    let matrix = vec![
        entry("first", vec![sample("me#0", 300, true)]),
        entry("second", vec![sample("me#0", 300, true)]),
        entry("fast", vec![sample("me#0", 60, true)]),
        entry("third", vec![sample("me#0", 300, true)]),
    ];
    assert_eq!(
        ids(&evaluate(matrix.clone(), 600, RankBy::Max)),
        ["fast", "first", "second", "third"]
    );
    assert_eq!(
        ids(&evaluate(matrix, 600, RankBy::Avg)),
        ["fast", "first", "second", "third"]
    );
}

#[test]
fn evaluation_is_idempotent() {
    let matrix: Vec<CandidateSamples> = (0..15u32)
        .map(|i| {
            entry(
                &format!("v{i}"),
                vec![
                    sample("me#0", (i * 37) % 500, true),
                    sample("bob#0", (i * 53) % 500, false),
                ],
            )
        })
        .collect();
    let first = evaluate(matrix.clone(), 450, RankBy::Avg);
    let second = evaluate(matrix, 450, RankBy::Avg);
    assert_eq!(first, second);
}

#[test]
fn top_results_caps_presentation_only() {
    let matrix: Vec<CandidateSamples> = (0..14u32)
        .map(|i| entry(&format!("v{i}"), vec![sample("me#0", 100 + i, true)]))
        .collect();
    let ranked = evaluate(matrix, 600, RankBy::Max);
    assert_eq!(ranked.len(), 14);
    let top = top_results(ranked.clone());
    assert_eq!(top.len(), RESULTS_CAP);
    assert_eq!(top[..], ranked[..RESULTS_CAP]);
}

#[test]
fn minutes_round_half_up() {
    assert_eq!(seconds_to_minutes(29.0), 0);
    assert_eq!(seconds_to_minutes(30.0), 1);
    assert_eq!(seconds_to_minutes(89.0), 1);
    assert_eq!(seconds_to_minutes(90.0), 2);
}
