use std::cmp::Ordering;

use crate::models::{Candidate, Category, ScoredCandidate};

pub const CATEGORY_WEIGHT: f64 = 0.6;
pub const DISTANCE_WEIGHT: f64 = 0.4;

/// Floor of the distance term: over-radius candidates stay sampling-eligible
pub const DISTANCE_FLOOR: f64 = 0.4;

/// Candidates scoring at or below this are dropped before sampling
pub const MIN_SCORE: f64 = 0.1;

/// Sampling never sees more than this many candidates
pub const POOL_LIMIT: usize = 10;

/// Distance term in [0.4, 1.0]: 1.0 at the office door, linear down to the
/// floor at the radius edge, flat beyond it.
pub fn distance_score(distance_m: f64, radius_m: u32) -> f64 {
    let radius = f64::from(radius_m.max(1));
    if distance_m >= radius {
        return DISTANCE_FLOOR;
    }
    DISTANCE_FLOOR + (1.0 - DISTANCE_FLOOR) * (1.0 - distance_m / radius)
}

/// Category term: 1.0 on any tag overlap, 0.0 on none, 0.5 when the caller
/// expressed no preference.
pub fn category_match(candidate_tags: &[Category], selected: &[Category]) -> f64 {
    if selected.is_empty() {
        return 0.5;
    }
    if candidate_tags.iter().any(|tag| selected.contains(tag)) {
        1.0
    } else {
        0.0
    }
}

/// Blended preference/distance score in [0, 1]
pub fn score(candidate: &Candidate, radius_m: u32, selected: &[Category]) -> f64 {
    CATEGORY_WEIGHT * category_match(&candidate.categories, selected)
        + DISTANCE_WEIGHT * distance_score(candidate.distance_m, radius_m)
}

/// Scores the pool, drops near-zero relevance, sorts descending and
/// truncates to the sampling limit.
pub fn rank(candidates: Vec<Candidate>, radius_m: u32, selected: &[Category]) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let score = score(&candidate, radius_m, selected);
            ScoredCandidate {
                candidate,
                score,
                meta: None,
            }
        })
        .filter(|scored| scored.score > MIN_SCORE)
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(POOL_LIMIT);
    scored
}
