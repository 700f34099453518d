use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::models::{Candidate, PlaceId, RawPlace};

/// Known ratings strictly below this are dropped; absent or zero ratings
/// pass (the source treats unrated better than known-mediocre, on purpose)
pub const MIN_RATING: f64 = 3.0;

/// Merges raw search batches into a deduplicated, filtered candidate pool.
///
/// Duplicate identities keep the entry with the smaller recorded distance.
/// Output order is not significant; ranking re-sorts by score.
pub fn consolidate(
    batches: Vec<Vec<RawPlace>>,
    excluded: &HashSet<PlaceId>,
    min_rating: f64,
) -> Vec<Candidate> {
    let mut merged: HashMap<PlaceId, Candidate> = HashMap::new();

    for raw in batches.into_iter().flatten() {
        let candidate = Candidate::from(raw);
        match merged.entry(candidate.id.clone()) {
            Entry::Occupied(mut entry) => {
                if candidate.distance_m < entry.get().distance_m {
                    entry.insert(candidate);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
        }
    }

    let before = merged.len();
    let pool: Vec<Candidate> = merged
        .into_values()
        .filter(|candidate| !excluded.contains(&candidate.id))
        .filter(|candidate| passes_rating_floor(candidate.rating, min_rating))
        .collect();

    tracing::debug!(
        merged = before,
        kept = pool.len(),
        excluded = excluded.len(),
        "Candidate pool consolidated"
    );

    pool
}

fn passes_rating_floor(rating: Option<f64>, min_rating: f64) -> bool {
    match rating {
        Some(rating) if rating > 0.0 => rating >= min_rating,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, distance_m: f64, rating: Option<f64>) -> RawPlace {
        RawPlace {
            provider_id: Some(id.to_string()),
            name: format!("place-{}", id),
            lat: 37.5094,
            lng: 127.0612,
            address: "서울 강남구 삼성동 159".to_string(),
            road_address: String::new(),
            phone: None,
            raw_category: "음식점 > 한식".to_string(),
            distance_m,
            detail_url: format!("https://place.map.kakao.com/{}", id),
            rating,
            photo_url: None,
        }
    }

    #[test]
    fn test_duplicate_identity_keeps_smaller_distance() {
        let batches = vec![vec![raw("1", 80.0, None)], vec![raw("1", 50.0, None)]];
        let pool = consolidate(batches, &HashSet::new(), MIN_RATING);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].distance_m, 50.0);
    }

    #[test]
    fn test_duplicate_identity_first_wins_on_tie() {
        let mut first = raw("1", 50.0, None);
        first.name = "first".to_string();
        let mut second = raw("1", 50.0, None);
        second.name = "second".to_string();

        let pool = consolidate(vec![vec![first], vec![second]], &HashSet::new(), MIN_RATING);
        assert_eq!(pool[0].name, "first");
    }

    #[test]
    fn test_excluded_identity_dropped() {
        let excluded: HashSet<PlaceId> =
            [PlaceId::Provider("2".to_string())].into_iter().collect();
        let batches = vec![vec![raw("1", 50.0, None), raw("2", 60.0, None)]];

        let pool = consolidate(batches, &excluded, MIN_RATING);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, PlaceId::Provider("1".to_string()));
    }

    #[test]
    fn test_rating_floor() {
        let batches = vec![vec![
            raw("low", 50.0, Some(2.9)),
            raw("unknown", 50.0, Some(0.0)),
            raw("absent", 50.0, None),
            raw("exact", 50.0, Some(3.0)),
            raw("high", 50.0, Some(4.5)),
        ]];

        let pool = consolidate(batches, &HashSet::new(), MIN_RATING);
        let ids: HashSet<String> = pool.iter().map(|c| c.id.to_string()).collect();

        assert!(!ids.contains("low"));
        assert!(ids.contains("unknown"));
        assert!(ids.contains("absent"));
        assert!(ids.contains("exact"));
        assert!(ids.contains("high"));
    }

    #[test]
    fn test_cross_provider_duplicates_merge_by_composite() {
        let mut a = raw("x", 70.0, None);
        a.provider_id = None;
        a.name = "Burger Lab".to_string();
        let mut b = raw("y", 40.0, None);
        b.provider_id = None;
        b.name = "burger lab".to_string();

        let pool = consolidate(vec![vec![a], vec![b]], &HashSet::new(), MIN_RATING);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].distance_m, 40.0);
    }

    #[test]
    fn test_empty_batches() {
        let pool = consolidate(vec![Vec::new(), Vec::new()], &HashSet::new(), MIN_RATING);
        assert!(pool.is_empty());
    }
}
