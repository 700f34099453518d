use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display};

mod category;

pub use category::Category;

/// Identifier for a place, preferring a provider-assigned id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceId {
    /// Provider-specific place identifier (e.g. a Kakao place id "26338954")
    Provider(String),
    /// Derived from name and address when the provider has no stable id
    Composite(String),
}

impl PlaceId {
    /// Builds the fallback identity from a place's name and address.
    pub fn composite(name: &str, address: &str) -> Self {
        PlaceId::Composite(format!(
            "{}|{}",
            name.trim().to_lowercase(),
            address.trim().to_lowercase()
        ))
    }
}

impl Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceId::Provider(id) => write!(f, "{}", id),
            PlaceId::Composite(key) => write!(f, "{}", key),
        }
    }
}

/// A geographic point (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A normalized place-search hit, common across providers
///
/// Provider adapters translate their wire formats into this shape; the rest
/// of the pipeline never sees provider-specific field names.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlace {
    pub provider_id: Option<String>,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub road_address: String,
    pub phone: Option<String>,
    pub raw_category: String,
    pub distance_m: f64,
    pub detail_url: String,
    pub rating: Option<f64>,
    pub photo_url: Option<String>,
}

impl RawPlace {
    /// Stable identity: the provider id when present, otherwise a
    /// name+address composite.
    pub fn identity(&self) -> PlaceId {
        match &self.provider_id {
            Some(id) if !id.is_empty() => PlaceId::Provider(id.clone()),
            _ => PlaceId::composite(&self.name, &self.address),
        }
    }
}

/// A discovered place, tagged against the category taxonomy
///
/// Request-scoped: candidates are rebuilt from live search results on every
/// recommendation and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: PlaceId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub road_address: String,
    pub phone: Option<String>,
    pub categories: Vec<Category>,
    pub distance_m: f64,
    pub detail_url: String,
    pub rating: Option<f64>,
    pub photo_url: Option<String>,
}

impl From<RawPlace> for Candidate {
    fn from(raw: RawPlace) -> Self {
        let id = raw.identity();
        let categories = Category::match_raw(&raw.raw_category);

        Candidate {
            id,
            name: raw.name,
            lat: raw.lat,
            lng: raw.lng,
            address: raw.address,
            road_address: raw.road_address,
            phone: raw.phone,
            categories,
            distance_m: raw.distance_m.max(0.0),
            detail_url: raw.detail_url,
            rating: raw.rating,
            photo_url: raw.photo_url,
        }
    }
}

/// Title/description/image triple attached to an enriched candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub image: String,
}

impl PageMeta {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.image.is_empty()
    }
}

/// A candidate paired with its blended score and, after enrichment, metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub meta: Option<PageMeta>,
}

/// A registered office location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub code: String,
    pub name: String,
    pub location: LatLng,
}

/// Inputs to one recommendation pass
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub office: String,
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub exclude: HashSet<PlaceId>,
}

fn default_radius_m() -> u32 {
    300
}

impl RecommendationRequest {
    pub fn new(office: impl Into<String>) -> Self {
        Self {
            office: office.into(),
            radius_m: default_radius_m(),
            categories: Vec::new(),
            exclude: HashSet::new(),
        }
    }
}

/// One primary pick plus alternates, with the updated exclusion list the
/// caller should echo back on the next request
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub primary: ScoredCandidate,
    pub alternatives: Vec<ScoredCandidate>,
    pub excluded_suggestion: Vec<PlaceId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_place() -> RawPlace {
        RawPlace {
            provider_id: Some("26338954".to_string()),
            name: "한밭식당".to_string(),
            lat: 37.5094,
            lng: 127.0612,
            address: "서울 강남구 삼성동 159".to_string(),
            road_address: "서울 강남구 테헤란로 521".to_string(),
            phone: Some("02-555-0100".to_string()),
            raw_category: "음식점 > 한식 > 국밥".to_string(),
            distance_m: 120.0,
            detail_url: "https://place.map.kakao.com/26338954".to_string(),
            rating: None,
            photo_url: None,
        }
    }

    #[test]
    fn test_place_id_display() {
        let id = PlaceId::Provider("26338954".to_string());
        assert_eq!(format!("{}", id), "26338954");

        let id = PlaceId::composite("한밭식당", "서울 강남구 삼성동 159");
        assert_eq!(format!("{}", id), "한밭식당|서울 강남구 삼성동 159");
    }

    #[test]
    fn test_composite_normalizes_case_and_whitespace() {
        let a = PlaceId::composite(" Burger Lab ", "12 Main St");
        let b = PlaceId::composite("burger lab", "12 MAIN ST");
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_prefers_provider_id() {
        let raw = raw_place();
        assert_eq!(raw.identity(), PlaceId::Provider("26338954".to_string()));
    }

    #[test]
    fn test_identity_falls_back_to_composite() {
        let mut raw = raw_place();
        raw.provider_id = None;
        assert_eq!(
            raw.identity(),
            PlaceId::composite("한밭식당", "서울 강남구 삼성동 159")
        );

        // Empty provider ids are treated as absent
        raw.provider_id = Some(String::new());
        assert_eq!(
            raw.identity(),
            PlaceId::composite("한밭식당", "서울 강남구 삼성동 159")
        );
    }

    #[test]
    fn test_candidate_from_raw_place_maps_categories() {
        let candidate = Candidate::from(raw_place());
        assert_eq!(
            candidate.categories,
            vec![Category::Korean, Category::Rice, Category::Soup]
        );
        assert_eq!(candidate.distance_m, 120.0);
    }

    #[test]
    fn test_candidate_from_raw_place_clamps_negative_distance() {
        let mut raw = raw_place();
        raw.distance_m = -5.0;
        let candidate = Candidate::from(raw);
        assert_eq!(candidate.distance_m, 0.0);
    }

    #[test]
    fn test_request_defaults() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"office": "seoul"}"#).unwrap();
        assert_eq!(request.radius_m, 300);
        assert!(request.categories.is_empty());
        assert!(request.exclude.is_empty());
    }

    #[test]
    fn test_page_meta_is_empty() {
        assert!(PageMeta::default().is_empty());
        assert!(!PageMeta {
            title: "한밭식당".to_string(),
            ..PageMeta::default()
        }
        .is_empty());
    }
}
