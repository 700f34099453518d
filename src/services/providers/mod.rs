/// Place-search provider abstraction
///
/// This module provides a pluggable architecture for external place-search
/// APIs (Kakao Local, Google Places, etc.). Search providers feed the
/// candidate pool; photo sources participate in the enrichment fallback
/// chain.
use crate::models::{LatLng, RawPlace};

pub mod google;
pub mod kakao;

/// Trait for place-search providers
///
/// Both methods degrade to an empty batch on transport errors, non-success
/// statuses, or malformed payloads: a failing provider thins the candidate
/// pool but never aborts the recommendation.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    /// Category-mode search for restaurants around a center point.
    async fn search_nearby(&self, center: LatLng, radius_m: u32) -> Vec<RawPlace>;

    /// Free-text keyword search around a center point.
    ///
    /// The pipeline issues one call per keyword, capped at three keywords
    /// derived from the caller's selected category tags.
    async fn search_keyword(&self, center: LatLng, radius_m: u32, keyword: &str) -> Vec<RawPlace>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for photo lookups used by the enrichment fallback chain
///
/// A provider implements whichever lookups it supports; the defaults return
/// `None` so the chain falls through to the next source.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PhotoSource: Send + Sync {
    /// Photo lookup keyed by the provider's own place identifier.
    async fn photo_by_place_id(&self, place_id: &str) -> Option<String> {
        let _ = place_id;
        None
    }

    /// Fuzzy photo lookup by place name near a coordinate.
    async fn photo_by_location(&self, name: &str, lat: f64, lng: f64) -> Option<String> {
        let _ = (name, lat, lng);
        None
    }

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
