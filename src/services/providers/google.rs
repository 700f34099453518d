/// Google Places provider
///
/// Secondary photo source: when the primary provider has no photo for a
/// candidate, the place is re-found on Google by name near its coordinates
/// (~100m), then a details call yields the largest photo.
///
/// API Flow:
/// 1. /place/nearbysearch/json with keyword=name, radius=100
/// 2. /place/details/json?fields=photos → photo_reference
/// 3. /place/photo?maxwidth=400&photoreference=... as the final URL
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::providers::PhotoSource,
};

/// Radius for the fuzzy name+coordinate re-find
const FUZZY_MATCH_RADIUS_M: u32 = 100;
const PHOTO_MAX_WIDTH: u32 = 400;

#[derive(Clone)]
pub struct GooglePlacesProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl GooglePlacesProvider {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    /// Re-finds a place by name near a coordinate, returning its Google
    /// place id. Picks the result closest to the coordinate.
    async fn find_place_id(&self, name: &str, lat: f64, lng: f64) -> AppResult<Option<String>> {
        let url = format!("{}/place/nearbysearch/json", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("location", format!("{},{}", lat, lng)),
                ("radius", FUZZY_MATCH_RADIUS_M.to_string()),
                ("keyword", name.to_string()),
                ("type", "restaurant".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Google Places API returned status {}",
                status
            )));
        }

        let payload: GoogleSearchResponse = response.json().await?;
        if payload.status != "OK" {
            return Ok(None);
        }

        Ok(closest_place_id(payload.results, lat, lng))
    }

    async fn photo_reference(&self, place_id: &str) -> AppResult<Option<String>> {
        let url = format!("{}/place/details/json", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("place_id", place_id.to_string()),
                ("fields", "photos".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Google Places API returned status {}",
                status
            )));
        }

        let payload: GoogleDetailsResponse = response.json().await?;
        if payload.status != "OK" {
            return Ok(None);
        }

        let photos = payload.result.map(|result| result.photos).unwrap_or_default();
        Ok(best_photo_reference(photos))
    }

    fn photo_url(&self, reference: &str) -> String {
        format!(
            "{}/place/photo?maxwidth={}&photoreference={}&key={}",
            self.api_url, PHOTO_MAX_WIDTH, reference, self.api_key
        )
    }
}

#[async_trait::async_trait]
impl PhotoSource for GooglePlacesProvider {
    async fn photo_by_location(&self, name: &str, lat: f64, lng: f64) -> Option<String> {
        let place_id = match self.find_place_id(name, lat, lng).await {
            Ok(Some(place_id)) => place_id,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(
                    name = %name,
                    error = %e,
                    provider = "google",
                    "Fuzzy place lookup failed"
                );
                return None;
            }
        };

        match self.photo_reference(&place_id).await {
            Ok(Some(reference)) => Some(self.photo_url(&reference)),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(
                    place_id = %place_id,
                    error = %e,
                    provider = "google",
                    "Photo detail lookup failed"
                );
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// Picks the result whose coordinates are nearest the search center, by
/// absolute lat/lng deltas.
fn closest_place_id(results: Vec<GooglePlaceResult>, lat: f64, lng: f64) -> Option<String> {
    results
        .into_iter()
        .min_by(|a, b| {
            let da = (a.geometry.location.lat - lat).abs() + (a.geometry.location.lng - lng).abs();
            let db = (b.geometry.location.lat - lat).abs() + (b.geometry.location.lng - lng).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|result| result.place_id)
}

fn best_photo_reference(photos: Vec<GooglePhoto>) -> Option<String> {
    photos
        .into_iter()
        .max_by_key(|photo| photo.width as u64 * photo.height as u64)
        .map(|photo| photo.photo_reference)
        .filter(|reference| !reference.is_empty())
}

// ============================================================================
// Google wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GoogleSearchResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GooglePlaceResult>,
}

#[derive(Debug, Deserialize)]
struct GooglePlaceResult {
    place_id: String,
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GoogleDetailsResponse {
    #[serde(default)]
    status: String,
    result: Option<GooglePlaceDetails>,
}

#[derive(Debug, Deserialize, Default)]
struct GooglePlaceDetails {
    #[serde(default)]
    photos: Vec<GooglePhoto>,
}

#[derive(Debug, Deserialize)]
struct GooglePhoto {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    photo_reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(place_id: &str, lat: f64, lng: f64) -> GooglePlaceResult {
        GooglePlaceResult {
            place_id: place_id.to_string(),
            geometry: GoogleGeometry {
                location: GoogleLocation { lat, lng },
            },
        }
    }

    #[test]
    fn test_closest_place_id_picks_nearest() {
        let results = vec![
            result("far", 37.5200, 127.0700),
            result("near", 37.5094, 127.0613),
        ];
        assert_eq!(
            closest_place_id(results, 37.5094, 127.0612),
            Some("near".to_string())
        );
    }

    #[test]
    fn test_closest_place_id_empty_results() {
        assert_eq!(closest_place_id(Vec::new(), 37.5, 127.0), None);
    }

    #[test]
    fn test_best_photo_reference_picks_largest() {
        let photos = vec![
            GooglePhoto {
                width: 200,
                height: 100,
                photo_reference: "small".to_string(),
            },
            GooglePhoto {
                width: 1024,
                height: 768,
                photo_reference: "large".to_string(),
            },
        ];
        assert_eq!(best_photo_reference(photos), Some("large".to_string()));
    }

    #[test]
    fn test_search_response_deserialization() {
        let payload: GoogleSearchResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "results": [{
                    "place_id": "ChIJx",
                    "geometry": {"location": {"lat": 37.5094, "lng": 127.0612}},
                    "rating": 4.2
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.status, "OK");
        assert_eq!(payload.results[0].place_id, "ChIJx");
    }

    #[test]
    fn test_details_response_without_photos() {
        let payload: GoogleDetailsResponse =
            serde_json::from_str(r#"{"status": "OK", "result": {}}"#).unwrap();
        let photos = payload.result.map(|result| result.photos).unwrap_or_default();
        assert_eq!(best_photo_reference(photos), None);
    }

    #[test]
    fn test_zero_results_status_yields_none() {
        let payload: GoogleSearchResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert_ne!(payload.status, "OK");
    }

    #[test]
    fn test_photo_url_format() {
        let provider = GooglePlacesProvider {
            http_client: reqwest::Client::new(),
            api_key: "test_key".to_string(),
            api_url: "https://maps.googleapis.com/maps/api".to_string(),
        };
        assert_eq!(
            provider.photo_url("abc123"),
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photoreference=abc123&key=test_key"
        );
    }
}
