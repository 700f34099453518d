/// Kakao Local API provider
///
/// Primary search source for the candidate pool, and the first stop in the
/// photo fallback chain (place-detail lookup by Kakao place id).
///
/// API Flow:
/// 1. Nearby: /v2/local/search/category.json with the restaurant group code
/// 2. Keyword: /v2/local/search/keyword.json, one call per derived keyword
/// 3. Photos: /v2/local/place/{id}.json → largest entry of the photo list
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{LatLng, RawPlace},
    services::providers::{PhotoSource, PlaceSearchProvider},
};

/// Kakao category group code for restaurants
const RESTAURANT_GROUP_CODE: &str = "FD6";
const PAGE_SIZE: &str = "15";

#[derive(Clone)]
pub struct KakaoLocalProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl KakaoLocalProvider {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    fn auth_header(&self) -> String {
        format!("KakaoAK {}", self.api_key)
    }

    async fn fetch_documents(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> AppResult<Vec<KakaoDocument>> {
        let response = self
            .http_client
            .get(url)
            .header("Authorization", self.auth_header())
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Kakao API returned status {}: {}",
                status, body
            )));
        }

        let payload: KakaoSearchResponse = response.json().await?;
        Ok(payload.documents)
    }

    fn collect_places(documents: Vec<KakaoDocument>) -> Vec<RawPlace> {
        documents.into_iter().filter_map(to_raw_place).collect()
    }
}

#[async_trait::async_trait]
impl PlaceSearchProvider for KakaoLocalProvider {
    async fn search_nearby(&self, center: LatLng, radius_m: u32) -> Vec<RawPlace> {
        let url = format!("{}/v2/local/search/category.json", self.api_url);
        let params = [
            ("category_group_code", RESTAURANT_GROUP_CODE.to_string()),
            ("x", center.lng.to_string()),
            ("y", center.lat.to_string()),
            ("radius", radius_m.to_string()),
            ("size", PAGE_SIZE.to_string()),
            ("sort", "distance".to_string()),
        ];

        match self.fetch_documents(&url, &params).await {
            Ok(documents) => {
                let places = Self::collect_places(documents);
                tracing::info!(
                    results = places.len(),
                    radius_m = radius_m,
                    provider = "kakao",
                    "Nearby search completed"
                );
                places
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = "kakao",
                    "Nearby search failed, degrading to empty batch"
                );
                Vec::new()
            }
        }
    }

    async fn search_keyword(&self, center: LatLng, radius_m: u32, keyword: &str) -> Vec<RawPlace> {
        let url = format!("{}/v2/local/search/keyword.json", self.api_url);
        let params = [
            ("query", keyword.to_string()),
            ("x", center.lng.to_string()),
            ("y", center.lat.to_string()),
            ("radius", radius_m.to_string()),
            ("size", PAGE_SIZE.to_string()),
            ("sort", "distance".to_string()),
        ];

        match self.fetch_documents(&url, &params).await {
            Ok(documents) => {
                let places = Self::collect_places(documents);
                tracing::info!(
                    keyword = %keyword,
                    results = places.len(),
                    provider = "kakao",
                    "Keyword search completed"
                );
                places
            }
            Err(e) => {
                tracing::warn!(
                    keyword = %keyword,
                    error = %e,
                    provider = "kakao",
                    "Keyword search failed, degrading to empty batch"
                );
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "kakao"
    }
}

#[async_trait::async_trait]
impl PhotoSource for KakaoLocalProvider {
    async fn photo_by_place_id(&self, place_id: &str) -> Option<String> {
        let url = format!("{}/v2/local/place/{}.json", self.api_url, place_id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            tracing::debug!(
                place_id = %place_id,
                status = %response.status(),
                provider = "kakao",
                "Place detail lookup failed"
            );
            return None;
        }

        let payload: KakaoPlaceDetailResponse = response.json().await.ok()?;
        let place = payload.documents.into_iter().next()?;
        best_photo_url(place.photo?.photo_list)
    }

    fn name(&self) -> &'static str {
        "kakao"
    }
}

fn to_raw_place(document: KakaoDocument) -> Option<RawPlace> {
    // Coordinates arrive as strings; documents without usable ones are
    // dropped rather than guessed at.
    let lat = document.y.parse().ok()?;
    let lng = document.x.parse().ok()?;
    let distance_m = document.distance.parse().unwrap_or(0.0);

    let provider_id = if document.id.is_empty() {
        None
    } else {
        Some(document.id)
    };
    let phone = if document.phone.is_empty() {
        None
    } else {
        Some(document.phone)
    };

    Some(RawPlace {
        provider_id,
        name: document.place_name,
        lat,
        lng,
        address: document.address_name,
        road_address: document.road_address_name,
        phone,
        raw_category: document.category_name,
        distance_m,
        detail_url: document.place_url,
        // Kakao search results carry no rating
        rating: None,
        photo_url: None,
    })
}

fn best_photo_url(photos: Vec<KakaoPhotoItem>) -> Option<String> {
    photos
        .into_iter()
        .max_by_key(|photo| photo.width as u64 * photo.height as u64)
        .map(|photo| photo.originurl)
        .filter(|url| !url.is_empty())
}

// ============================================================================
// Kakao wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct KakaoSearchResponse {
    #[serde(default)]
    documents: Vec<KakaoDocument>,
}

#[derive(Debug, Deserialize)]
struct KakaoDocument {
    #[serde(default)]
    id: String,
    place_name: String,
    /// Longitude
    x: String,
    /// Latitude
    y: String,
    #[serde(default)]
    category_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address_name: String,
    #[serde(default)]
    road_address_name: String,
    #[serde(default)]
    distance: String,
    #[serde(default)]
    place_url: String,
}

#[derive(Debug, Deserialize)]
struct KakaoPlaceDetailResponse {
    #[serde(default)]
    documents: Vec<KakaoPlaceInfo>,
}

#[derive(Debug, Deserialize)]
struct KakaoPlaceInfo {
    photo: Option<KakaoPhotoList>,
}

#[derive(Debug, Deserialize)]
struct KakaoPhotoList {
    #[serde(rename = "photoList", default)]
    photo_list: Vec<KakaoPhotoItem>,
}

#[derive(Debug, Deserialize)]
struct KakaoPhotoItem {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    originurl: String,
}
