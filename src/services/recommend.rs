use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{PlaceId, RecommendationRequest, RecommendationResponse},
    services::{
        consolidate::{consolidate, MIN_RATING},
        enrich::Enricher,
        offices::OfficeDirectory,
        providers::PlaceSearchProvider,
        sampling::{weighted_sample, SAMPLE_COUNT, TEMPERATURE},
        scoring::rank,
    },
};

/// Keyword-mode searches are capped to bound request latency
pub const MAX_KEYWORD_SEARCHES: usize = 3;

/// Wall-clock budget for one pipeline pass
pub const REQUEST_DEADLINE: Duration = Duration::from_secs(12);

/// One-pass recommendation pipeline: Search → Consolidate → Score → Sample
/// → Enrich
///
/// Requests run independently; the metadata cache inside the enricher is
/// the only state shared between them.
pub struct RecommendationService {
    directory: Arc<dyn OfficeDirectory>,
    search: Arc<dyn PlaceSearchProvider>,
    enricher: Enricher,
    deadline: Duration,
    sample_count: usize,
    temperature: f64,
}

impl RecommendationService {
    pub fn new(
        directory: Arc<dyn OfficeDirectory>,
        search: Arc<dyn PlaceSearchProvider>,
        enricher: Enricher,
    ) -> Self {
        Self {
            directory,
            search,
            enricher,
            deadline: REQUEST_DEADLINE,
            sample_count: SAMPLE_COUNT,
            temperature: TEMPERATURE,
        }
    }

    /// Overrides the request deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Overrides sampling parameters.
    pub fn with_sampling(mut self, sample_count: usize, temperature: f64) -> Self {
        self.sample_count = sample_count;
        self.temperature = temperature;
        self
    }

    pub async fn recommend(
        &self,
        request: RecommendationRequest,
    ) -> AppResult<RecommendationResponse> {
        self.recommend_with_rng(request, &mut StdRng::from_entropy())
            .await
    }

    /// Pipeline entry with an injected RNG, for deterministic callers.
    pub async fn recommend_with_rng<R: Rng>(
        &self,
        request: RecommendationRequest,
        rng: &mut R,
    ) -> AppResult<RecommendationResponse> {
        let request_id = Uuid::new_v4();
        let deadline = Instant::now() + self.deadline;

        tracing::info!(
            request_id = %request_id,
            office = %request.office,
            radius_m = request.radius_m,
            categories = request.categories.len(),
            excluded = request.exclude.len(),
            "Recommendation requested"
        );

        let office = self
            .directory
            .find(&request.office)
            .await
            .ok_or_else(|| AppError::OfficeNotFound(request.office.clone()))?;

        // One category-mode search plus up to three keyword-mode searches
        // derived from the caller's selected tags.
        let mut batches = Vec::with_capacity(1 + MAX_KEYWORD_SEARCHES);
        batches.push(
            self.search
                .search_nearby(office.location, request.radius_m)
                .await,
        );
        for category in request.categories.iter().take(MAX_KEYWORD_SEARCHES) {
            batches.push(
                self.search
                    .search_keyword(office.location, request.radius_m, category.search_keyword())
                    .await,
            );
        }

        let pool = consolidate(batches, &request.exclude, MIN_RATING);
        let ranked = rank(pool, request.radius_m, &request.categories);
        let sampled = weighted_sample(ranked, self.sample_count, self.temperature, rng);

        if sampled.is_empty() {
            tracing::info!(request_id = %request_id, "No candidates after filtering");
            return Err(AppError::NoCandidates);
        }

        let enriched = self.enricher.enrich(sampled, deadline).await;

        let picked_ids: Vec<PlaceId> = enriched
            .iter()
            .map(|winner| winner.candidate.id.clone())
            .collect();
        let mut excluded_suggestion: Vec<PlaceId> = request.exclude.iter().cloned().collect();
        excluded_suggestion.extend(picked_ids);

        let mut winners = enriched.into_iter();
        let primary = winners.next().ok_or(AppError::NoCandidates)?;
        let alternatives: Vec<_> = winners.collect();

        tracing::info!(
            request_id = %request_id,
            primary = %primary.candidate.name,
            alternatives = alternatives.len(),
            "Recommendation completed"
        );

        Ok(RecommendationResponse {
            primary,
            alternatives,
            excluded_suggestion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MetaCache, MetaFetcher};
    use crate::models::{Category, LatLng, Office, PageMeta, RawPlace};
    use crate::services::providers::PhotoSource;
    use std::collections::HashSet;

    struct EmptyFetcher;

    #[async_trait::async_trait]
    impl MetaFetcher for EmptyFetcher {
        async fn fetch(&self, _url: &str) -> AppResult<PageMeta> {
            Ok(PageMeta::default())
        }
    }

    struct NoPhotos;

    #[async_trait::async_trait]
    impl PhotoSource for NoPhotos {
        fn name(&self) -> &'static str {
            "none"
        }
    }

    struct StubSearch {
        nearby: Vec<RawPlace>,
        keyword: Vec<RawPlace>,
    }

    #[async_trait::async_trait]
    impl PlaceSearchProvider for StubSearch {
        async fn search_nearby(&self, _center: LatLng, _radius_m: u32) -> Vec<RawPlace> {
            self.nearby.clone()
        }

        async fn search_keyword(
            &self,
            _center: LatLng,
            _radius_m: u32,
            _keyword: &str,
        ) -> Vec<RawPlace> {
            self.keyword.clone()
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    struct SeoulOnly;

    #[async_trait::async_trait]
    impl OfficeDirectory for SeoulOnly {
        async fn find(&self, code: &str) -> Option<Office> {
            (code == "seoul").then(|| Office {
                code: "seoul".to_string(),
                name: "Seoul Office".to_string(),
                location: LatLng {
                    lat: 37.5093056,
                    lng: 127.0610611,
                },
            })
        }
    }

    fn raw(id: &str, distance_m: f64) -> RawPlace {
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
            rating: None,
            photo_url: None,
        }
    }

    fn service(nearby: Vec<RawPlace>, keyword: Vec<RawPlace>) -> RecommendationService {
        let cache = Arc::new(MetaCache::new(Arc::new(EmptyFetcher)));
        let enricher = Enricher::new(cache, Arc::new(NoPhotos), Arc::new(NoPhotos));
        RecommendationService::new(
            Arc::new(SeoulOnly),
            Arc::new(StubSearch { nearby, keyword }),
            enricher,
        )
    }

    #[tokio::test]
    async fn test_unknown_office_is_distinct_error() {
        let service = service(vec![raw("1", 100.0)], Vec::new());
        let mut request = RecommendationRequest::new("busan");
        request.radius_m = 300;

        let err = service
            .recommend_with_rng(request, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::OfficeNotFound(code) if code == "busan"));
    }

    #[tokio::test]
    async fn test_empty_search_is_no_candidates() {
        let service = service(Vec::new(), Vec::new());

        let err = service
            .recommend_with_rng(
                RecommendationRequest::new("seoul"),
                &mut StdRng::seed_from_u64(1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoCandidates));
    }

    #[tokio::test]
    async fn test_keyword_batches_merge_into_pool() {
        let service = service(vec![raw("1", 100.0)], vec![raw("2", 150.0)]);
        let mut request = RecommendationRequest::new("seoul");
        request.categories = vec![Category::Korean];

        let response = service
            .recommend_with_rng(request, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();

        let mut returned: Vec<String> = std::iter::once(&response.primary)
            .chain(response.alternatives.iter())
            .map(|winner| winner.candidate.id.to_string())
            .collect();
        returned.sort();
        assert_eq!(returned, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_excluded_suggestion_unions_returned_ids() {
        let service = service(vec![raw("1", 100.0), raw("2", 150.0)], Vec::new());
        let mut request = RecommendationRequest::new("seoul");
        request.exclude = HashSet::from([PlaceId::Provider("9".to_string())]);

        let response = service
            .recommend_with_rng(request, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();

        let suggestion: HashSet<String> = response
            .excluded_suggestion
            .iter()
            .map(PlaceId::to_string)
            .collect();
        assert!(suggestion.contains("9"));
        assert!(suggestion.contains(&response.primary.candidate.id.to_string()));
        for alternative in &response.alternatives {
            assert!(suggestion.contains(&alternative.candidate.id.to_string()));
        }
    }
}
