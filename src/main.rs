use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use noonpick::{
    cache::{MetaCache, OgFetcher},
    config::Config,
    models::RecommendationRequest,
    services::{
        enrich::Enricher,
        offices::InMemoryOfficeDirectory,
        providers::{google::GooglePlacesProvider, kakao::KakaoLocalProvider},
        recommend::RecommendationService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let search_timeout = Duration::from_secs(config.search_timeout_secs);

    let kakao = Arc::new(KakaoLocalProvider::new(
        config.kakao_rest_api_key.clone(),
        config.kakao_api_url.clone(),
        search_timeout,
    )?);
    let google = Arc::new(GooglePlacesProvider::new(
        config.google_places_api_key.clone(),
        config.google_api_url.clone(),
        search_timeout,
    )?);

    let meta_cache = Arc::new(MetaCache::new(Arc::new(OgFetcher::new()?)));
    let enricher = Enricher::new(meta_cache, kakao.clone(), google);
    let directory = Arc::new(InMemoryOfficeDirectory::with_defaults());

    let service = RecommendationService::new(directory, kakao, enricher)
        .with_deadline(Duration::from_secs(config.request_deadline_secs));

    let office = std::env::args().nth(1).unwrap_or_else(|| "seoul".to_string());
    let response = service.recommend(RecommendationRequest::new(office)).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
