use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{timeout, Instant};

use crate::cache::MetaCache;
use crate::models::{Candidate, Category, PageMeta, PlaceId, ScoredCandidate};
use crate::services::providers::PhotoSource;

/// Worker pool size for the enrichment fan-out
pub const ENRICH_CONCURRENCY: usize = 3;

/// Budget per enriched candidate; a slow item degrades to fallbacks rather
/// than blocking the batch
pub const ITEM_TIMEOUT: Duration = Duration::from_secs(5);

/// Last-resort image when no photo source and no category tag applies
pub const DEFAULT_PHOTO: &str =
    "https://images.unsplash.com/photo-1551218808-94e220e084d2?w=300&h=200&fit=crop";

/// Attaches photos and title/description metadata to the sampled winners.
///
/// Only winners are enriched, never the full pool; external call volume is
/// bounded by the sample size, the worker pool, and per-item timeouts.
#[derive(Clone)]
pub struct Enricher {
    meta_cache: Arc<MetaCache>,
    primary_photos: Arc<dyn PhotoSource>,
    secondary_photos: Arc<dyn PhotoSource>,
    concurrency: usize,
    item_timeout: Duration,
}

impl Enricher {
    pub fn new(
        meta_cache: Arc<MetaCache>,
        primary_photos: Arc<dyn PhotoSource>,
        secondary_photos: Arc<dyn PhotoSource>,
    ) -> Self {
        Self {
            meta_cache,
            primary_photos,
            secondary_photos,
            concurrency: ENRICH_CONCURRENCY,
            item_timeout: ITEM_TIMEOUT,
        }
    }

    /// Overrides the worker pool size and per-item budget.
    pub fn with_limits(mut self, concurrency: usize, item_timeout: Duration) -> Self {
        self.concurrency = concurrency.max(1);
        self.item_timeout = item_timeout;
        self
    }

    /// Enriches the sampled winners in parallel under `deadline`.
    ///
    /// Results keep the input order and count: a timed-out, failed, or
    /// past-deadline item falls back to stock imagery and synthesized
    /// metadata instead of being dropped.
    pub async fn enrich(
        &self,
        winners: Vec<ScoredCandidate>,
        deadline: Instant,
    ) -> Vec<ScoredCandidate> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(winners.len());

        for winner in winners {
            let semaphore = semaphore.clone();
            let worker = self.clone();
            let fallback_copy = winner.clone();
            let task = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                worker.enrich_one(winner, deadline).await
            });
            tasks.push((fallback_copy, task));
        }

        let mut enriched = Vec::with_capacity(tasks.len());
        for (fallback_copy, task) in tasks {
            match task.await {
                Ok(winner) => enriched.push(winner),
                Err(e) => {
                    tracing::error!(error = %e, "Enrichment task join error");
                    enriched.push(self.fallback(fallback_copy));
                }
            }
        }

        enriched
    }

    async fn enrich_one(&self, winner: ScoredCandidate, deadline: Instant) -> ScoredCandidate {
        let budget = self
            .item_timeout
            .min(deadline.saturating_duration_since(Instant::now()));
        if budget.is_zero() {
            tracing::warn!(
                place = %winner.candidate.id,
                "Request deadline reached, enriching from fallbacks"
            );
            return self.fallback(winner);
        }

        match timeout(budget, self.fetch_parts(&winner.candidate)).await {
            Ok((photo_url, meta)) => {
                let mut winner = winner;
                winner.candidate.photo_url = Some(photo_url);
                winner.meta = Some(fill_meta(&winner.candidate, meta));
                winner
            }
            Err(_) => {
                tracing::warn!(
                    place = %winner.candidate.id,
                    budget_ms = budget.as_millis() as u64,
                    "Enrichment timed out, using fallbacks"
                );
                self.fallback(winner)
            }
        }
    }

    async fn fetch_parts(&self, candidate: &Candidate) -> (String, PageMeta) {
        tokio::join!(self.resolve_photo(candidate), self.resolve_meta(candidate))
    }

    /// Photo fallback chain, first success wins: existing URL, primary
    /// provider by place id, secondary provider by name+coordinates, stock
    /// image by first tag, default image.
    async fn resolve_photo(&self, candidate: &Candidate) -> String {
        if let Some(existing) = &candidate.photo_url {
            return existing.clone();
        }

        if let PlaceId::Provider(place_id) = &candidate.id {
            if let Some(url) = self.primary_photos.photo_by_place_id(place_id).await {
                return url;
            }
        }

        if let Some(url) = self
            .secondary_photos
            .photo_by_location(&candidate.name, candidate.lat, candidate.lng)
            .await
        {
            return url;
        }

        stock_photo(&candidate.categories)
            .unwrap_or(DEFAULT_PHOTO)
            .to_string()
    }

    async fn resolve_meta(&self, candidate: &Candidate) -> PageMeta {
        if candidate.detail_url.is_empty() {
            return PageMeta::default();
        }
        self.meta_cache.get_or_fetch(&candidate.detail_url).await
    }

    fn fallback(&self, mut winner: ScoredCandidate) -> ScoredCandidate {
        let photo_url = winner.candidate.photo_url.clone().unwrap_or_else(|| {
            stock_photo(&winner.candidate.categories)
                .unwrap_or(DEFAULT_PHOTO)
                .to_string()
        });
        winner.candidate.photo_url = Some(photo_url);
        winner.meta = Some(synthesized_meta(&winner.candidate));
        winner
    }
}

/// Fills blank fetched fields from the candidate's own attributes, so the
/// caller never renders an empty title or description.
fn fill_meta(candidate: &Candidate, fetched: PageMeta) -> PageMeta {
    let synthesized = synthesized_meta(candidate);
    PageMeta {
        title: if fetched.title.is_empty() {
            synthesized.title
        } else {
            fetched.title
        },
        description: if fetched.description.is_empty() {
            synthesized.description
        } else {
            fetched.description
        },
        image: fetched.image,
    }
}

fn synthesized_meta(candidate: &Candidate) -> PageMeta {
    let address = if candidate.road_address.is_empty() {
        candidate.address.as_str()
    } else {
        candidate.road_address.as_str()
    };
    let tags = candidate
        .categories
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join("/");

    let description = match (address.is_empty(), tags.is_empty()) {
        (false, false) => format!("{} · {}", address, tags),
        (false, true) => address.to_string(),
        (true, false) => tags,
        (true, true) => String::new(),
    };

    PageMeta {
        title: candidate.name.clone(),
        description,
        image: String::new(),
    }
}

/// Category-to-stock-image table, keyed by the first matching tag
fn stock_photo(categories: &[Category]) -> Option<&'static str> {
    categories.first().map(|category| match category {
        Category::Korean => {
            "https://images.unsplash.com/photo-1551218808-94e220e084d2?w=300&h=200&fit=crop"
        }
        Category::Japanese => {
            "https://images.unsplash.com/photo-1579952363873-27d3bfad9c0d?w=300&h=200&fit=crop"
        }
        Category::Chinese => {
            "https://images.unsplash.com/photo-1563379091339-03246963d4d4?w=300&h=200&fit=crop"
        }
        Category::Western => {
            "https://images.unsplash.com/photo-1551782450-17144efb9c50?w=300&h=200&fit=crop"
        }
        Category::Meat => {
            "https://images.unsplash.com/photo-1529692236671-f1f6cf9683ba?w=300&h=200&fit=crop"
        }
        Category::Soup => {
            "https://images.unsplash.com/photo-1547592180-85f173990554?w=300&h=200&fit=crop"
        }
        Category::Noodle => {
            "https://images.unsplash.com/photo-1569718212165-3a8278d5f624?w=300&h=200&fit=crop"
        }
        Category::Rice => {
            "https://images.unsplash.com/photo-1512058564366-18510be2db19?w=300&h=200&fit=crop"
        }
        Category::Cafe => {
            "https://images.unsplash.com/photo-1501339847302-ac426a4a7cbb?w=300&h=200&fit=crop"
        }
    })
}
