use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::PageMeta;

/// Freshness window for cached metadata, in days
pub const META_TTL_DAYS: i64 = 7;

/// Shortened window for all-empty triples, in hours, so a transient fetch
/// failure does not suppress retries for a week
pub const EMPTY_META_TTL_HOURS: i64 = 1;

const FETCH_TIMEOUT: StdDuration = StdDuration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fetches the title/description/image triple for an external detail URL
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<PageMeta>;
}

struct MetaEntry {
    meta: PageMeta,
    cached_at: DateTime<Utc>,
}

impl MetaEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let ttl = if self.meta.is_empty() {
            Duration::hours(EMPTY_META_TTL_HOURS)
        } else {
            Duration::days(META_TTL_DAYS)
        };
        now - self.cached_at < ttl
    }
}

/// Process-wide metadata cache keyed by external detail URL
///
/// Staleness is checked at read time; there is no background sweep. Racing
/// writers on the same key are tolerated, last write wins.
pub struct MetaCache {
    entries: RwLock<HashMap<String, MetaEntry>>,
    fetcher: Arc<dyn MetaFetcher>,
}

impl MetaCache {
    pub fn new(fetcher: Arc<dyn MetaFetcher>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fetcher,
        }
    }

    /// Returns the cached triple when fresh, otherwise fetches and stores.
    ///
    /// A fetch failure yields an all-empty triple which is still cached
    /// (under the shortened window) so a flapping upstream is not hammered.
    pub async fn get_or_fetch(&self, url: &str) -> PageMeta {
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(url) {
                if entry.is_fresh(now) {
                    tracing::debug!(url = %url, "Metadata cache hit");
                    return entry.meta.clone();
                }
                tracing::debug!(url = %url, "Metadata cache entry stale");
            }
        }

        let meta = match self.fetcher.fetch(url).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Metadata fetch failed");
                PageMeta::default()
            }
        };

        let mut entries = self.entries.write().await;
        entries.insert(
            url.to_string(),
            MetaEntry {
                meta: meta.clone(),
                cached_at: Utc::now(),
            },
        );

        meta
    }

    #[cfg(test)]
    async fn backdate(&self, url: &str, age: Duration) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(url) {
            entry.cached_at -= age;
        }
    }
}

/// Default fetcher: scrapes Open Graph meta tags from the detail page
pub struct OgFetcher {
    http_client: reqwest::Client,
}

impl OgFetcher {
    pub fn new() -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl MetaFetcher for OgFetcher {
    async fn fetch(&self, url: &str) -> AppResult<PageMeta> {
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Metadata page returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;

        Ok(PageMeta {
            title: extract_og_property(&body, "og:title"),
            description: extract_og_property(&body, "og:description"),
            image: extract_og_property(&body, "og:image"),
        })
    }
}

/// Pulls the `content` attribute of an `<meta property="og:...">` tag.
///
/// Deliberately narrow: Open Graph tags are flat meta elements, so scanning
/// the enclosing tag for a quoted `content` attribute is sufficient.
fn extract_og_property(html: &str, property: &str) -> String {
    for marker in [
        format!("property=\"{}\"", property),
        format!("property='{}'", property),
    ] {
        let Some(at) = html.find(&marker) else {
            continue;
        };

        let tag_start = html[..at].rfind('<').unwrap_or(0);
        let tag_end = html[at..]
            .find('>')
            .map(|end| at + end)
            .unwrap_or(html.len());
        let tag = &html[tag_start..tag_end];

        if let Some(content) = extract_quoted_attr(tag, "content=") {
            return content;
        }
    }

    String::new()
}

fn extract_quoted_attr(tag: &str, attr: &str) -> Option<String> {
    let at = tag.find(attr)? + attr.len();
    let rest = &tag[at..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[quote.len_utf8()..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}
