use crate::error::AppResult;
use crate::models::PlaceId;

/// Sink for recording which candidate a user ultimately chose
///
/// Storage belongs to the caller; the pipeline only hands over the chosen
/// identity and display name.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VisitSink: Send + Sync {
    async fn record_visit(&self, place: &PlaceId, name: &str) -> AppResult<()>;
}

/// Visit sink that only emits a structured log line
pub struct LogVisitSink;

#[async_trait::async_trait]
impl VisitSink for LogVisitSink {
    async fn record_visit(&self, place: &PlaceId, name: &str) -> AppResult<()> {
        tracing::info!(place = %place, name = %name, "Visit recorded");
        Ok(())
    }
}
