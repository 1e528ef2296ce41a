use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crisis_common::{AnalysisResult, CrisisError, CrisisEvent, NewEvent, Result};

use crate::classifier::Classifier;
use crate::news::NewsEnricher;
use crate::traits::EventStore;
use crate::util::bounded;

/// Classify, attach news, persist. Strictly sequential: the news query depends
/// on the classification.
pub struct EnrichmentPipeline {
    classifier: Classifier,
    news: Option<Arc<NewsEnricher>>,
    store: Arc<dyn EventStore>,
    store_timeout: Duration,
}

impl EnrichmentPipeline {
    /// Without a news enricher every event is created with no articles.
    pub fn new(
        classifier: Classifier,
        news: Option<Arc<NewsEnricher>>,
        store: Arc<dyn EventStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            news,
            store,
            store_timeout,
        }
    }

    /// Build and persist an enriched event from a raw submission.
    ///
    /// Classification and news never fail this call; only validation and
    /// persistence do. Nothing is written unless the whole record is.
    pub async fn create(&self, submission: NewEvent) -> Result<CrisisEvent> {
        submission.validate()?;

        let analysis = self
            .classifier
            .classify(
                &submission.title,
                &submission.description,
                &submission.location,
            )
            .await;

        let articles = match &self.news {
            Some(news) => news.enrich(analysis.event_type, &submission.location).await,
            None => Vec::new(),
        };

        let event = CrisisEvent::assemble(submission, analysis, articles);

        if let Err(e) = bounded(self.store_timeout, "event insert", self.store.insert(&event)).await
        {
            warn!(title = %event.title, error = %e, "Failed to persist crisis event");
            return Err(CrisisError::CreateFailed(e.to_string()));
        }

        info!(
            id = %event.id,
            event_type = %event.event_type,
            severity = %event.severity,
            articles = event.news_articles.len(),
            "Created crisis event"
        );
        Ok(event)
    }

    /// Classification alone, nothing persisted.
    pub async fn analyze_only(&self, text: &str, location: Option<&str>) -> AnalysisResult {
        self.classifier
            .classify("", text, location.unwrap_or_default())
            .await
    }
}
