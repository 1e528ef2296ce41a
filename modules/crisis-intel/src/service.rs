use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crisis_common::{AnalysisResult, CrisisError, CrisisEvent, FileConfig, NewEvent, Result};

use crate::classifier::Classifier;
use crate::deps::Deps;
use crate::news::{NewsEnricher, NewsFeed, TrendingTopic};
use crate::pipeline::EnrichmentPipeline;
use crate::proximity::ProximitySearch;
use crate::seed::{SeedLoader, SeedOutcome};
use crate::traits::EventStore;
use crate::util::bounded;

/// Everything the outer layers can ask of the enrichment core.
pub struct CrisisIntel {
    pipeline: Arc<EnrichmentPipeline>,
    news: Option<Arc<NewsEnricher>>,
    proximity: ProximitySearch,
    seeder: SeedLoader,
    store: Arc<dyn EventStore>,
    config: Arc<FileConfig>,
}

impl CrisisIntel {
    pub fn new(deps: Deps) -> Self {
        let timeouts = &deps.config.timeouts;
        let storage_timeout = Duration::from_secs(timeouts.storage_secs);

        let classifier = Classifier::new(
            deps.reasoning.clone(),
            Duration::from_secs(timeouts.classification_secs),
        );
        let news = deps.news.clone().map(|source| {
            Arc::new(NewsEnricher::new(
                source,
                deps.config.news.clone(),
                Duration::from_secs(timeouts.news_secs),
            ))
        });
        let pipeline = Arc::new(EnrichmentPipeline::new(
            classifier,
            news.clone(),
            deps.store.clone(),
            storage_timeout,
        ));

        Self {
            proximity: ProximitySearch::new(
                deps.store.clone(),
                deps.config.store.near_limit,
                storage_timeout,
            ),
            seeder: SeedLoader::new(pipeline.clone(), deps.store.clone(), storage_timeout),
            pipeline,
            news,
            store: deps.store,
            config: deps.config,
        }
    }

    fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeouts.storage_secs)
    }

    pub async fn create(&self, submission: NewEvent) -> Result<CrisisEvent> {
        self.pipeline.create(submission).await
    }

    /// Most recent first.
    pub async fn get_all(&self) -> Result<Vec<CrisisEvent>> {
        bounded(
            self.storage_timeout(),
            "event listing",
            self.store.find_all(self.config.store.list_limit),
        )
        .await
        .map_err(|e| CrisisError::Storage(e.to_string()))
    }

    /// Ids that are not UUIDs cannot exist, so they are reported as not found.
    pub async fn get_by_id(&self, id: &str) -> Result<CrisisEvent> {
        let uuid = Uuid::parse_str(id.trim()).map_err(|_| CrisisError::NotFound(id.to_string()))?;

        bounded(
            self.storage_timeout(),
            "event lookup",
            self.store.find_by_id(uuid),
        )
        .await
        .map_err(|e| CrisisError::Storage(e.to_string()))?
        .ok_or_else(|| CrisisError::NotFound(id.to_string()))
    }

    pub async fn analyze_only(&self, text: &str, location: Option<&str>) -> AnalysisResult {
        self.pipeline.analyze_only(text, location).await
    }

    pub async fn near(&self, latitude: f64, longitude: f64, radius_km: f64) -> Result<Vec<CrisisEvent>> {
        self.proximity.near(latitude, longitude, radius_km).await
    }

    pub async fn news_for(&self, query: &str, days_back: u32, limit: u32) -> Result<NewsFeed> {
        self.news_enricher()?
            .news_for(query, days_back, limit)
            .await
    }

    /// Empty when news search is not configured.
    pub async fn trending(&self) -> Vec<TrendingTopic> {
        match &self.news {
            Some(news) => news.trending().await,
            None => Vec::new(),
        }
    }

    pub async fn seed(&self) -> Result<SeedOutcome> {
        self.seeder.seed().await
    }

    pub fn news_enricher(&self) -> Result<&NewsEnricher> {
        self.news
            .as_deref()
            .ok_or_else(|| CrisisError::News("news search is not configured".into()))
    }
}
