// Trait abstractions for the enrichment pipeline's external collaborators.
//
// ReasoningService wraps the LLM classifier backend (ai_client::OpenAi).
// NewsSource wraps the news search API (news_client::NewsApiClient).
// EventStore wraps the document store (PgEventStore).
//
// The mocks in `testing` implement the same traits, so the whole pipeline
// runs in tests without network or database.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use ai_client::ChatAgent;
use crisis_common::CrisisEvent;
use news_client::{EverythingQuery, NewsApiClient, RawArticle};

use crate::geo::BoundingBox;

// ---------------------------------------------------------------------------
// ReasoningService
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// One system instruction, one user prompt, one text reply.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[async_trait]
impl ReasoningService for ai_client::OpenAi {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        ChatAgent::complete(self, system, user).await
    }
}

// ---------------------------------------------------------------------------
// NewsSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub language: String,
    pub days_back: u32,
    pub page_size: u32,
}

/// One page of results, newest first, exactly as the service returned them.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub articles: Vec<RawArticle>,
    pub total_results: u64,
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Search articles published within the last `days_back` days, sorted by recency.
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let query = EverythingQuery::recent(&request.query, request.days_back, request.page_size)?
            .language(&request.language);
        let response = self.everything(&query).await?;
        Ok(SearchPage {
            articles: response.articles,
            total_results: response.total_results,
        })
    }
}

// ---------------------------------------------------------------------------
// EventStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a single event document.
    async fn insert(&self, event: &CrisisEvent) -> Result<()>;

    /// Most recent first, capped at `limit`.
    async fn find_all(&self, limit: i64) -> Result<Vec<CrisisEvent>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrisisEvent>>;

    /// Total number of stored events.
    async fn count(&self) -> Result<i64>;

    /// Events whose latitude and longitude both fall inside `bbox` (inclusive).
    async fn find_in_box(&self, bbox: &BoundingBox, limit: i64) -> Result<Vec<CrisisEvent>>;
}
