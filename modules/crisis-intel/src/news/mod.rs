// News enrichment: query construction, search, normalization, trending topics.
//
// News absence is never a correctness failure for event creation: `enrich`
// degrades to zero articles. The news-specific operations (`search`,
// `news_for`) surface the failure to their caller.

mod query;

pub use query::QueryBuilder;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crisis_common::file_config::NewsConfig;
use crisis_common::{CrisisError, EventType, NewsArticle};
use news_client::RawArticle;

use crate::traits::{NewsSource, SearchRequest};
use crate::util::bounded;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Ok,
    Error(String),
}

/// Result of one news search. An error status always carries an empty result set.
#[derive(Debug, Clone, Serialize)]
pub struct NewsSearch {
    pub status: SearchStatus,
    pub articles: Vec<NewsArticle>,
    pub total_results: u64,
}

impl NewsSearch {
    fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: SearchStatus::Error(reason.into()),
            articles: Vec::new(),
            total_results: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == SearchStatus::Ok
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsFeed {
    pub articles: Vec<NewsArticle>,
    pub total_results: u64,
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingTopic {
    pub topic: String,
    pub article_count: u64,
    pub latest_articles: Vec<NewsArticle>,
}

pub struct NewsEnricher {
    source: Arc<dyn NewsSource>,
    queries: QueryBuilder,
    config: NewsConfig,
    timeout: Duration,
}

impl NewsEnricher {
    pub fn new(source: Arc<dyn NewsSource>, config: NewsConfig, timeout: Duration) -> Self {
        Self {
            source,
            queries: QueryBuilder::new(config.region.clone()),
            config,
            timeout,
        }
    }

    pub fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    /// Search the window `[now - days_back, now]`, newest first.
    pub async fn search(&self, query: &str, days_back: u32, page_size: u32) -> NewsSearch {
        let request = SearchRequest {
            query: query.to_string(),
            language: self.config.language.clone(),
            days_back,
            page_size,
        };

        match bounded(self.timeout, "news search", self.source.search(&request)).await {
            Ok(page) => {
                let returned = page.articles.len();
                let articles: Vec<NewsArticle> =
                    page.articles.into_iter().filter_map(normalize).collect();
                info!(
                    query,
                    returned,
                    kept = articles.len(),
                    total_results = page.total_results,
                    "News search complete"
                );
                NewsSearch {
                    status: SearchStatus::Ok,
                    articles,
                    total_results: page.total_results,
                }
            }
            Err(e) => {
                warn!(query, error = %e, "News search failed");
                NewsSearch::failed(e.to_string())
            }
        }
    }

    /// Up to `max_articles` recent articles for a classified event. Empty on any failure.
    pub async fn enrich(&self, event_type: EventType, location: &str) -> Vec<NewsArticle> {
        let query = self.queries.build_query(event_type, location);
        let mut search = self
            .search(
                &query,
                self.config.enrich_days_back,
                self.config.enrich_page_size,
            )
            .await;
        search.articles.truncate(self.config.max_articles);
        search.articles
    }

    /// Free-form news lookup, capped at `limit` articles.
    pub async fn news_for(
        &self,
        query: &str,
        days_back: u32,
        limit: u32,
    ) -> crisis_common::Result<NewsFeed> {
        let mut search = self.search(query, days_back, limit).await;
        if let SearchStatus::Error(reason) = search.status {
            return Err(CrisisError::News(reason));
        }
        search.articles.truncate(limit as usize);
        Ok(NewsFeed {
            articles: search.articles,
            total_results: search.total_results,
            query: query.to_string(),
        })
    }

    /// Coverage for each configured topic, in configured order. Topics with no
    /// results, or whose search failed, are left out.
    pub async fn trending(&self) -> Vec<TrendingTopic> {
        let searches = self.config.trending_topics.iter().map(|topic| async move {
            let search = self
                .search(
                    topic,
                    self.config.trending_days_back,
                    self.config.trending_page_size,
                )
                .await;
            (topic, search)
        });

        join_all(searches)
            .await
            .into_iter()
            .filter(|(_, search)| search.is_ok() && !search.articles.is_empty())
            .map(|(topic, mut search)| {
                search.articles.truncate(self.config.trending_latest);
                TrendingTopic {
                    topic: topic.clone(),
                    article_count: search.total_results,
                    latest_articles: search.articles,
                }
            })
            .collect()
    }
}

/// Denormalize a service article. Articles without a title or url are dropped.
pub fn normalize(raw: RawArticle) -> Option<NewsArticle> {
    let title = raw.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
    let url = raw.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;

    Some(NewsArticle {
        title,
        description: raw.description.unwrap_or_default(),
        url,
        source: raw.source.name.unwrap_or_default(),
        published_at: raw.published_at.as_deref().and_then(parse_timestamp),
        image_url: raw.url_to_image.filter(|u| !u.is_empty()),
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
