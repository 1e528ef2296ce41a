use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NewsError, Result};

/// Newest first. The only order the enrichment queries use.
const SORT_BY_PUBLISHED_AT: &str = "publishedAt";

/// Query for `GET /v2/everything`.
#[derive(Debug, Clone)]
pub struct EverythingQuery {
    pub q: String,
    pub language: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub page_size: u32,
}

impl EverythingQuery {
    /// Articles matching `q` published in the last `days_back` days, newest first.
    ///
    /// A window reaching past the representable date range is an `InvalidQuery`.
    pub fn recent(q: impl Into<String>, days_back: u32, page_size: u32) -> Result<Self> {
        let to = Utc::now();
        let from = TimeDelta::try_days(i64::from(days_back))
            .and_then(|window| to.checked_sub_signed(window))
            .ok_or_else(|| {
                NewsError::InvalidQuery(format!("days_back out of range: {days_back}"))
            })?;

        Ok(Self {
            q: q.into(),
            language: "en".to_string(),
            from,
            to,
            page_size,
        })
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.q.clone()),
            ("language", self.language.clone()),
            ("sortBy", SORT_BY_PUBLISHED_AT.to_string()),
            ("from", self.from.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ("to", self.to.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ("pageSize", self.page_size.to_string()),
        ]
    }
}

/// Body returned by the `everything` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EverythingResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EverythingResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Article exactly as the service returns it. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: RawSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
