pub mod error;
pub mod types;

pub use error::{NewsError, Result};
pub use types::{EverythingQuery, EverythingResponse, RawArticle, RawSource};

use std::time::Duration;

const BASE_URL: &str = "https://newsapi.org/v2";

pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Search all indexed articles. Non-200 responses and `status != "ok"` bodies are errors.
    pub async fn everything(&self, query: &EverythingQuery) -> Result<EverythingResponse> {
        tracing::info!(q = %query.q, page_size = query.page_size, "NewsAPI everything search");

        let url = format!("{}/everything", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&query.params())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NewsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: EverythingResponse = resp.json().await?;
        if !body.is_ok() {
            return Err(NewsError::Api {
                status: status.as_u16(),
                message: body
                    .message
                    .unwrap_or_else(|| format!("status {}", body.status)),
            });
        }

        tracing::debug!(
            q = %query.q,
            total_results = body.total_results,
            returned = body.articles.len(),
            "NewsAPI search complete"
        );
        Ok(body)
    }
}
