mod client;
pub(crate) mod types;

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::{ChatAgent, Message};
use client::{OpenAiClient, OPENAI_API_URL};

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    temperature: Option<f32>,
    timeout: Option<Duration>,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
            timeout: None,
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sampling temperature. Ignored for models that only accept the default.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Per-request timeout applied to every call this agent makes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> OpenAiClient<'_> {
        let base_url = self.base_url.as_deref().unwrap_or(OPENAI_API_URL);
        OpenAiClient::new(&self.api_key, &self.http, base_url).with_timeout(self.timeout)
    }

    fn request(&self, messages: &[Message]) -> types::ChatRequest {
        let mut request = types::ChatRequest::new(&self.model);
        for message in messages {
            request = request.message(message.into());
        }

        if types::uses_max_completion_tokens(&self.model) {
            request.max_completion_tokens(4096)
        } else {
            request
                .max_tokens(4096)
                .temperature(self.temperature.unwrap_or(0.0))
        }
    }
}

#[async_trait]
impl ChatAgent for OpenAi {
    async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        let request = self.request(&messages);
        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from OpenAI"))
    }
}
