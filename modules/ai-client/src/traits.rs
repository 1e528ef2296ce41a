use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Message Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// =============================================================================
// ChatAgent Trait
// =============================================================================

/// A provider that turns a conversation into a single text completion.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    async fn chat(&self, messages: Vec<Message>) -> Result<String>;

    /// One system instruction plus one user turn.
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.chat(vec![Message::system(system), Message::user(user)])
            .await
    }
}
