use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrisisError>;

#[derive(Error, Debug)]
pub enum CrisisError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic persistence failure surfaced by event creation. The reason is
    /// logged, not rendered.
    #[error("Failed to create crisis event")]
    CreateFailed(String),

    #[error("News search error: {0}")]
    News(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CrisisError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CrisisError::NotFound(_))
    }
}
