use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::CrisisError;

/// TOML-backed tunables for the enrichment pipeline.
/// Every section and field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub news: NewsConfig,
    pub timeouts: TimeoutConfig,
    pub classifier: ClassifierConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewsConfig {
    /// Regional qualifier appended to every enrichment query.
    pub region: String,
    pub language: String,
    pub enrich_days_back: u32,
    pub enrich_page_size: u32,
    pub max_articles: usize,
    pub trending_topics: Vec<String>,
    pub trending_days_back: u32,
    pub trending_page_size: u32,
    pub trending_latest: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            region: "india".to_string(),
            language: "en".to_string(),
            enrich_days_back: 3,
            enrich_page_size: 5,
            max_articles: 3,
            trending_topics: vec![
                "india disaster".to_string(),
                "india flood".to_string(),
                "india earthquake".to_string(),
                "india cyclone".to_string(),
                "india emergency".to_string(),
            ],
            trending_days_back: 1,
            trending_page_size: 10,
            trending_latest: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    pub classification_secs: u64,
    pub news_secs: u64,
    pub storage_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            classification_secs: 30,
            news_secs: 30,
            storage_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    pub temperature: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { temperature: 0.3 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub list_limit: i64,
    pub near_limit: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            list_limit: 100,
            near_limit: 50,
        }
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Load the file at `path` if given, defaults otherwise.
/// Unreadable or invalid files are a `CrisisError::Config`.
pub fn load_or_default(path: Option<&Path>) -> crate::Result<FileConfig> {
    match path {
        Some(path) => load_config(path).map_err(|e| CrisisError::Config(format!("{e:#}"))),
        None => Ok(FileConfig::default()),
    }
}
