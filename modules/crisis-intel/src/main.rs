use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use crisis_common::{file_config, AppConfig, NewEvent};
use crisis_intel::{CrisisIntel, Deps, NewsSource, PgEventStore};
use news_client::NewsApiClient;

#[derive(Parser)]
#[command(name = "crisis-intel")]
#[command(about = "Crisis event enrichment: classify, attach news, store, search")]
#[command(version)]
struct Cli {
    /// TOML file with pipeline tunables (overrides CRISIS_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify, enrich and store a new crisis report
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        location: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// List stored events, most recent first
    List,

    /// Show one event by id
    Show { id: String },

    /// Classify free text without storing anything
    Analyze {
        text: String,
        #[arg(long)]
        location: Option<String>,
    },

    /// Events within roughly `radius` km of a point
    Near {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, default_value_t = 50.0)]
        radius: f64,
    },

    /// Recent news for a query, or for an event type at a location
    News {
        #[arg(long, conflicts_with = "event_type")]
        query: Option<String>,
        #[arg(long, requires = "location")]
        event_type: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Coverage for the configured trending topics
    Trending,

    /// Load the demonstration events into an empty store
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("crisis_intel=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let config_path = cli.config.or(config.config_path.clone());
    let file_config = Arc::new(file_config::load_or_default(config_path.as_deref())?);

    let store = PgEventStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let reasoning = OpenAi::new(config.openai_api_key.clone(), config.openai_model.clone())
        .with_temperature(file_config.classifier.temperature)
        .with_timeout(Duration::from_secs(file_config.timeouts.classification_secs));

    let news: Option<Arc<dyn NewsSource>> = match &config.news_api_key {
        Some(key) => {
            info!("News enrichment enabled");
            Some(Arc::new(
                NewsApiClient::new(key.clone())
                    .with_timeout(Duration::from_secs(file_config.timeouts.news_secs)),
            ))
        }
        None => {
            info!("No NEWS_API_KEY set, news enrichment disabled");
            None
        }
    };

    let intel = CrisisIntel::new(Deps::new(
        Arc::new(reasoning),
        news,
        Arc::new(store),
        file_config,
    ));

    match cli.command {
        Commands::Create {
            title,
            description,
            location,
            lat,
            lng,
        } => {
            let event = intel
                .create(NewEvent::new(title, description, location, lat, lng))
                .await?;
            print_json(&event)
        }
        Commands::List => print_json(&intel.get_all().await?),
        Commands::Show { id } => print_json(&intel.get_by_id(&id).await?),
        Commands::Analyze { text, location } => {
            print_json(&intel.analyze_only(&text, location.as_deref()).await)
        }
        Commands::Near { lat, lng, radius } => print_json(&intel.near(lat, lng, radius).await?),
        Commands::News {
            query,
            event_type,
            location,
            days,
            limit,
        } => {
            let query = match (query, event_type) {
                (Some(query), _) => query,
                (None, Some(label)) => intel
                    .news_enricher()?
                    .queries()
                    .build_query_for_label(&label, location.as_deref().unwrap_or_default()),
                (None, None) => anyhow::bail!("either --query or --event-type is required"),
            };
            print_json(&intel.news_for(&query, days, limit).await?)
        }
        Commands::Trending => print_json(&intel.trending().await),
        Commands::Seed => {
            let outcome = intel.seed().await?;
            info!("{}", outcome.message());
            print_json(&outcome)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
