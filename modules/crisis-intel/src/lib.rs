pub mod classifier;
pub mod deps;
pub mod geo;
pub mod news;
pub mod pipeline;
pub mod proximity;
pub mod seed;
pub mod service;
pub mod store;
pub mod traits;
mod util;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifier::Classifier;
pub use deps::Deps;
pub use geo::BoundingBox;
pub use news::{NewsEnricher, NewsFeed, NewsSearch, QueryBuilder, SearchStatus, TrendingTopic};
pub use pipeline::EnrichmentPipeline;
pub use proximity::ProximitySearch;
pub use seed::{SeedLoader, SeedOutcome};
pub use service::CrisisIntel;
pub use store::PgEventStore;
pub use traits::{EventStore, NewsSource, ReasoningService, SearchPage, SearchRequest};
