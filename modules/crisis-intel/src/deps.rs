use std::sync::Arc;

use crisis_common::FileConfig;

use crate::traits::{EventStore, NewsSource, ReasoningService};

/// External collaborators, constructed once at startup and shared by every
/// component. `news: None` disables news enrichment.
#[derive(Clone)]
pub struct Deps {
    pub reasoning: Arc<dyn ReasoningService>,
    pub news: Option<Arc<dyn NewsSource>>,
    pub store: Arc<dyn EventStore>,
    pub config: Arc<FileConfig>,
}

impl Deps {
    pub fn new(
        reasoning: Arc<dyn ReasoningService>,
        news: Option<Arc<dyn NewsSource>>,
        store: Arc<dyn EventStore>,
        config: Arc<FileConfig>,
    ) -> Self {
        Self {
            reasoning,
            news,
            store,
            config,
        }
    }
}
