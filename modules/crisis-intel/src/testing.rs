// Test doubles for the enrichment core.
//
// Three mocks matching the three collaborator traits:
// - MockReasoner (ReasoningService): title-keyed canned replies, fails otherwise
// - MockNewsSource (NewsSource): query-keyed result pages, fails otherwise
// - MemoryEventStore (EventStore): in-memory document store with failure switches
//
// Plus fixture coordinates and builders for raw articles and stored events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crisis_common::{AnalysisResult, CrisisEvent, EventType, FileConfig, NewEvent, Severity};
use news_client::{RawArticle, RawSource};

use crate::deps::Deps;
use crate::geo::BoundingBox;
use crate::service::CrisisIntel;
use crate::traits::{EventStore, NewsSource, ReasoningService, SearchPage, SearchRequest};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Delhi, India.
pub const DELHI: (f64, f64) = (28.6139, 77.2090);
/// Mumbai, Maharashtra.
pub const MUMBAI: (f64, f64) = (19.0760, 72.8777);
/// A point in north-east Turkey with no sample event nearby.
pub const NOWHERE: (f64, f64) = (40.0, 40.0);

/// A well-formed model reply with three recommendations.
pub fn analysis_json(event_type: &str, severity: &str) -> String {
    serde_json::json!({
        "event_type": event_type,
        "severity": severity,
        "summary": format!("A {event_type} has been reported."),
        "recommendations": [
            "Move to higher ground",
            "Follow official advisories",
            "Keep a go-bag ready"
        ]
    })
    .to_string()
}

pub fn raw_article(title: &str, url: &str) -> RawArticle {
    RawArticle {
        source: RawSource {
            id: None,
            name: Some("Example News".to_string()),
        },
        author: None,
        title: Some(title.to_string()),
        description: Some(format!("Coverage: {title}")),
        url: Some(url.to_string()),
        url_to_image: None,
        published_at: Some("2026-10-15T08:00:00Z".to_string()),
    }
}

/// An already-classified event at `point`, as if read back from storage.
pub fn stored_event(title: &str, point: (f64, f64)) -> CrisisEvent {
    CrisisEvent::assemble(
        NewEvent::new(title, "", title, point.0, point.1),
        AnalysisResult {
            event_type: EventType::Other,
            severity: Severity::Low,
            summary: title.to_string(),
            recommendations: Vec::new(),
        },
        Vec::new(),
    )
}

/// Facade over the given mocks with default tunables.
pub fn intel(
    reasoner: MockReasoner,
    news: Option<MockNewsSource>,
    store: Arc<MemoryEventStore>,
) -> CrisisIntel {
    CrisisIntel::new(Deps::new(
        Arc::new(reasoner),
        news.map(|n| Arc::new(n) as Arc<dyn NewsSource>),
        store,
        Arc::new(FileConfig::default()),
    ))
}

// ---------------------------------------------------------------------------
// MockReasoner
// ---------------------------------------------------------------------------

/// Returns the reply registered for the prompt's title, else the default
/// reply, else an error. Counts calls.
pub struct MockReasoner {
    by_title: HashMap<String, String>,
    default_reply: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockReasoner {
    /// Every call fails, as if the service were unreachable.
    pub fn failing() -> Self {
        Self {
            by_title: HashMap::new(),
            default_reply: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call returns `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            default_reply: Some(reply.into()),
            ..Self::failing()
        }
    }

    pub fn on_title(mut self, title: &str, reply: impl Into<String>) -> Self {
        self.by_title.insert(title.to_string(), reply.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningService for MockReasoner {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let title = user
            .lines()
            .find_map(|line| line.trim().strip_prefix("Title: "))
            .unwrap_or_default();

        match self.by_title.get(title).or(self.default_reply.as_ref()) {
            Some(reply) => Ok(reply.clone()),
            None => bail!("MockReasoner: reasoning service unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockNewsSource
// ---------------------------------------------------------------------------

/// Query-keyed search results. Unregistered queries fail. Records every request.
pub struct MockNewsSource {
    pages: HashMap<String, SearchPage>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockNewsSource {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// No query is registered, so every search fails.
    pub fn failing() -> Self {
        Self::new()
    }

    pub fn on_query(mut self, query: &str, page: SearchPage) -> Self {
        self.pages.insert(query.to_string(), page);
        self
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockNewsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSource for MockNewsSource {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.requests.lock().unwrap().push(request.clone());
        match self.pages.get(&request.query) {
            Some(page) => Ok(page.clone()),
            None => bail!("MockNewsSource: HTTP 503 for query {:?}", request.query),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryEventStore
// ---------------------------------------------------------------------------

struct MemoryEventStoreInner {
    events: Vec<CrisisEvent>,
    fail_inserts: bool,
    fail_reads: bool,
    inserts: usize,
}

/// In-memory document store. Thread-safe via interior Mutex.
pub struct MemoryEventStore {
    inner: Mutex<MemoryEventStoreInner>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryEventStoreInner {
                events: Vec::new(),
                fail_inserts: false,
                fail_reads: false,
                inserts: 0,
            }),
        }
    }

    /// Pre-populate without counting as an insert.
    pub fn with_event(self, event: CrisisEvent) -> Self {
        self.inner.lock().unwrap().events.push(event);
        self
    }

    /// Make `insert` return an error for every call.
    pub fn failing_inserts(self) -> Self {
        self.inner.lock().unwrap().fail_inserts = true;
        self
    }

    /// Make every read return an error.
    pub fn failing_reads(self) -> Self {
        self.inner.lock().unwrap().fail_reads = true;
        self
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Successful `insert` calls so far.
    pub fn inserts(&self) -> usize {
        self.inner.lock().unwrap().inserts
    }

    fn read(&self) -> Result<std::sync::MutexGuard<'_, MemoryEventStoreInner>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            bail!("MemoryEventStore: read failure");
        }
        Ok(inner)
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: &CrisisEvent) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_inserts {
            bail!("MemoryEventStore: insert failure");
        }
        inner.events.push(event.clone());
        inner.inserts += 1;
        Ok(())
    }

    async fn find_all(&self, limit: i64) -> Result<Vec<CrisisEvent>> {
        let inner = self.read()?;
        let mut events = inner.events.clone();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit.max(0) as usize);
        Ok(events)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrisisEvent>> {
        let inner = self.read()?;
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.read()?.events.len() as i64)
    }

    async fn find_in_box(&self, bbox: &BoundingBox, limit: i64) -> Result<Vec<CrisisEvent>> {
        let inner = self.read()?;
        Ok(inner
            .events
            .iter()
            .filter(|e| bbox.contains(e.latitude, e.longitude))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
