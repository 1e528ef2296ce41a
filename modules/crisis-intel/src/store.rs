// Postgres persistence for crisis events. One row per event document;
// embedded news articles travel as JSONB.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crisis_common::{CrisisEvent, EventType, NewsArticle, Severity};

use crate::geo::BoundingBox;
use crate::traits::EventStore;

pub struct PgEventStore {
    pool: PgPool,
}

/// A row from the crisis_events table.
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    latitude: f64,
    longitude: f64,
    event_type: String,
    severity: String,
    ai_summary: String,
    news_articles: Json<Vec<NewsArticle>>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for CrisisEvent {
    type Error = anyhow::Error;

    /// Labels outside the taxonomy are corrupt rows, not something to coerce.
    fn try_from(row: EventRow) -> Result<Self> {
        let event_type = EventType::from_label(&row.event_type)
            .filter(|t| t.as_str() == row.event_type)
            .ok_or_else(|| anyhow!("row {}: invalid event_type {:?}", row.id, row.event_type))?;
        let severity = Severity::from_label(&row.severity)
            .filter(|s| s.as_str() == row.severity)
            .ok_or_else(|| anyhow!("row {}: invalid severity {:?}", row.id, row.severity))?;

        Ok(CrisisEvent {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            latitude: row.latitude,
            longitude: row.longitude,
            event_type,
            severity,
            ai_summary: row.ai_summary,
            news_articles: row.news_articles.0,
            status: row.status,
            timestamp: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, description, location, latitude, longitude,
           event_type, severity, ai_summary, news_articles, status, created_at
    FROM crisis_events
"#;

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run crisis_events migrations")?;
        Ok(())
    }

    fn rows_to_events(rows: Vec<EventRow>) -> Result<Vec<CrisisEvent>> {
        rows.into_iter().map(CrisisEvent::try_from).collect()
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, event: &CrisisEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO crisis_events
                (id, title, description, location, latitude, longitude,
                 event_type, severity, ai_summary, news_articles, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.event_type.as_str())
        .bind(event.severity.as_str())
        .bind(&event.ai_summary)
        .bind(Json(&event.news_articles))
        .bind(&event.status)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to insert crisis event {}", event.id))?;

        Ok(())
    }

    async fn find_all(&self, limit: i64) -> Result<Vec<CrisisEvent>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC LIMIT $1");
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Self::rows_to_events(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrisisEvent>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CrisisEvent::try_from).transpose()
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM crisis_events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_in_box(&self, bbox: &BoundingBox, limit: i64) -> Result<Vec<CrisisEvent>> {
        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE latitude BETWEEN $1 AND $2
               AND longitude BETWEEN $3 AND $4
             ORDER BY created_at DESC
             LIMIT $5"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lng)
            .bind(bbox.max_lng)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Self::rows_to_events(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(event_type: &str, severity: &str) -> EventRow {
        EventRow {
            id: Uuid::new_v4(),
            title: "Cyclone Alert".into(),
            description: String::new(),
            location: "Odisha".into(),
            latitude: 20.2961,
            longitude: 85.8245,
            event_type: event_type.into(),
            severity: severity.into(),
            ai_summary: "summary".into(),
            news_articles: Json(vec![]),
            status: "active".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts() {
        let event = CrisisEvent::try_from(row("storm", "high")).unwrap();
        assert_eq!(event.event_type, EventType::Storm);
        assert_eq!(event.severity, Severity::High);
    }

    #[test]
    fn corrupt_labels_are_errors() {
        assert!(CrisisEvent::try_from(row("tornado", "high")).is_err());
        assert!(CrisisEvent::try_from(row("storm", "severe")).is_err());
        // Stored labels are canonical; loosely formatted ones indicate corruption.
        assert!(CrisisEvent::try_from(row("Storm", "high")).is_err());
    }
}
