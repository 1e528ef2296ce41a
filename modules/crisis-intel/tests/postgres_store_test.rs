//! Integration tests for PgEventStore.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use chrono::{SubsecRound, Utc};
use uuid::Uuid;

use crisis_common::{CrisisEvent, EventType, NewsArticle, Severity};
use crisis_intel::{BoundingBox, EventStore, PgEventStore};

/// Get a migrated store, or skip if no test DB is available.
async fn test_store() -> Option<PgEventStore> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let store = PgEventStore::connect(&url).await.ok()?;
    store.migrate().await.ok()?;
    Some(store)
}

/// Tests share one database, so every event gets coordinates no other test uses.
fn event_at(title: &str, latitude: f64, longitude: f64) -> CrisisEvent {
    CrisisEvent {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: "Water levels rising".to_string(),
        location: "Test Location".to_string(),
        latitude,
        longitude,
        event_type: EventType::Flood,
        severity: Severity::High,
        ai_summary: "Flooding reported".to_string(),
        news_articles: vec![NewsArticle {
            title: "River breaches banks".to_string(),
            description: String::new(),
            url: "https://news.example/river".to_string(),
            source: "Example News".to_string(),
            published_at: Some(Utc::now().trunc_subsecs(0)),
            image_url: None,
        }],
        status: "active".to_string(),
        timestamp: Utc::now().trunc_subsecs(6),
    }
}

#[tokio::test]
async fn insert_then_find_by_id_round_trips() {
    let Some(store) = test_store().await else {
        return;
    };

    let event = event_at("Round trip", -33.1001, 151.2001);
    store.insert(&event).await.unwrap();

    let fetched = store.find_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(fetched, event);
}

#[tokio::test]
async fn missing_id_is_none() {
    let Some(store) = test_store().await else {
        return;
    };

    assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn box_query_is_inclusive_and_exclusive_outside() {
    let Some(store) = test_store().await else {
        return;
    };

    let inside = event_at("Inside", -41.5002, 172.3002);
    let edge = event_at("Edge", -41.4002, 172.3002);
    let outside = event_at("Outside", -41.5002, 173.3002);
    for event in [&inside, &edge, &outside] {
        store.insert(event).await.unwrap();
    }

    let bbox = BoundingBox {
        min_lat: -41.6002,
        max_lat: -41.4002,
        min_lng: 172.2002,
        max_lng: 172.4002,
    };
    let ids: Vec<Uuid> = store
        .find_in_box(&bbox, 50)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();

    assert!(ids.contains(&inside.id));
    assert!(ids.contains(&edge.id));
    assert!(!ids.contains(&outside.id));
}

#[tokio::test]
async fn find_all_orders_newest_first() {
    let Some(store) = test_store().await else {
        return;
    };

    let older = event_at("Older", -12.3003, 130.8003);
    let mut newer = event_at("Newer", -12.3003, 130.8003);
    newer.timestamp = older.timestamp + chrono::Duration::seconds(1);
    store.insert(&older).await.unwrap();
    store.insert(&newer).await.unwrap();

    let listed: Vec<Uuid> = store
        .find_all(i64::MAX)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .filter(|id| *id == older.id || *id == newer.id)
        .collect();
    assert_eq!(listed, vec![newer.id, older.id]);

    assert!(store.count().await.unwrap() >= 2);
}
