//! NewsApiClient against a local stub of the `/v2/everything` endpoint.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use serde_json::json;

use news_client::{EverythingQuery, NewsApiClient, NewsError};

const API_KEY: &str = "test-key";

/// Replies are keyed on `q`, so each test picks its branch by query text.
async fn everything(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        let body = json!({"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."});
        return (StatusCode::UNAUTHORIZED, body.to_string());
    }
    for required in ["q", "language", "sortBy", "from", "to", "pageSize"] {
        if !params.contains_key(required) {
            return (StatusCode::BAD_REQUEST, format!("missing {required}"));
        }
    }

    if params["sortBy"] != "publishedAt" {
        return (StatusCode::BAD_REQUEST, "unexpected sortBy".to_string());
    }

    let q = params["q"].as_str();
    match q {
        "outage" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream down".to_string()),
        "rate limited" => {
            let body = json!({"status": "error", "code": "rateLimited", "message": "Too many requests"});
            (StatusCode::OK, body.to_string())
        }
        "garbled" => (StatusCode::OK, "<html>not json</html>".to_string()),
        _ => {
            let body = json!({
                "status": "ok",
                "totalResults": 42,
                "articles": [{
                    "source": {"id": null, "name": "PTI"},
                    "title": format!("Coverage: {q}"),
                    "url": "https://news.example/1",
                    "publishedAt": "2026-10-15T08:00:00Z",
                }]
            });
            (StatusCode::OK, body.to_string())
        }
    }
}

/// Serve the stub on an ephemeral port and return its base URL.
async fn stub_base_url() -> String {
    let app = Router::new().route("/v2/everything", get(everything));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v2")
}

async fn client() -> NewsApiClient {
    NewsApiClient::new(API_KEY.to_string()).with_base_url(stub_base_url().await)
}

fn query(q: &str) -> EverythingQuery {
    EverythingQuery::recent(q, 3, 5).unwrap()
}

#[tokio::test]
async fn ok_body_returns_articles() {
    let response = client().await.everything(&query("flood Mumbai india")).await.unwrap();
    assert!(response.is_ok());
    assert_eq!(response.total_results, 42);
    assert_eq!(response.articles.len(), 1);
    assert_eq!(
        response.articles[0].title.as_deref(),
        Some("Coverage: flood Mumbai india")
    );
    assert_eq!(response.articles[0].source.name.as_deref(), Some("PTI"));
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let err = client().await.everything(&query("outage")).await.unwrap_err();
    match err {
        NewsError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_body_is_api_error() {
    let err = client().await.everything(&query("rate limited")).await.unwrap_err();
    match err {
        NewsError::Api { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "Too many requests");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_body_is_parse_error() {
    let err = client().await.everything(&query("garbled")).await.unwrap_err();
    assert!(matches!(err, NewsError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn wrong_key_is_rejected() {
    let client = NewsApiClient::new("wrong".to_string()).with_base_url(stub_base_url().await);
    let err = client.everything(&query("flood")).await.unwrap_err();
    assert!(matches!(err, NewsError::Api { status: 401, .. }));
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    // Bind then drop, so nothing is listening on the port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = NewsApiClient::new(API_KEY.to_string()).with_base_url(format!("http://{addr}/v2"));
    let err = client.everything(&query("flood")).await.unwrap_err();
    assert!(matches!(err, NewsError::Network(_)), "{err:?}");
}
