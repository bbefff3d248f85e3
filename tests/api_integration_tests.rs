//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint against a
//! scripted origin, so no network is involved.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bytes::Bytes;
use parking_lot::Mutex;
use resift::error::{AppError, Result};
use resift::upstream::{ConditionalOutcome, FetchedDocument, OriginFetcher};
use resift::{api::create_router, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;

const SAMPLE_DOC: &str = "\
Summary: Weekly training
Location: Gym hall

Summary: Board meeting
Location: Main office
";

// == Scripted Origin ==

/// One scripted origin response.
enum OriginStep {
    Document {
        body: &'static str,
        etag: Option<&'static str>,
        cache_control: Option<&'static str>,
    },
    NotModified,
    Status(u16),
}

/// Origin double that replays a fixed script, counting round trips and
/// recording the etag each conditional request carried.
struct ScriptedOrigin {
    steps: Mutex<VecDeque<OriginStep>>,
    contacts: AtomicUsize,
    conditional_etags: Mutex<Vec<Option<String>>>,
}

impl ScriptedOrigin {
    fn new(steps: Vec<OriginStep>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            contacts: AtomicUsize::new(0),
            conditional_etags: Mutex::new(Vec::new()),
        })
    }

    fn next(&self) -> OriginStep {
        self.contacts.fetch_add(1, Ordering::SeqCst);
        self.steps
            .lock()
            .pop_front()
            .expect("script exhausted: unexpected origin call")
    }

    fn contacts(&self) -> usize {
        self.contacts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OriginFetcher for ScriptedOrigin {
    async fn fetch(&self, _address: &str) -> Result<FetchedDocument> {
        match self.next() {
            OriginStep::Document {
                body,
                etag,
                cache_control,
            } => Ok(document(body, etag, cache_control)),
            OriginStep::NotModified => Err(AppError::UpstreamStatus(304)),
            OriginStep::Status(code) => Err(AppError::UpstreamStatus(code)),
        }
    }

    async fn fetch_conditional(
        &self,
        _address: &str,
        etag: Option<&str>,
        _last_modified: Option<&str>,
    ) -> Result<ConditionalOutcome> {
        self.conditional_etags.lock().push(etag.map(str::to_string));
        match self.next() {
            OriginStep::Document {
                body,
                etag,
                cache_control,
            } => Ok(ConditionalOutcome::Modified(document(
                body,
                etag,
                cache_control,
            ))),
            OriginStep::NotModified => Ok(ConditionalOutcome::NotModified),
            OriginStep::Status(code) => Err(AppError::UpstreamStatus(code)),
        }
    }
}

fn document(
    body: &'static str,
    etag: Option<&'static str>,
    cache_control: Option<&'static str>,
) -> FetchedDocument {
    FetchedDocument {
        body: Bytes::from_static(body.as_bytes()),
        status: 200,
        etag: etag.map(str::to_string),
        last_modified: None,
        cache_control: cache_control.map(str::to_string),
        expires: None,
    }
}

// == Helper Functions ==

fn scripted_app(steps: Vec<OriginStep>) -> (Router, Arc<ScriptedOrigin>) {
    let origin = ScriptedOrigin::new(steps);
    let state = AppState::with_fetcher(&Config::default(), origin.clone()).unwrap();
    (create_router(state), origin)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == FEED Endpoint Tests ==

#[tokio::test]
async fn test_feed_endpoint_filters_document() {
    let (app, origin) = scripted_app(vec![OriginStep::Document {
        body: SAMPLE_DOC,
        etag: None,
        cache_control: None,
    }]);

    let response = app
        .oneshot(get_request(
            "/feed?upstream=https://example.com/feed&field=summary&pattern=Board",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.headers()["x-cache"], "MISS");

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("Weekly training"));
    assert!(!body.contains("Board meeting"));
    assert_eq!(origin.contacts(), 1);
}

#[tokio::test]
async fn test_feed_endpoint_serves_cached_output() {
    let (app, origin) = scripted_app(vec![OriginStep::Document {
        body: SAMPLE_DOC,
        etag: None,
        cache_control: None,
    }]);
    let uri = "/feed?upstream=https://example.com/feed&pattern=Board";

    let first = app.clone().oneshot(get_request(uri)).await.unwrap();
    assert_eq!(first.headers()["x-cache"], "MISS");
    let first_body = body_to_string(first.into_body()).await;

    let second = app.oneshot(get_request(uri)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache"], "HIT");
    let second_body = body_to_string(second.into_body()).await;

    assert_eq!(first_body, second_body);
    // The repeat request never reached the origin.
    assert_eq!(origin.contacts(), 1);
}

#[tokio::test]
async fn test_feed_endpoint_revalidates_raw_document() {
    let (app, origin) = scripted_app(vec![
        OriginStep::Document {
            body: SAMPLE_DOC,
            etag: Some("v1"),
            cache_control: Some("max-age=120"),
        },
        OriginStep::NotModified,
    ]);

    // Two different filter sets over the same upstream: the second misses
    // the output cache but finds the raw document and revalidates it.
    let first = app
        .clone()
        .oneshot(get_request(
            "/feed?upstream=https://example.com/feed&pattern=Board",
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(get_request(
            "/feed?upstream=https://example.com/feed&pattern=training",
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache"], "MISS");

    let body = body_to_string(second.into_body()).await;
    assert!(body.contains("Board meeting"));
    assert!(!body.contains("Weekly training"));

    assert_eq!(origin.contacts(), 2);
    let etags = origin.conditional_etags.lock();
    assert_eq!(etags.len(), 1);
    assert_eq!(etags[0].as_deref(), Some("v1"));
}

#[tokio::test]
async fn test_feed_endpoint_advertises_client_cache_floor() {
    // No caching directives from the origin, so the default TTL applies
    // and the advertised max-age rises to the configured floor.
    let (app, _origin) = scripted_app(vec![OriginStep::Document {
        body: SAMPLE_DOC,
        etag: None,
        cache_control: None,
    }]);

    let response = app
        .oneshot(get_request("/feed?upstream=https://example.com/feed"))
        .await
        .unwrap();

    assert_eq!(response.headers()["cache-control"], "public, max-age=900");
}

#[tokio::test]
async fn test_feed_endpoint_debug_report() {
    let (app, _origin) = scripted_app(vec![OriginStep::Document {
        body: SAMPLE_DOC,
        etag: None,
        cache_control: None,
    }]);

    let response = app
        .oneshot(get_request(
            "/feed?upstream=https://example.com/feed&pattern=Board&debug=true",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.contains("application/json"));

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["upstream"].as_str().unwrap(), "https://example.com/feed");
    assert_eq!(json["report"]["total_records"].as_u64().unwrap(), 2);
    assert_eq!(json["report"]["removed_records"].as_u64().unwrap(), 1);
    assert_eq!(json["report"]["kept_records"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn test_feed_endpoint_missing_upstream() {
    let (app, origin) = scripted_app(vec![]);

    let response = app.oneshot(get_request("/feed")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
    assert_eq!(origin.contacts(), 0);
}

#[tokio::test]
async fn test_feed_endpoint_invalid_pattern() {
    let (app, origin) = scripted_app(vec![]);

    let response = app
        .oneshot(get_request(
            "/feed?upstream=https://example.com/feed&pattern=(unclosed",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("pattern"));
    // A bad pattern fails before any origin contact.
    assert_eq!(origin.contacts(), 0);
}

#[tokio::test]
async fn test_feed_endpoint_origin_failure() {
    let (app, _origin) = scripted_app(vec![OriginStep::Status(503)]);

    let response = app
        .oneshot(get_request("/feed?upstream=https://example.com/feed"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("503"));
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, _origin) = scripted_app(vec![OriginStep::Document {
        body: SAMPLE_DOC,
        etag: None,
        cache_control: None,
    }]);

    // One feed request to generate traffic
    let feed_response = app
        .clone()
        .oneshot(get_request("/feed?upstream=https://example.com/feed"))
        .await
        .unwrap();
    assert_eq!(feed_response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert!(json.get("uptime_secs").is_some());
    assert_eq!(json["requests"]["last_5m"].as_u64().unwrap(), 1);
    assert_eq!(json["raw_cache"]["entry_count"].as_u64().unwrap(), 1);
    assert_eq!(json["raw_cache"]["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["output_cache"]["entry_count"].as_u64().unwrap(), 1);
    assert!(json["output_cache"].get("hit_ratio").is_some());
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _origin) = scripted_app(vec![]);

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "ok");
    assert!(json.get("timestamp").is_some());
}
