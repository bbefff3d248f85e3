//! API Handlers
//!
//! HTTP request handlers for each filtering proxy endpoint.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use url::Url;

use crate::cache::{fingerprint, CacheStore};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics::RequestMetrics;
use crate::models::{DebugResponse, FeedParams, HealthResponse, StatsResponse};
use crate::upstream::{HttpFetcher, OriginFetcher, Revalidator};

const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Application state shared across all handlers.
///
/// Holds the two cache stores, the revalidating coordinator, and the
/// request metrics, all behind `Arc` so the state clones cheaply per
/// request.
#[derive(Clone)]
pub struct AppState {
    /// Raw upstream documents, keyed by address
    pub raw_cache: Arc<CacheStore>,
    /// Filtered outputs, keyed by request fingerprint
    pub output_cache: Arc<CacheStore>,
    /// Fetch coordinator for the raw cache
    pub revalidator: Arc<Revalidator>,
    /// Sliding-window request counters
    pub metrics: Arc<RequestMetrics>,
    /// Loaded configuration
    pub config: Config,
    /// Server start time, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state with the production HTTP fetcher.
    ///
    /// # Errors
    /// Returns a configuration error for invalid config values, or an
    /// upstream error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(
            config.upstream_timeout(),
            config.allow_private_upstreams,
        )?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates the state around a caller-supplied fetcher.
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn OriginFetcher>) -> Result<Self> {
        config.validate()?;

        let raw_cache = Arc::new(CacheStore::new(
            config.cache_capacity,
            config.memory_budget(),
            config.default_ttl(),
            config.min_ttl(),
            config.max_ttl(),
        )?);
        // One raw document fans out into an entry per filter combination,
        // so the output cache runs at double the raw cache bounds.
        let output_cache = Arc::new(CacheStore::new(
            config.cache_capacity * 2,
            config.memory_budget() * 2,
            config.default_ttl(),
            config.min_ttl(),
            config.max_ttl(),
        )?);
        let revalidator = Arc::new(Revalidator::new(Arc::clone(&raw_cache), fetcher));

        Ok(Self {
            raw_cache,
            output_cache,
            revalidator,
            metrics: Arc::new(RequestMetrics::new()),
            config: config.clone(),
            started_at: Instant::now(),
        })
    }
}

/// Handler for GET /feed
///
/// Serves the upstream document with the requested filter rules applied,
/// caching the filtered output under a fingerprint of the request.
///
/// # Query Parameters
/// - `upstream`: origin URL (falls back to the configured default)
/// - `field`/`pattern`/`invert` and `fieldN`/`patternN`/`invertN`: rules
/// - `debug`: respond with a JSON match report instead of the document
pub async fn feed_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response> {
    state.metrics.record_request();

    let params = FeedParams::from_query(&query);
    // Compile rules up front so a bad pattern fails before any fetch.
    let filters = params.filter_set()?;

    let upstream = params
        .upstream
        .clone()
        .or_else(|| state.config.default_upstream.clone())
        .ok_or_else(|| {
            AppError::InvalidRequest(
                "missing upstream parameter and no default upstream is configured".to_string(),
            )
        })?;
    if Url::parse(&upstream).is_err() {
        return Err(AppError::InvalidRequest(format!(
            "invalid upstream URL: {upstream}"
        )));
    }

    let mut components = vec![upstream.clone()];
    components.extend(filters.fingerprint_components());
    if params.debug {
        components.push("debug:true".to_string());
    }
    let cache_key = fingerprint(&components);

    // Debug requests always recompute, so the report reflects this fetch.
    if !params.debug {
        if let Some(entry) = state.output_cache.get(&cache_key) {
            return Ok(document_response(
                entry.payload.clone(),
                entry.remaining_ttl(),
                "HIT",
            ));
        }
    }

    let (payload, ttl) = state.revalidator.resolve(&upstream).await?;
    let document = String::from_utf8_lossy(&payload);

    if params.debug {
        let report = filters.apply_debug(&document);
        return Ok(Json(DebugResponse::new(upstream, report)).into_response());
    }

    let output = Bytes::from(filters.apply(&document));
    state
        .output_cache
        .set(cache_key, output.clone(), ttl, None, None);

    // Advertised client lifetime never drops below the configured floor.
    let client_ttl = ttl.max(state.config.min_client_cache());
    Ok(document_response(output, client_ttl, "MISS"))
}

/// Handler for GET /stats
///
/// Returns uptime, request-rate windows, and both cache snapshots.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.started_at.elapsed().as_secs(),
        state.metrics.snapshot(),
        state.raw_cache.stats(),
        state.output_cache.stats(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Builds a document response with caching headers.
fn document_response(payload: Bytes, max_age: Duration, cache_status: &'static str) -> Response {
    (
        [
            ("content-type", CONTENT_TYPE_TEXT.to_string()),
            (
                "cache-control",
                format!("public, max-age={}", max_age.as_secs()),
            ),
            ("x-cache", cache_status.to_string()),
        ],
        payload,
    )
        .into_response()
}
