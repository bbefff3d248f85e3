//! Response DTOs for the filtering proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;
use crate::filter::FilterReport;
use crate::metrics::RequestWindows;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "ok")
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Seconds since the server started
    pub uptime_secs: u64,
    /// Request counts over the sliding windows
    pub requests: RequestWindows,
    /// Snapshot of the raw document cache
    pub raw_cache: StatsSnapshot,
    /// Snapshot of the filtered output cache
    pub output_cache: StatsSnapshot,
}

impl StatsResponse {
    /// Creates a new StatsResponse from the live counters
    pub fn new(
        uptime_secs: u64,
        requests: RequestWindows,
        raw_cache: StatsSnapshot,
        output_cache: StatsSnapshot,
    ) -> Self {
        Self {
            uptime_secs,
            requests,
            raw_cache,
            output_cache,
        }
    }
}

/// Response body for a feed request in debug mode
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    /// Upstream the document was fetched from
    pub upstream: String,
    /// Per-record filtering outcome
    pub report: FilterReport,
}

impl DebugResponse {
    /// Creates a new DebugResponse
    pub fn new(upstream: impl Into<String>, report: FilterReport) -> Self {
        Self {
            upstream: upstream.into(),
            report,
        }
    }
}
