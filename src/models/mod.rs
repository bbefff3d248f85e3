//! Request and Response models for the filtering proxy API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! parsing query parameters and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{FeedParams, RuleParams};
pub use responses::{DebugResponse, HealthResponse, StatsResponse};
