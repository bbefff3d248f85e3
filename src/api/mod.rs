//! API Module
//!
//! HTTP handlers and routing for the filtering proxy REST API.
//!
//! # Endpoints
//! - `GET /feed` - Fetch, filter, and serve the upstream document
//! - `GET /stats` - Uptime, request windows, and cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
