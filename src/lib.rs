//! Resift - A filtering, revalidating feed proxy
//!
//! Fetches upstream text documents, applies regex record filters, and
//! caches both raw and filtered results with TTL expiration and LRU
//! eviction.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
