//! Upstream Module
//!
//! Origin fetching, cache-directive parsing, and conditional revalidation.

mod fetcher;
mod headers;
mod revalidate;

// Re-export public types
pub use fetcher::{ConditionalOutcome, FetchedDocument, HttpFetcher, OriginFetcher};
pub use headers::ttl_from_headers;
pub use revalidate::Revalidator;
