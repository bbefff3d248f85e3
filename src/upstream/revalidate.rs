//! Revalidation Coordinator Module
//!
//! Decides per request whether the raw document comes from a fresh fetch,
//! a conditional revalidation, or the cached copy confirmed by the origin.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::Result;
use crate::upstream::{ttl_from_headers, ConditionalOutcome, FetchedDocument, OriginFetcher};

// == Revalidator ==
/// Coordinates the raw-document cache with the origin fetcher.
///
/// A cached document is never served without asking the origin first; the
/// cache's job here is to hold validators and avoid re-transferring
/// unchanged bytes. Skipping the round trip entirely is the output
/// cache's job, upstream of this type.
pub struct Revalidator {
    cache: Arc<CacheStore>,
    fetcher: Arc<dyn OriginFetcher>,
}

impl Revalidator {
    // == Constructor ==
    /// Creates a coordinator over the raw-document cache and a fetcher.
    pub fn new(cache: Arc<CacheStore>, fetcher: Arc<dyn OriginFetcher>) -> Self {
        Self { cache, fetcher }
    }

    // == Resolve ==
    /// Returns the current bytes of the document at `address` together
    /// with the TTL the caller may advertise for derived output.
    ///
    /// On a cache miss the document is fetched unconditionally and stored.
    /// On a cache hit the origin is asked conditionally with the cached
    /// validators: "not modified" answers reuse the cached payload and its
    /// remaining TTL without rewriting the entry, while a full response
    /// overwrites the entry. Any origin failure propagates and leaves the
    /// cache untouched.
    pub async fn resolve(&self, address: &str) -> Result<(Bytes, Duration)> {
        match self.cache.get(address) {
            Some(entry) => {
                let outcome = self
                    .fetcher
                    .fetch_conditional(
                        address,
                        entry.etag.as_deref(),
                        entry.last_modified.as_deref(),
                    )
                    .await?;

                match outcome {
                    ConditionalOutcome::NotModified => {
                        debug!(address, "origin confirmed cached document");
                        let ttl = entry.remaining_ttl();
                        Ok((entry.payload, ttl))
                    }
                    ConditionalOutcome::Modified(document) => {
                        debug!(address, "origin sent updated document");
                        Ok(self.store_document(address, document))
                    }
                }
            }
            None => {
                let document = self.fetcher.fetch(address).await?;
                debug!(address, bytes = document.body.len(), "fetched document");
                Ok(self.store_document(address, document))
            }
        }
    }

    // == Store Document ==
    /// Caches a fresh origin response and returns its bytes and TTL.
    ///
    /// The TTL comes from the response's caching headers, falling back to
    /// the store's default when they yield nothing.
    fn store_document(&self, address: &str, document: FetchedDocument) -> (Bytes, Duration) {
        let mut ttl = ttl_from_headers(
            document.cache_control.as_deref(),
            document.expires.as_deref(),
        );
        if ttl == Duration::ZERO {
            ttl = self.cache.default_ttl();
        }

        self.cache.set(
            address.to_string(),
            document.body.clone(),
            ttl,
            document.etag,
            document.last_modified,
        );

        (document.body, ttl)
    }
}
