//! Cache Directive Parsing Module
//!
//! Extracts a TTL from origin response headers.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == TTL From Headers ==
/// Derives a TTL from `Cache-Control` and `Expires` header values.
///
/// `s-maxage` wins over `max-age` (shared-cache precedence), both parsed
/// case-insensitively from the comma-separated directive list. Without a
/// usable directive the `Expires` timestamp is tried next. Returns zero
/// when neither header yields a TTL; the caller substitutes its default.
pub fn ttl_from_headers(cache_control: Option<&str>, expires: Option<&str>) -> Duration {
    if let Some(cache_control) = cache_control {
        let mut max_age: Option<u64> = None;
        let mut s_maxage: Option<u64> = None;

        for directive in cache_control.split(',') {
            let directive = directive.trim().to_ascii_lowercase();
            if let Some(value) = directive.strip_prefix("s-maxage=") {
                if let Ok(secs) = value.parse::<u64>() {
                    s_maxage = Some(secs);
                }
            } else if let Some(value) = directive.strip_prefix("max-age=") {
                if let Ok(secs) = value.parse::<u64>() {
                    max_age = Some(secs);
                }
            }
        }

        if let Some(secs) = s_maxage.or(max_age) {
            return Duration::from_secs(secs);
        }
    }

    if let Some(expires) = expires {
        if let Ok(when) = DateTime::parse_from_rfc2822(expires) {
            // A past Expires is stale already, treated as no directive.
            if let Ok(ttl) = when.signed_duration_since(Utc::now()).to_std() {
                return ttl;
            }
        }
    }

    Duration::ZERO
}
