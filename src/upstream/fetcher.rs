//! Origin Fetcher Module
//!
//! HTTP client for plain and conditional document fetches, with scheme and
//! private-address validation applied before any request leaves the
//! process.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, redirect, Client, StatusCode};
use std::time::Duration;
use url::{Host, Url};

use crate::error::{AppError, Result};

/// Identifies this proxy to origins.
const USER_AGENT: &str = concat!("resift/", env!("CARGO_PKG_VERSION"));

/// Redirect chains longer than this are treated as a fetch failure.
const MAX_REDIRECTS: usize = 10;

// == Fetched Document ==
/// A successful origin response with its caching metadata.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Response body bytes
    pub body: Bytes,
    /// HTTP status code of the response
    pub status: u16,
    /// `ETag` header value, if any
    pub etag: Option<String>,
    /// `Last-Modified` header value, if any
    pub last_modified: Option<String>,
    /// `Cache-Control` header value, if any
    pub cache_control: Option<String>,
    /// `Expires` header value, if any
    pub expires: Option<String>,
}

// == Conditional Outcome ==
/// Result of a conditional fetch.
///
/// `NotModified` deliberately carries no payload: the only bytes a caller
/// can serve after a 304 are the ones it already holds.
#[derive(Debug)]
pub enum ConditionalOutcome {
    /// Origin confirmed the cached copy is current (HTTP 304).
    NotModified,
    /// Origin sent a full replacement document.
    Modified(FetchedDocument),
}

// == Origin Fetcher Trait ==
/// Transport seam between the revalidation coordinator and the network.
///
/// Implementations apply their own timeout, redirect, and address-safety
/// policy; callers see only documents, "not modified", or failures.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    /// Fetches a document unconditionally. Any status other than 200 is a
    /// failure.
    async fn fetch(&self, address: &str) -> Result<FetchedDocument>;

    /// Fetches a document conditionally, presenting cached validators.
    /// A 304 maps to `NotModified`, a 200 to `Modified`, anything else to
    /// a failure.
    async fn fetch_conditional(
        &self,
        address: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<ConditionalOutcome>;
}

// == HTTP Fetcher ==
/// Production fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: Client,
    /// Permits loopback and RFC 1918 upstreams; meant for local setups
    /// and tests.
    allow_private: bool,
}

impl HttpFetcher {
    // == Constructor ==
    /// Builds the fetcher and its HTTP client.
    ///
    /// # Arguments
    /// * `timeout` - Per-request timeout covering connect through body read
    /// * `allow_private` - Whether private-range upstream hosts are allowed
    pub fn new(timeout: Duration, allow_private: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            allow_private,
        })
    }

    // == Address Validation ==
    /// Parses and validates an upstream address before fetching.
    ///
    /// Only http and https schemes pass. Unless private upstreams are
    /// allowed, loopback, link-local, and private-range hosts are rejected
    /// so the proxy cannot be pointed at internal services.
    fn validate_address(&self, address: &str) -> Result<Url> {
        let url = Url::parse(address)
            .map_err(|err| AppError::InvalidRequest(format!("invalid upstream URL: {err}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(AppError::InvalidRequest(format!(
                    "unsupported upstream scheme: {other}"
                )))
            }
        }

        if !self.allow_private {
            if let Some(host) = url.host() {
                if is_private_host(&host) {
                    return Err(AppError::InvalidRequest(format!(
                        "upstream host not allowed: {host}"
                    )));
                }
            }
        }

        Ok(url)
    }
}

/// Reads the interesting response headers, then the body.
async fn read_document(response: reqwest::Response) -> Result<FetchedDocument> {
    let status = response.status().as_u16();
    let etag = header_value(&response, header::ETAG);
    let last_modified = header_value(&response, header::LAST_MODIFIED);
    let cache_control = header_value(&response, header::CACHE_CONTROL);
    let expires = header_value(&response, header::EXPIRES);
    let body = response.bytes().await?;

    Ok(FetchedDocument {
        body,
        status,
        etag,
        last_modified,
        cache_control,
        expires,
    })
}

fn header_value(response: &reqwest::Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// True for hosts a shared proxy must not be pointed at by default.
fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost") || domain.ends_with(".local")
        }
        Host::Ipv4(ip) => {
            ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
        }
        Host::Ipv6(ip) => {
            // fc00::/7 unique-local, fe80::/10 link-local
            ip.is_loopback()
                || ip.is_unspecified()
                || (ip.segments()[0] & 0xfe00) == 0xfc00
                || (ip.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

#[async_trait]
impl OriginFetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> Result<FetchedDocument> {
        let url = self.validate_address(address)?;
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(AppError::UpstreamStatus(response.status().as_u16()));
        }

        read_document(response).await
    }

    async fn fetch_conditional(
        &self,
        address: &str,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<ConditionalOutcome> {
        let url = self.validate_address(address)?;

        let mut request = self.client.get(url);
        if let Some(etag) = etag {
            request = request.header(header::IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = last_modified {
            request = request.header(header::IF_MODIFIED_SINCE, last_modified);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NOT_MODIFIED => Ok(ConditionalOutcome::NotModified),
            StatusCode::OK => Ok(ConditionalOutcome::Modified(read_document(response).await?)),
            status => Err(AppError::UpstreamStatus(status.as_u16())),
        }
    }
}
