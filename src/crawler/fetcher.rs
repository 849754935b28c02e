//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with bounded retry and backoff
//! - Content-Type filtering (HTML only)
//! - Encoding resolution of the response body
//! - Last-Modified normalization

use crate::config::{BackoffKind, FetchConfig, UserAgentConfig};
use crate::encoding::{EncodingResolver, EncodingSource};
use chrono::{DateTime, Utc};
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirects followed per request
pub const MAX_REDIRECTS: usize = 10;

/// Statuses that are retried: rate limiting and transient server errors
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Media types the extractor understands
const HTML_MEDIA_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

/// Errors that end a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Unsupported content type '{content_type}' at {url}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => RETRYABLE_STATUSES.contains(status),
            Self::Transport { .. } => true,
            Self::Request { .. } | Self::UnsupportedContentType { .. } | Self::Exhausted { .. } => {
                false
            }
        }
    }
}

/// A successfully fetched and decoded page
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The requested URL
    pub url: String,
    /// Final URL after redirects
    pub final_url: String,
    pub status: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Raw body
    pub bytes: Vec<u8>,
    /// Decoded body
    pub text: String,
    /// Name of the resolved encoding (e.g. `UTF-8`, `Shift_JIS`)
    pub encoding: &'static str,
    /// Cascade stage that resolved the encoding
    pub encoding_source: EncodingSource,
    /// Last-Modified as an RFC 3339 timestamp
    pub last_modified: Option<String>,
}

/// Bounded retry with fixed or exponential backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffKind,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Total attempts including the first (at least 1)
    /// * `backoff` - Fixed or exponential delay growth
    /// * `base_delay` - Delay before the first retry
    /// * `max_delay` - Upper bound for any single delay
    pub fn new(
        max_attempts: u32,
        backoff: BackoffKind,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.backoff,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay applied after the `attempt`-th failed attempt (1-based)
    ///
    /// Exponential backoff doubles from `base_delay` and is capped at
    /// `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffKind::Fixed => self.base_delay,
            BackoffKind::Exponential => {
                let exponent = attempt.saturating_sub(1).min(31);
                self.base_delay
                    .checked_mul(1u32 << exponent)
                    .unwrap_or(self.max_delay)
            }
        };
        delay.min(self.max_delay)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use doccrawl::config::{FetchConfig, UserAgentConfig};
/// use doccrawl::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     name: "DocCrawler".to_string(),
///     version: "1.0".to_string(),
///     contact_url: Some("https://example.com/bot".to_string()),
/// };
///
/// let client = build_http_client(&user_agent, &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with retry and decodes their bodies
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    resolver: EncodingResolver,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy, resolver: EncodingResolver) -> Self {
        Self {
            client,
            retry,
            resolver,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429, 500, 502, 503, 504 | Retry after backoff |
    /// | Timeout, connection failure, body read error | Retry after backoff |
    /// | Any other 4xx/5xx | Fail immediately |
    /// | Non-HTML Content-Type | Fail immediately |
    /// | Redirect chain > 10 | Fail immediately |
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - The decoded page
    /// * `Err(FetchError)` - A terminal failure, or [`FetchError::Exhausted`]
    ///   once every attempt failed
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let mut attempt = 1;

        loop {
            let error = match self.fetch_once(url).await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if attempt >= self.retry.max_attempts() {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                "Attempt {}/{} failed ({}), retrying in {:?}",
                attempt,
                self.retry.max_attempts(),
                error,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResult, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = header_value(&response, header::CONTENT_TYPE);
        if let Some(ct) = &content_type {
            if !is_html_content_type(ct) {
                return Err(FetchError::UnsupportedContentType {
                    url: url.to_string(),
                    content_type: ct.clone(),
                });
            }
        }
        let last_modified =
            header_value(&response, header::LAST_MODIFIED).and_then(|v| normalize_last_modified(&v));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?
            .to_vec();

        let decoded = self.resolver.decode(&bytes, content_type.as_deref());
        tracing::debug!(
            "Decoded {} ({} bytes) as {} via {}",
            url,
            bytes.len(),
            decoded.encoding_name(),
            decoded.source
        );

        Ok(FetchResult {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content_type,
            encoding: decoded.encoding_name(),
            encoding_source: decoded.source,
            text: decoded.text,
            bytes,
            last_modified,
        })
    }
}

/// Whether a status is retried
pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}

/// Whether a Content-Type header names an HTML media type
pub fn is_html_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    HTML_MEDIA_TYPES.contains(&essence.as_str())
}

/// Normalizes an HTTP date to RFC 3339
///
/// # Returns
///
/// * `Some(String)` - e.g. `2015-10-21T07:28:00+00:00`
/// * `None` - The value is not an RFC 2822 / HTTP date
pub fn normalize_last_modified(value: &str) -> Option<String> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339())
}

fn header_value(response: &reqwest::Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn transport_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_redirect() || e.is_builder() {
        FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
