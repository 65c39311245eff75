//! GitHub API client
//!
//! Minimal GitHub REST client: issues authenticated (or anonymous) GET requests and
//! classifies the response so callers can tell rate limiting apart from other failures.

use crate::facts::http::{client_builder, timed_get};
use chrono::{DateTime, Utc};
use core::time::Duration;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

pub const GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of a hosting API call
#[derive(Debug)]
pub enum HostingApiResult<T> {
    /// Request succeeded
    Success(T),

    /// The API refused the request because a quota is exhausted
    RateLimited(u16, Option<RateLimitInfo>),

    /// The requested resource was not found (404)
    NotFound,

    /// Request failed for any other reason
    Failed(ohno::AppError),
}

#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Client {
    /// Create a new GitHub API client with optional authentication token and base URL
    pub fn new(token: Option<&str>, base_url: &str, user_agent: &str, timeout: Duration) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let _ = headers.insert("x-github-api-version", HeaderValue::from_static(GITHUB_API_VERSION));

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        Ok(Self {
            client: client_builder(user_agent, timeout).default_headers(headers).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make an API call and classify the result
    pub async fn api_call(&self, url: &str) -> HostingApiResult<reqwest::Response> {
        let resp = match timed_get(&self.client, url, self.timeout).await {
            Ok(r) => r,
            Err(e) => return HostingApiResult::Failed(e),
        };

        let status = resp.status();
        if status.is_success() {
            return HostingApiResult::Success(resp);
        }

        // GitHub signals both primary and secondary rate limits with 403 or 429
        let status_code = status.as_u16();
        if matches!(status_code, 403 | 429) {
            return HostingApiResult::RateLimited(status_code, extract_rate_limit_from_headers(resp.headers()));
        }

        if status_code == 404 {
            return HostingApiResult::NotFound;
        }

        match resp.error_for_status() {
            Ok(resp) => HostingApiResult::Success(resp),
            Err(e) => HostingApiResult::Failed(e.into()),
        }
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
