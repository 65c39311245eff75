//! Time-bounded HTTP requests.
//!
//! Every upstream call goes through [`timed_get`] so that a slow or hung upstream
//! cannot stall a request indefinitely. No retries are attempted here: callers
//! fail fast and leave retry policy to whoever invoked them.

use core::time::Duration;
use ohno::app_err;

/// Send an HTTP GET request, giving up after `timeout`.
///
/// The timeout covers connecting and receiving the response headers. Reading the
/// body is bounded separately by the client-wide timeout configured in [`client_builder`].
pub async fn timed_get(client: &reqwest::Client, url: &str, timeout: Duration) -> crate::Result<reqwest::Response> {
    match tokio::time::timeout(timeout, client.get(url).send()).await {
        Ok(result) => result.map_err(ohno::AppError::from),
        Err(_) => Err(app_err!("HTTP GET {url} timed out after {}ms", timeout.as_millis())),
    }
}

/// Start building an HTTP client that identifies itself with `user_agent`.
pub fn client_builder(user_agent: &str, timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder().user_agent(user_agent).timeout(timeout)
}
