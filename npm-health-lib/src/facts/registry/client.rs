//! npm registry client
//!
//! Two endpoints are used: the package-metadata document served by the registry
//! itself, and the download-count endpoint served by the npm statistics API.

use super::{DownloadCount, DownloadPeriod};
use crate::Result;
use crate::facts::http::{client_builder, timed_get};
use crate::facts::{FetchError, PackageMetadata};
use core::time::Duration;
use ohno::EnrichableExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

const LOG_TARGET: &str = "  registry";

pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";
pub const NPM_DOWNLOADS_URL: &str = "https://api.npmjs.org";

/// Characters kept verbatim in a registry path. `/` in a scoped name must be escaped.
const REGISTRY_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'@').remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// The download-count endpoint takes scoped names with a literal `/`.
const DOWNLOADS_NAME: &AsciiSet = &REGISTRY_NAME.remove(b'/');

#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    registry_url: String,
    downloads_url: String,
    period: DownloadPeriod,
    timeout: Duration,
}

impl Client {
    pub fn new(registry_url: &str, downloads_url: &str, period: DownloadPeriod, user_agent: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: client_builder(user_agent, timeout).build()?,
            registry_url: registry_url.trim_end_matches('/').to_string(),
            downloads_url: downloads_url.trim_end_matches('/').to_string(),
            period,
            timeout,
        })
    }

    #[must_use]
    pub const fn period(&self) -> DownloadPeriod {
        self.period
    }

    /// Fetch the registry document for a package.
    ///
    /// Any non-success status is reported as [`FetchError::NotFound`], the registry's
    /// way of saying it has no such package.
    pub async fn package_metadata(&self, name: &str) -> Result<PackageMetadata, FetchError> {
        let url = format!("{}/{}", self.registry_url, utf8_percent_encode(name, REGISTRY_NAME));
        log::info!(target: LOG_TARGET, "Querying npm registry for package '{name}'");

        let resp = timed_get(&self.client, &url, self.timeout)
            .await
            .map_err(|e| e.enrich_with(|| format!("fetching registry metadata for package '{name}'")))?;

        let status = resp.status();
        if !status.is_success() {
            log::debug!(target: LOG_TARGET, "Registry answered HTTP {status} for package '{name}'");
            return Err(FetchError::NotFound(format!("package '{name}'")));
        }

        resp.json::<PackageMetadata>()
            .await
            .map_err(|e| FetchError::Malformed(format!("undecodable registry metadata for package '{name}': {e}")))
    }

    /// Fetch how often a package was downloaded over the configured period.
    pub async fn download_count(&self, name: &str) -> Result<DownloadCount, FetchError> {
        let url = format!(
            "{}/downloads/point/{}/{}",
            self.downloads_url,
            self.period,
            utf8_percent_encode(name, DOWNLOADS_NAME)
        );
        log::info!(target: LOG_TARGET, "Querying npm download counts ({}) for package '{name}'", self.period);

        let resp = timed_get(&self.client, &url, self.timeout)
            .await
            .map_err(|e| e.enrich_with(|| format!("fetching download count for package '{name}'")))?;

        let resp = resp
            .error_for_status()
            .map_err(|e| ohno::AppError::from(e).enrich_with(|| format!("fetching download count for package '{name}'")))?;

        let count = resp
            .json::<DownloadCount>()
            .await
            .map_err(|e| ohno::AppError::from(e).enrich_with(|| format!("decoding download count for package '{name}'")))?;

        log::debug!(
            target: LOG_TARGET,
            "Package '{name}' was downloaded {} time(s) between {} and {}",
            count.downloads,
            count.period_start,
            count.period_end
        );

        Ok(count)
    }
}
