use super::client_key::{HeaderSource, client_key};
use super::{AggregatedResult, ServiceError};
use crate::facts::RepositoryReference;
use crate::facts::hosting::ContributorCounter;
use crate::facts::registry;
use crate::limiter::{Admission, Quota, RateLimiter};
use futures_util::future::join;
use std::sync::Arc;

const LOG_TARGET: &str = "aggregator";

/// What became of a health check request.
#[derive(Debug)]
pub struct CheckOutcome {
    /// The client's remaining budget, when the request got as far as the rate limiter.
    pub quota: Option<Quota>,

    pub result: Result<AggregatedResult, ServiceError>,
}

/// Fans a package name out to the npm registry, npm download statistics, and
/// GitHub, and merges what comes back into one [`AggregatedResult`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: registry::Client,
    contributors: ContributorCounter,
    limiter: Arc<RateLimiter>,
    client_ip_headers: Arc<[String]>,
}

impl Aggregator {
    #[must_use]
    pub fn new(
        registry: registry::Client,
        contributors: ContributorCounter,
        limiter: Arc<RateLimiter>,
        client_ip_headers: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            registry,
            contributors,
            limiter,
            client_ip_headers: client_ip_headers.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Serve one request from a client: validate it, charge it against the
    /// client's budget, and aggregate.
    pub async fn handle<H>(&self, name: Option<&str>, headers: &H) -> CheckOutcome
    where
        H: HeaderSource + ?Sized,
    {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return CheckOutcome {
                quota: None,
                result: Err(ServiceError::InvalidRequest),
            };
        };

        let key = client_key(headers, &*self.client_ip_headers);
        let quota = match self.limiter.admit(&key) {
            Admission::Admitted(quota) => quota,
            Admission::Limited(quota) => {
                return CheckOutcome {
                    quota: Some(quota),
                    result: Err(ServiceError::RateLimited(quota)),
                };
            }
        };

        let result = self.aggregate(name).await;
        if let Err(e) = &result
            && e.is_internal()
        {
            log::error!(target: LOG_TARGET, "Could not check package '{name}' for client '{key}': {e}");
        }

        CheckOutcome {
            quota: Some(quota),
            result,
        }
    }

    /// Collect the health signals of a package, bypassing the rate limiter.
    ///
    /// Downloads and contributors are fetched concurrently. Contributors are only
    /// fetched when the package declares a GitHub repository; if that fetch fails,
    /// the whole aggregation fails.
    pub async fn aggregate(&self, name: &str) -> Result<AggregatedResult, ServiceError> {
        let metadata = self
            .registry
            .package_metadata(name)
            .await
            .map_err(|e| ServiceError::from_registry(name, e))?;

        let latest = metadata.release_info().map_err(ServiceError::MalformedMetadata)?;

        let repository = RepositoryReference::resolve(&metadata);
        if repository.is_none() {
            log::debug!(target: LOG_TARGET, "Package '{name}' declares no GitHub repository, skipping contributors");
        }

        let contributors = async {
            match &repository {
                Some(r) => self.contributors.count(r).await.map(Some),
                None => Ok(None),
            }
        };

        // both branches settle before either result is looked at
        let (downloads, contributors) = join(self.registry.download_count(name), contributors).await;

        let downloads = downloads.map_err(ServiceError::from_signal)?;
        let contributors = contributors.map_err(ServiceError::from_signal)?;

        Ok(AggregatedResult::new(
            latest,
            downloads.downloads,
            repository.as_ref().zip(contributors),
        ))
    }
}
