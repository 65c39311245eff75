use crate::facts::FetchError;
use crate::limiter::Quota;
use thiserror::Error;

/// Why a health check request did not produce a result.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller did not name a package.
    #[error("no package name supplied")]
    InvalidRequest,

    /// The caller exhausted its request budget.
    #[error("request budget exhausted ({} request(s) allowed)", .0.limit)]
    RateLimited(Quota),

    /// The npm registry does not know the package.
    #[error("package '{0}' not found")]
    PackageNotFound(String),

    /// The registry answered with a document that breaks its own contract.
    #[error("malformed registry metadata: {0}")]
    MalformedMetadata(String),

    /// An upstream could not be reached or failed.
    #[error("upstream unavailable: {0:#}")]
    UpstreamUnavailable(ohno::AppError),

    /// An upstream refused to serve because its quota is exhausted.
    #[error("upstream rate limited: {0}")]
    UpstreamRateLimited(String),
}

impl ServiceError {
    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::RateLimited(_) => 429,
            Self::PackageNotFound(_) => 404,
            Self::MalformedMetadata(_) | Self::UpstreamUnavailable(_) | Self::UpstreamRateLimited(_) => 500,
        }
    }

    /// Message shown to the client. Upstream faults are deliberately vague.
    #[must_use]
    pub const fn client_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Package name is required.",
            Self::RateLimited(_) => "Too many requests",
            Self::PackageNotFound(_) => "Package not found.",
            Self::MalformedMetadata(_) | Self::UpstreamUnavailable(_) | Self::UpstreamRateLimited(_) => "Internal server error.",
        }
    }

    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Classify a failure to fetch package metadata from the registry.
    pub(crate) fn from_registry(name: &str, e: FetchError) -> Self {
        match e {
            FetchError::NotFound(_) => Self::PackageNotFound(name.to_string()),
            FetchError::Malformed(reason) => Self::MalformedMetadata(reason),
            FetchError::RateLimited { .. } => Self::UpstreamRateLimited(e.to_string()),
            FetchError::Unavailable(e) => Self::UpstreamUnavailable(e),
        }
    }

    /// Classify a failure to fetch one of the download or contributor signals.
    ///
    /// Once the package is known to exist, any missing signal is an upstream fault.
    pub(crate) fn from_signal(e: FetchError) -> Self {
        match e {
            FetchError::RateLimited { .. } => Self::UpstreamRateLimited(e.to_string()),
            FetchError::Unavailable(e) => Self::UpstreamUnavailable(e),
            FetchError::NotFound(_) | FetchError::Malformed(_) => Self::UpstreamUnavailable(ohno::app_err!("{e}")),
        }
    }
}
