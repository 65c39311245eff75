use thiserror::Error;

/// Why an upstream fetch did not produce data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The upstream answered, but does not know the requested resource.
    #[error("{0} not found")]
    NotFound(String),

    /// The upstream refused the request because its quota is exhausted.
    #[error("rate limited by {upstream} (HTTP {status})")]
    RateLimited { upstream: &'static str, status: u16 },

    /// The upstream could not be reached or answered with an error.
    #[error("{0:#}")]
    Unavailable(ohno::AppError),

    /// The upstream answered with a payload that violates its documented contract.
    #[error("{0}")]
    Malformed(String),
}

impl From<ohno::AppError> for FetchError {
    fn from(e: ohno::AppError) -> Self {
        Self::Unavailable(e)
    }
}
