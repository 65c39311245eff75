use crate::facts::{ReleaseInfo, RepositoryReference};
use serde::Serialize;

/// Everything known about a package's health, as returned to clients.
///
/// `contributors` and `github` come from the same repository reference, so they
/// are either both present or both absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedResult {
    latest: ReleaseInfo,
    downloads: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    contributors: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    github: Option<String>,
}

impl AggregatedResult {
    #[must_use]
    pub fn new(latest: ReleaseInfo, downloads: u64, repository: Option<(&RepositoryReference, u64)>) -> Self {
        let (github, contributors) = repository.map(|(r, count)| (r.github_url(), count)).unzip();

        Self {
            latest,
            downloads,
            contributors,
            github,
        }
    }

    #[must_use]
    pub const fn latest(&self) -> &ReleaseInfo {
        &self.latest
    }

    #[must_use]
    pub const fn downloads(&self) -> u64 {
        self.downloads
    }

    #[must_use]
    pub const fn contributors(&self) -> Option<u64> {
        self.contributors
    }

    #[must_use]
    pub fn github_url(&self) -> Option<&str> {
        self.github.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn release() -> ReleaseInfo {
        ReleaseInfo {
            version: "4.0.10".to_string(),
            published_at: DateTime::parse_from_rfc3339("2024-03-05T22:27:53.005Z").unwrap().to_utc(),
        }
    }

    #[test]
    fn test_serialize_with_repository() {
        let repo = RepositoryReference::new("honojs", "hono", None);
        let result = AggregatedResult::new(release(), 143_796, Some((&repo, 110)));

        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"latest":{"version":"4.0.10","publishedAt":"2024-03-05T22:27:53.005Z"},"downloads":143796,"contributors":110,"github":"https://github.com/honojs/hono"}"#
        );
    }

    #[test]
    fn test_serialize_without_repository() {
        let result = AggregatedResult::new(release(), 12, None);

        assert_eq!(result.contributors(), None);
        assert_eq!(result.github_url(), None);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"latest":{"version":"4.0.10","publishedAt":"2024-03-05T22:27:53.005Z"},"downloads":12}"#
        );
    }

    #[test]
    fn test_zero_contributors_is_still_present() {
        let repo = RepositoryReference::new("someone", "empty", None);
        let result = AggregatedResult::new(release(), 0, Some((&repo, 0)));

        assert_eq!(result.contributors(), Some(0));
        assert_eq!(result.github_url(), Some("https://github.com/someone/empty"));
    }
}
