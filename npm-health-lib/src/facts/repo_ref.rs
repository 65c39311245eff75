use super::PackageMetadata;
use core::fmt::{Display, Formatter};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Full URLs: `git://`, `git+ssh://git@`, `git+https://`, `https://`, `ssh://git@`, all ending in `.git`.
static GIT_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:git|git\+ssh|git\+https|https|ssh)://(?:git@)?github\.com/(?<owner>[^/]+?)/(?<repo>[^/]+?)\.git$")
        .expect("invalid regex")
});

/// Plain browser URL without the `.git` suffix.
static HTTPS_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://github\.com/(?<owner>[^/]+?)/(?<repo>[^/]+?)/?$").expect("invalid regex"));

/// `github:{owner}/{repo}` shorthand.
static SHORTHAND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^github:(?<owner>[^/]+?)/(?<repo>[^/]+?)$").expect("invalid regex"));

/// A GitHub repository a package declares as its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    owner: Arc<str>,
    repo: Arc<str>,

    /// Monorepo subdirectory; informational only.
    directory: Option<Arc<str>>,
}

impl RepositoryReference {
    #[must_use]
    pub fn new(owner: &str, repo: &str, directory: Option<&str>) -> Self {
        Self {
            owner: Arc::from(owner),
            repo: Arc::from(repo),
            directory: directory.map(Arc::from),
        }
    }

    /// Resolve the GitHub repository declared by a package, if any.
    ///
    /// Never fails: a missing, malformed, or non-GitHub `repository` field yields `None`.
    #[must_use]
    pub fn resolve(metadata: &PackageMetadata) -> Option<Self> {
        let repository = metadata.repository.as_ref()?;
        let mut reference = Self::parse(repository.url()?)?;
        reference.directory = repository.directory().map(Arc::from);
        Some(reference)
    }

    /// Parse a repository URL in one of the shapes npm packages use to point at GitHub.
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let captures = GIT_URL_REGEX
            .captures(url)
            .or_else(|| HTTPS_URL_REGEX.captures(url))
            .or_else(|| SHORTHAND_REGEX.captures(url))?;

        let owner = captures.name("owner")?.as_str();
        let repo = captures.name("repo")?.as_str();

        if !is_owner_name(owner) || !is_repo_name(repo) {
            return None;
        }

        Some(Self::new(owner, repo, None))
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    #[must_use]
    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    /// The repository's page on github.com.
    #[must_use]
    pub fn github_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

/// GitHub user and organization names: alphanumerics and hyphens.
fn is_owner_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Repository names also allow `.` and `_`, but never resolve to a dot segment.
fn is_repo_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_'))
        && !name.bytes().all(|b| b == b'.')
}

impl Display for RepositoryReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
