use super::client::{Client, HostingApiResult};
use super::link_header::PageLinks;
use crate::facts::{FetchError, RepositoryReference};
use ohno::EnrichableExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::header::LINK;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "   hosting";
const CONTRIBUTOR_PAGE_SIZE: u8 = 100;
const UPSTREAM: &str = "GitHub";

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// How the number of contributors of a repository is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributorCountStrategy {
    /// Request a single contributor per page and read the page count from the `rel="last"` link.
    ///
    /// Falls back to enumeration when the upstream does not advertise a last page.
    #[default]
    LinkHeader,

    /// Walk every page of contributors and count the entries.
    Enumerate,
}

/// One fetched page of the contributor listing.
#[derive(Debug, Clone, Copy, Default)]
struct Page {
    items: u64,
    has_links: bool,
    links: PageLinks,
}

/// Counts the contributors of GitHub repositories.
#[derive(Debug, Clone)]
pub struct ContributorCounter {
    client: Client,
    strategy: ContributorCountStrategy,
    max_pages: u32,
}

impl ContributorCounter {
    #[must_use]
    pub const fn new(client: Client, strategy: ContributorCountStrategy, max_pages: u32) -> Self {
        Self {
            client,
            strategy,
            max_pages,
        }
    }

    /// Count the contributors of a repository.
    ///
    /// Any failure on any page fails the whole count. Enumeration stops at the
    /// configured page ceiling and reports the partial count gathered so far.
    pub async fn count(&self, reference: &RepositoryReference) -> Result<u64, FetchError> {
        log::info!(target: LOG_TARGET, "Querying {UPSTREAM} for contributors of repository '{reference}'");

        let count = match self.strategy {
            ContributorCountStrategy::LinkHeader => match self.count_from_last_page(reference).await? {
                Some(count) => count,
                None => self.enumerate(reference).await?,
            },
            ContributorCountStrategy::Enumerate => self.enumerate(reference).await?,
        };

        log::debug!(target: LOG_TARGET, "Repository '{reference}' has {count} contributor(s)");
        Ok(count)
    }

    /// With one contributor per page, the last page number is the contributor count.
    ///
    /// Returns `None` when the upstream did not advertise a last page and more than
    /// the first page might exist.
    async fn count_from_last_page(&self, reference: &RepositoryReference) -> Result<Option<u64>, FetchError> {
        let page = self.fetch_page(reference, 1, 1).await?;

        if let Some(last) = page.links.last_page {
            return Ok(Some(last));
        }

        if !page.links.has_next {
            // a single page holds everything there is
            return Ok(Some(page.items));
        }

        log::debug!(target: LOG_TARGET, "No last-page link for repository '{reference}', enumerating contributors");
        Ok(None)
    }

    async fn enumerate(&self, reference: &RepositoryReference) -> Result<u64, FetchError> {
        let mut total = 0;

        for page_num in 1..=self.max_pages {
            let page = self.fetch_page(reference, CONTRIBUTOR_PAGE_SIZE, page_num).await?;
            if page.items == 0 {
                return Ok(total);
            }

            total += page.items;

            // GitHub omits `rel="next"` on the final page
            if page.has_links && !page.links.has_next {
                return Ok(total);
            }
        }

        log::warn!(
            target: LOG_TARGET,
            "Reached maximum contributor page limit ({}) for repository '{reference}', reporting {total} contributor(s)",
            self.max_pages
        );

        Ok(total)
    }

    async fn fetch_page(&self, reference: &RepositoryReference, per_page: u8, page_num: u32) -> Result<Page, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/contributors?per_page={per_page}&page={page_num}",
            self.client.base_url(),
            utf8_percent_encode(reference.owner(), PATH_SEGMENT),
            utf8_percent_encode(reference.repo(), PATH_SEGMENT),
        );

        let resp = match self.client.api_call(&url).await {
            HostingApiResult::Success(resp) => resp,
            HostingApiResult::RateLimited(status, rate_limit) => {
                if let Some(rl) = rate_limit {
                    log::warn!(
                        target: LOG_TARGET,
                        "{UPSTREAM} API rate limit hit for repository '{reference}': {} remaining, resets at {}",
                        rl.remaining,
                        rl.reset_at.with_timezone(&chrono::Local).format("%T")
                    );
                } else {
                    log::warn!(target: LOG_TARGET, "{UPSTREAM} API rate limit hit for repository '{reference}'");
                }
                return Err(FetchError::RateLimited { upstream: UPSTREAM, status });
            }
            HostingApiResult::NotFound => return Err(FetchError::NotFound(format!("repository '{reference}'"))),
            HostingApiResult::Failed(e) => {
                return Err(e.enrich_with(|| format!("fetching contributors page {page_num} for repository '{reference}'")).into());
            }
        };

        // GitHub answers an empty repository with 204 and no body
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(Page::default());
        }

        let links = resp.headers().get(LINK).and_then(|h| h.to_str().ok()).map(PageLinks::parse);

        let entries = resp.json::<Vec<IgnoredAny>>().await.map_err(|e| {
            FetchError::Malformed(format!("undecodable contributors page {page_num} for repository '{reference}': {e}"))
        })?;

        log::debug!(target: LOG_TARGET, "Contributors page {page_num} of repository '{reference}' held {} entries", entries.len());

        Ok(Page {
            items: entries.len() as u64,
            has_links: links.is_some(),
            links: links.unwrap_or_default(),
        })
    }
}
