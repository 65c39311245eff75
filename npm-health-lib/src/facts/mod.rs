//! Upstream data sources.
//!
//! Everything that talks to the outside world lives here: the npm registry and
//! download-count API in [`registry`], and the GitHub REST API in [`hosting`].
//! Each fetch reports failure as a [`FetchError`] so that callers can tell an
//! unknown package apart from an upstream outage.

mod fetch_error;
pub mod hosting;
pub mod http;
mod package_metadata;
pub mod registry;
mod repo_ref;

pub use fetch_error::FetchError;
pub use package_metadata::{DistTags, PackageMetadata, ReleaseInfo, RepositoryField};
pub use repo_ref::RepositoryReference;
