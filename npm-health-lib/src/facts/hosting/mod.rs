//! Facts about the GitHub repository a package is developed in.

mod client;
mod link_header;
mod provider;

pub use client::{Client, GITHUB_API_URL, HostingApiResult, RateLimitInfo};
pub use link_header::PageLinks;
pub use provider::{ContributorCountStrategy, ContributorCounter};
