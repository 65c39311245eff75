//! npm registry and download-statistics data

mod client;
mod download_count;

pub use client::{Client, NPM_DOWNLOADS_URL, NPM_REGISTRY_URL};
pub use download_count::{DownloadCount, DownloadPeriod};
