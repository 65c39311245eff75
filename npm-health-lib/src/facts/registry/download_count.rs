use chrono::NaiveDate;
use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// Download volume for a package over one reporting period.
///
/// See <https://github.com/npm/registry/blob/master/docs/download-counts.md>.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadCount {
    pub downloads: u64,

    #[serde(rename = "start")]
    pub period_start: NaiveDate,

    #[serde(rename = "end")]
    pub period_end: NaiveDate,

    pub package: String,
}

/// Which trailing window the download count covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadPeriod {
    LastDay,
    #[default]
    LastWeek,
    LastMonth,
}

impl DownloadPeriod {
    /// The path segment the download-count endpoint expects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastDay => "last-day",
            Self::LastWeek => "last-week",
            Self::LastMonth => "last-month",
        }
    }
}

impl Display for DownloadPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
