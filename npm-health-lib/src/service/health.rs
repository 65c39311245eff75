//! Classification of aggregated signals into healthy and unhealthy.

use super::AggregatedResult;
use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// The floors and ceilings a package must meet to be considered healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthThresholds {
    /// Fewest downloads over the configured period.
    pub min_downloads: u64,

    /// Fewest contributors to the package's repository.
    pub min_contributors: u64,

    /// Longest time since the latest release was published.
    #[serde(with = "humantime_serde")]
    pub max_release_age: Duration,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            min_downloads: 1000,
            min_contributors: 3,
            max_release_age: Duration::from_secs(365 * 24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalHealth {
    Healthy,
    Unhealthy,

    /// The signal could not be determined, e.g. no repository is declared.
    Unknown,
}

impl Display for SignalHealth {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub release: SignalHealth,
    pub downloads: SignalHealth,
    pub contributors: SignalHealth,
}

impl HealthReport {
    /// Healthy unless some signal is unhealthy. Unknown signals do not count against a package.
    #[must_use]
    pub fn overall(&self) -> SignalHealth {
        if [self.release, self.downloads, self.contributors].contains(&SignalHealth::Unhealthy) {
            SignalHealth::Unhealthy
        } else {
            SignalHealth::Healthy
        }
    }
}

const fn at_least(value: u64, floor: u64) -> SignalHealth {
    if value >= floor {
        SignalHealth::Healthy
    } else {
        SignalHealth::Unhealthy
    }
}

#[must_use]
pub fn assess(result: &AggregatedResult, thresholds: &HealthThresholds, now: DateTime<Utc>) -> HealthReport {
    let age = now.signed_duration_since(result.latest().published_at);
    let release = match chrono::Duration::from_std(thresholds.max_release_age) {
        Ok(max_age) if age > max_age => SignalHealth::Unhealthy,
        _ => SignalHealth::Healthy,
    };

    HealthReport {
        release,
        downloads: at_least(result.downloads(), thresholds.min_downloads),
        contributors: result
            .contributors()
            .map_or(SignalHealth::Unknown, |c| at_least(c, thresholds.min_contributors)),
    }
}
