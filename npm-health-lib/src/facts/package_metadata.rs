//! npm registry package metadata and the release information derived from it.
//!
//! See <https://github.com/npm/registry/blob/master/docs/responses/package-metadata.md>.
//! The registry document is free-form JSON, so only the handful of fields we rely
//! on are modeled and each of them is optional at the serde level. Required fields
//! are checked explicitly in [`PackageMetadata::release_info`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The subset of a registry package document we care about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "dist-tags")]
    pub dist_tags: Option<DistTags>,

    /// Version (plus `created`/`modified`) to ISO-8601 publish timestamp.
    #[serde(default)]
    pub time: Map<String, Value>,

    /// Unrecognizable shapes are dropped rather than failing the whole document.
    #[serde(default, deserialize_with = "lenient_repository")]
    pub repository: Option<RepositoryField>,
}

fn lenient_repository<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RepositoryField>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistTags {
    #[serde(default)]
    pub latest: Option<String>,
}

/// The `repository` field of a package manifest.
///
/// See <https://docs.npmjs.com/cli/v10/configuring-npm/package-json#repository>.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RepositoryField {
    /// Shorthand form, e.g. `"github:owner/repo"`.
    Url(String),

    Detailed {
        #[serde(default)]
        url: Option<String>,

        /// Subdirectory of a monorepo holding the package.
        #[serde(default)]
        directory: Option<String>,
    },
}

impl RepositoryField {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Detailed { url, .. } => url.as_deref(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Detailed { directory, .. } => directory.as_deref(),
        }
    }
}

/// Latest version of a package and when it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub version: String,

    #[serde(serialize_with = "serialize_timestamp")]
    pub published_at: DateTime<Utc>,
}

/// npm publishes timestamps with millisecond precision and a `Z` suffix; echo that shape back.
fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl PackageMetadata {
    /// Extract the latest version and its publish timestamp.
    ///
    /// Fails when `dist-tags.latest` is missing, when `time` has no entry for that
    /// version, or when the entry is not an RFC 3339 timestamp. Any of these means
    /// the registry broke its own contract.
    pub fn release_info(&self) -> Result<ReleaseInfo, String> {
        let version = self
            .dist_tags
            .as_ref()
            .and_then(|tags| tags.latest.as_deref())
            .ok_or_else(|| "missing dist-tags.latest".to_string())?;

        let raw = self
            .time
            .get(version)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("missing publish time for version '{version}'"))?;

        let published_at = DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid publish time '{raw}' for version '{version}': {e}"))?
            .with_timezone(&Utc);

        Ok(ReleaseInfo {
            version: version.to_string(),
            published_at,
        })
    }
}
