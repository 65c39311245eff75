use crate::Result;
use crate::facts::hosting::{ContributorCountStrategy, GITHUB_API_URL};
use crate::facts::registry::{DownloadPeriod, NPM_DOWNLOADS_URL, NPM_REGISTRY_URL};
use crate::limiter::RateLimitConfig;
use crate::service::{DEFAULT_CLIENT_IP_HEADERS, HealthThresholds};
use axum::http::{HeaderName, HeaderValue};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Configuration file looked up in the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "npm-health.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the npm registry
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Base URL of the npm download statistics API
    #[serde(default = "default_downloads_url")]
    pub downloads_url: String,

    /// Base URL of the GitHub REST API
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    #[serde(default)]
    pub download_period: DownloadPeriod,

    /// Identifying User-Agent sent to every upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound on each upstream call
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    #[serde(default)]
    pub contributor_count: ContributorCountStrategy,

    #[serde(default = "default_max_contributor_pages")]
    pub max_contributor_pages: u32,

    /// Headers identifying a client, most trusted first
    #[serde(default = "default_client_ip_headers")]
    pub client_ip_headers: Vec<String>,

    /// Cache-Control value attached to successful responses
    #[serde(default = "default_cache_control")]
    pub cache_control: String,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub health: HealthThresholds,
}

fn default_registry_url() -> String {
    NPM_REGISTRY_URL.to_string()
}

fn default_downloads_url() -> String {
    NPM_DOWNLOADS_URL.to_string()
}

fn default_github_api_url() -> String {
    GITHUB_API_URL.to_string()
}

fn default_user_agent() -> String {
    "npm-package-check".to_string()
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

const fn default_max_contributor_pages() -> u32 {
    100
}

fn default_client_ip_headers() -> Vec<String> {
    DEFAULT_CLIENT_IP_HEADERS.iter().map(ToString::to_string).collect()
}

fn default_cache_control() -> String {
    "max-age=86400, stale-while-revalidate=3600".to_string()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `npm-health.toml` in the working directory is used
    /// when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading npm-health configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let path = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading npm-health configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("registry_url", &self.registry_url),
            ("downloads_url", &self.downloads_url),
            ("github_api_url", &self.github_api_url),
        ] {
            let _ = Url::parse(value).into_app_err_with(|| format!("{key} is not a valid URL: '{value}'"))?;
        }

        if self.user_agent.trim().is_empty() {
            bail!("user_agent must not be empty");
        }

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than zero");
        }

        if self.max_contributor_pages == 0 {
            bail!("max_contributor_pages must be at least 1");
        }

        for name in &self.client_ip_headers {
            let _ = HeaderName::from_bytes(name.as_bytes()).into_app_err_with(|| format!("client_ip_headers contains an invalid header name: '{name}'"))?;
        }

        let _ = HeaderValue::from_str(&self.cache_control).into_app_err_with(|| format!("cache_control is not a valid header value: '{}'", self.cache_control))?;

        if self.rate_limit.capacity == 0 {
            bail!("rate_limit.capacity must be at least 1");
        }

        if self.rate_limit.threshold == 0 {
            bail!("rate_limit.threshold must be at least 1");
        }

        if self.rate_limit.window.is_zero() {
            bail!("rate_limit.window must be greater than zero");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            downloads_url: default_downloads_url(),
            github_api_url: default_github_api_url(),
            download_period: DownloadPeriod::default(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            contributor_count: ContributorCountStrategy::default(),
            max_contributor_pages: default_max_contributor_pages(),
            client_ip_headers: default_client_ip_headers(),
            cache_control: default_cache_control(),
            rate_limit: RateLimitConfig::default(),
            health: HealthThresholds::default(),
        }
    }
}
