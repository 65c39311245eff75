//! Plumbing shared between commands.

use super::config::Config;
use crate::Result;
use crate::facts::hosting::{self, ContributorCounter};
use crate::facts::registry;
use crate::limiter::RateLimiter;
use crate::service::Aggregator;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use std::sync::Arc;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    pub fn use_colors(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                use std::io::{IsTerminal, stdout};
                stdout().is_terminal()
            }
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every command that talks to upstreams
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Path to configuration file (default is `npm-health.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CommonArgs {
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }
}

/// Initialize `env_logger`; `RUST_LOG` takes precedence over `log_level`.
pub fn init_logging(log_level: LogLevel, timestamps: bool) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let mut builder = env_logger::Builder::from_env(env);
    let _ = builder
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace));

    if !timestamps {
        let _ = builder.format_timestamp(None);
    }

    // a logger may already be installed when commands run in-process more than once
    let _ = builder.try_init();
}

/// Wire up the upstream clients, the rate limiter, and the orchestrator described by `config`.
pub fn build_aggregator(config: &Config, github_token: Option<&str>) -> Result<Aggregator> {
    let registry = registry::Client::new(
        &config.registry_url,
        &config.downloads_url,
        config.download_period,
        &config.user_agent,
        config.request_timeout,
    )?;

    let github = hosting::Client::new(github_token, &config.github_api_url, &config.user_agent, config.request_timeout)?;
    let contributors = ContributorCounter::new(github, config.contributor_count, config.max_contributor_pages);

    if github_token.is_none() {
        log::warn!("No GitHub token supplied, contributor lookups are subject to the anonymous rate limit");
    }

    Ok(Aggregator::new(
        registry,
        contributors,
        Arc::new(RateLimiter::new(config.rate_limit)),
        config.client_ip_headers.iter().cloned(),
    ))
}
