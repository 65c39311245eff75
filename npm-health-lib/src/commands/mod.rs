//! Command-line interface for npm-health
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler:
//!
//! - **serve**: Run the HTTP service answering `GET /api/npm?name=<package>`
//! - **check**: Aggregate and assess a single package from the command line
//! - **init**: Generate a default configuration file
//! - **validate**: Check configuration file syntax and values
//!
//! All commands read the same TOML configuration file, which controls the
//! upstream endpoints, the rate limiter, and the health thresholds.

mod check;
mod common;
mod config;
mod host;
mod init;
mod run;
mod serve;
mod validate;

pub use check::{CheckArgs, check_package};
pub use common::{ColorMode, CommonArgs, LogLevel, build_aggregator};
pub use config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TOML};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use serve::{ServeArgs, serve};
pub use validate::{ValidateArgs, validate_config};
