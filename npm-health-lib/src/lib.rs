#![doc(hidden)]

//! Core library for npm-health
//!
//! This library answers "is this npm package healthy?" by aggregating three
//! independent signals: how recently the latest version was published, how many
//! downloads the package received over a recent window, and how many people have
//! contributed to its GitHub repository.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`facts`]: Upstream clients for the npm registry, npm download statistics, and GitHub
//! - [`limiter`]: Bounded, time-expiring per-client request budget
//! - [`service`]: Request validation, signal aggregation, and health assessment
//! - [`server`]: HTTP surface exposing the aggregation service

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub(crate) type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod facts;
pub mod limiter;
pub mod server;
pub mod service;

pub use crate::commands::{Host, run};
