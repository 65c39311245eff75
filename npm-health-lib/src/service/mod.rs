//! The package health aggregation service.
//!
//! [`Aggregator`] is the orchestrator: it validates a request, charges it against
//! the client's budget, fetches the registry document, and then fetches the
//! download and contributor signals concurrently. [`assess`] turns an aggregated
//! result into a per-signal verdict.

mod aggregated_result;
mod aggregator;
mod client_key;
mod error;
mod health;

pub use aggregated_result::AggregatedResult;
pub use aggregator::{Aggregator, CheckOutcome};
pub use client_key::{DEFAULT_CLIENT_IP_HEADERS, HeaderSource, UNKNOWN_CLIENT, client_key};
pub use error::ServiceError;
pub use health::{HealthReport, HealthThresholds, SignalHealth, assess};
