//! HTTP client for the external anomaly detector.
//!
//! The detector answers every call with a `{status, data}` envelope. This
//! crate decodes that envelope into typed records and exposes the three
//! concerns the server depends on: rule-set change notification
//! ([`RuleSetNotifier`]), monitoring views, and metric queries
//! ([`MetricSource`]).

pub mod client;
pub mod envelope;
pub mod error;
pub mod monitor;
pub mod notifier;
pub mod prometheus;


pub use client::DetectorClient;
pub use error::{DetectorError, Result};
pub use notifier::RuleSetNotifier;
pub use prometheus::{validate_expression, MetricSource};
