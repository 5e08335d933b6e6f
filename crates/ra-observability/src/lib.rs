//! # ra-observability
//!
//! Logging and metrics infrastructure for risk-adjust.
//!
//! This crate provides structured logging with tracing and adjustment
//! metrics built on the `metrics` crate.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LoggingConfig};
pub use metrics::{AdjustmentMetrics, AdjustmentSummary};
