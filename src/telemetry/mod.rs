//! Telemetry module for logging and metrics.
//!
//! Provides:
//! - Logging configuration and initialization
//! - Per-app decision counters

mod logging;
mod metrics;

pub use logging::{init_logging, LogConfig};
pub use metrics::{AppStats, Counter, DropStats};
