//! # chainalert-observability
//!
//! Structured logging for ChainAlert: human-readable text for terminals,
//! JSON lines for log shippers. Levels are configurable per component.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
