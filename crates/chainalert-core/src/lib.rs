//! # chainalert-core
//!
//! Core types shared by every ChainAlert crate: watched pools, raw and
//! decoded logs, the error taxonomy, the `AlertSink` seam and the alert
//! message renderer. The listener, decoder and notifier crates are all
//! built on the interfaces defined here.

pub mod alert;
pub mod error;
pub mod event;
pub mod pool;
pub mod sink;
pub mod types;

pub use alert::{classify_symbol, AlertKind, ExplorerLinks};
pub use error::{ConfigError, DecodeError, DescriptorError, SinkError, StreamError};
pub use event::{DecodedLog, LogFilter, RawLog, SubscribedLog};
pub use pool::{PoolConfig, PoolRegistry};
pub use sink::AlertSink;
pub use types::NormalizedValue;
