//! `LogListener` trait: abstraction over the streaming transport.

use async_trait::async_trait;
use chainalert_core::{
    error::StreamError,
    event::{LogFilter, SubscribedLog},
};
use futures::Stream;
use std::pin::Pin;

/// Logs from every registered filter, multiplexed into one stream.
/// Errors are surfaced for logging; the stream ends when the transport does.
pub type SubscribedLogStream =
    Pin<Box<dyn Stream<Item = Result<SubscribedLog, StreamError>> + Send>>;

#[async_trait]
pub trait LogListener: Send + Sync {
    /// Register every filter and start streaming. `SubscribedLog::filter`
    /// is the index into `filters` that matched.
    async fn subscribe(&self, filters: Vec<LogFilter>) -> Result<SubscribedLogStream, StreamError>;

    /// Returns `true` while the underlying connection is open.
    fn is_connected(&self) -> bool;
}
