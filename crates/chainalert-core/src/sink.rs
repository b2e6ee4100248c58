//! `AlertSink` trait: the seam between the relay and a chat transport.

use crate::error::SinkError;
use async_trait::async_trait;

/// Republishes a finished alert message.
///
/// Delivery is best effort: the relay logs a failed send and drops the
/// message, it never retries.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Short name used in logs, e.g. "telegram".
    fn name(&self) -> &str;

    /// Send one message.
    async fn send(&self, message: &str) -> Result<(), SinkError>;
}
