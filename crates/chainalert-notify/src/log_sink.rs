//! Dry-run sink: alerts go to the log instead of a chat.

use async_trait::async_trait;
use chainalert_core::{error::SinkError, sink::AlertSink};
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &str) -> Result<(), SinkError> {
        info!(message = %message, "alert (dry run)");
        Ok(())
    }
}
