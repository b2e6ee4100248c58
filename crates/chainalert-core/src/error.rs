//! Error types for the ChainAlert pipeline.
//!
//! None of these escape the relay at runtime: configuration errors degrade a
//! feature, decode errors degrade an alert, sink and stream errors are logged.

use thiserror::Error;

/// Errors raised while resolving the pool registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Pool list is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Pool list must be a JSON array")]
    NotAnArray,

    #[error("Invalid pool entry #{index}: {reason}")]
    InvalidPool { index: usize, reason: String },

    #[error("'{address}' is not a 20-byte hex address")]
    InvalidAddress { address: String },

    #[error("Pool name is empty")]
    EmptyName,

    #[error("Decimals {decimals} out of range (max {max})")]
    DecimalsOutOfRange { decimals: u64, max: u8 },
}

/// Errors raised while building an event descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Event description is not a valid JSON ABI: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Event description contains no event entry")]
    NoEvent,

    #[error("Invalid event signature '{signature}': {reason}")]
    InvalidSignature { signature: String, reason: String },

    #[error("Unsupported parameter type '{ty}': {reason}")]
    UnsupportedType { ty: String, reason: String },

    #[error("Anonymous event '{name}' has no topic to filter on")]
    Anonymous { name: String },
}

/// Errors that can occur while decoding a single log.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Topic mismatch: expected {expected}, got {got}")]
    TopicMismatch { expected: String, got: String },

    #[error("Missing indexed field '{field}' (log has {topics} topics)")]
    MissingField { field: String, topics: usize },

    #[error("Unexpected topic count: expected {expected}, got {got}")]
    TopicCount { expected: usize, got: usize },

    #[error("Invalid topic hex: {reason}")]
    InvalidTopic { reason: String },

    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },
}

/// Errors from the streaming transport.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("RPC connection failed: {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Subscription for filter #{filter} rejected: {reason}")]
    SubscriptionRejected { filter: usize, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Stream closed by server")]
    Closed,
}

/// Errors from an alert sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Message rejected (status {status}): {description}")]
    Rejected { status: u16, description: String },
}
