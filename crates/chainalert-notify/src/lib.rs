//! # chainalert-notify
//!
//! `AlertSink` implementations.
//!
//! - [`TelegramSink`] posts to the Telegram Bot API in HTML parse mode
//! - [`LogSink`] only logs the message, for dry runs without credentials

pub mod log_sink;
pub mod telegram;

pub use log_sink::LogSink;
pub use telegram::TelegramSink;
