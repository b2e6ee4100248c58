//! # chainalert-stream
//!
//! Watches pools over a streaming transport and turns each matching log into
//! an alert.
//!
//! ## Architecture
//! ```text
//! LogListener (one connection, one filter per pool)
//!       │  SubscribedLog { filter, log }
//!       ▼
//! Dispatcher ── one Tokio task per log ──▶ LogHandler
//!                                              │ decode or fall back
//!                                              ▼
//!                                          AlertSink::send
//! ```

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod listener;
pub mod ws_listener;

pub use context::RelayContext;
pub use dispatcher::{DispatchStats, Dispatcher};
pub use handler::{HandledLog, LogHandler};
pub use listener::{LogListener, SubscribedLogStream};
pub use ws_listener::EvmWsListener;
