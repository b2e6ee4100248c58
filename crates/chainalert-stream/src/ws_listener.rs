//! `EvmWsListener`: `LogListener` over an Ethereum JSON-RPC WebSocket.
//!
//! One connection carries every pool: each filter is registered with its own
//! `eth_subscribe("logs", filter)` request (JSON-RPC id = filter index + 1),
//! and incoming `eth_subscription` notifications are routed back to the
//! filter by subscription id.
//!
//! Reconnection is not attempted: a transport error or close frame is
//! surfaced on the stream, which then ends.
//!
//! # Usage
//! ```no_run
//! use chainalert_stream::ws_listener::EvmWsListener;
//! use std::sync::Arc;
//!
//! let listener = Arc::new(EvmWsListener::new("wss://mainnet.infura.io/ws/v3/YOUR_KEY"));
//! ```

use crate::listener::{LogListener, SubscribedLogStream};
use async_trait::async_trait;
use chainalert_core::{
    error::StreamError,
    event::{LogFilter, RawLog, SubscribedLog},
};
use futures::{channel::mpsc, SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type LogSender = mpsc::Sender<Result<SubscribedLog, StreamError>>;

/// EVM WebSocket log listener.
pub struct EvmWsListener {
    rpc_url: String,
    connected: Arc<AtomicBool>,
}

impl EvmWsListener {
    /// Create a listener for a `ws://` or `wss://` endpoint.
    /// Nothing connects until `subscribe` is called.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl LogListener for EvmWsListener {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn subscribe(&self, filters: Vec<LogFilter>) -> Result<SubscribedLogStream, StreamError> {
        let ws_stream = match connect_async(self.rpc_url.as_str()).await {
            Ok((ws, _)) => {
                self.connected.store(true, Ordering::Relaxed);
                info!(filters = filters.len(), "WebSocket connected");
                ws
            }
            Err(e) => {
                self.connected.store(false, Ordering::Relaxed);
                error!(error = %e, "WebSocket connect failed");
                return Err(StreamError::ConnectionFailed {
                    url: redact_url(&self.rpc_url),
                    reason: e.to_string(),
                });
            }
        };

        let (tx, rx) = mpsc::channel::<Result<SubscribedLog, StreamError>>(512);
        let connected = Arc::clone(&self.connected);

        tokio::spawn(async move {
            run_ws_subscription(ws_stream, filters, connected, tx).await;
        });

        Ok(Box::pin(rx))
    }
}

// ─── Internal WebSocket loop ──────────────────────────────────────────────────

async fn run_ws_subscription(
    ws_stream: WsStream,
    filters: Vec<LogFilter>,
    connected: Arc<AtomicBool>,
    mut tx: LogSender,
) {
    let (mut write, mut read) = ws_stream.split();

    for (index, filter) in filters.iter().enumerate() {
        let sub_msg = serde_json::json!({
            "jsonrpc": "2.0",
            "id": index as u64 + 1,
            "method": "eth_subscribe",
            "params": ["logs", filter.to_rpc_params()]
        });
        if let Err(e) = write.send(Message::Text(sub_msg.to_string())).await {
            error!(filter = index, error = %e, "failed to send eth_subscribe");
            connected.store(false, Ordering::Relaxed);
            let _ = tx.send(Err(StreamError::Transport(e.to_string()))).await;
            return;
        }
    }

    // subscription id → filter index
    let mut routes: HashMap<String, usize> = HashMap::new();

    while let Some(msg_result) = read.next().await {
        match msg_result {
            Err(e) => {
                warn!(error = %e, "WebSocket error");
                connected.store(false, Ordering::Relaxed);
                let _ = tx.send(Err(StreamError::Transport(e.to_string()))).await;
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("WS message: {}", text.chars().take(120).collect::<String>());
                match parse_frame(&text) {
                    Frame::Subscribed { request_id, subscription } => {
                        match filter_index(request_id, filters.len()) {
                            Some(index) => {
                                info!(
                                    filter = index,
                                    address = %filters[index].address,
                                    subscription = %subscription,
                                    "log subscription active"
                                );
                                routes.insert(subscription, index);
                            }
                            None => debug!(request_id, "response to unknown request"),
                        }
                    }
                    Frame::Rejected { request_id, reason } => {
                        if let Some(index) = filter_index(request_id, filters.len()) {
                            let err = StreamError::SubscriptionRejected { filter: index, reason };
                            if tx.send(Err(err)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Frame::Log { subscription, log } => match routes.get(&subscription) {
                        Some(&filter) => {
                            if tx.send(Ok(SubscribedLog { filter, log })).await.is_err() {
                                // Receiver dropped
                                break;
                            }
                        }
                        None => debug!(subscription = %subscription, "log for unknown subscription"),
                    },
                    Frame::Ignored => {}
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by server");
                connected.store(false, Ordering::Relaxed);
                let _ = tx.send(Err(StreamError::Closed)).await;
                break;
            }
            Ok(Message::Ping(data)) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(_) => {} // binary / pong
        }
    }

    connected.store(false, Ordering::Relaxed);
    info!("WebSocket subscription loop ended");
}

fn filter_index(request_id: u64, filters: usize) -> Option<usize> {
    let index = usize::try_from(request_id).ok()?.checked_sub(1)?;
    (index < filters).then_some(index)
}

// ─── Message parsing ─────────────────────────────────────────────────────────

/// A classified inbound WebSocket text frame.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// `eth_subscribe` succeeded
    Subscribed { request_id: u64, subscription: String },
    /// `eth_subscribe` returned an error
    Rejected { request_id: u64, reason: String },
    /// `eth_subscription` log notification
    Log { subscription: String, log: RawLog },
    /// Anything else: removed logs, malformed frames, unrelated responses
    Ignored,
}

fn parse_frame(text: &str) -> Frame {
    let Ok(v) = serde_json::from_str::<Value>(text) else {
        return Frame::Ignored;
    };

    if v.get("method").and_then(|m| m.as_str()) == Some("eth_subscription") {
        return parse_notification(&v);
    }

    let Some(request_id) = v.get("id").and_then(|id| id.as_u64()) else {
        return Frame::Ignored;
    };
    if let Some(subscription) = v.get("result").and_then(|r| r.as_str()) {
        return Frame::Subscribed {
            request_id,
            subscription: subscription.to_lowercase(),
        };
    }
    if let Some(err) = v.get("error") {
        let reason = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| err.to_string());
        return Frame::Rejected { request_id, reason };
    }
    Frame::Ignored
}

fn parse_notification(v: &Value) -> Frame {
    let Some(params) = v.get("params") else {
        debug!("eth_subscription without params");
        return Frame::Ignored;
    };
    let Some(subscription) = params
        .get("subscription")
        .and_then(|s| s.as_str())
        .map(str::to_lowercase)
    else {
        debug!("eth_subscription without subscription id");
        return Frame::Ignored;
    };
    let Some(result) = params.get("result") else {
        debug!(subscription = %subscription, "eth_subscription without result");
        return Frame::Ignored;
    };

    // Skip reorged/removed logs
    if result
        .get("removed")
        .and_then(|r| r.as_bool())
        .unwrap_or(false)
    {
        debug!(subscription = %subscription, "skipping removed log");
        return Frame::Ignored;
    }

    let Some(address) = result.get("address").and_then(|a| a.as_str()) else {
        debug!(subscription = %subscription, "dropping log without address");
        return Frame::Ignored;
    };
    let Some(topics) = result.get("topics").and_then(|t| t.as_array()) else {
        debug!(subscription = %subscription, "dropping log without topics");
        return Frame::Ignored;
    };
    let topics: Vec<String> = topics
        .iter()
        .filter_map(|t| t.as_str().map(String::from))
        .collect();

    // Pending logs carry no transaction hash yet
    let Some(transaction_hash) = result.get("transactionHash").and_then(|h| h.as_str()) else {
        debug!(subscription = %subscription, "dropping log without transaction hash");
        return Frame::Ignored;
    };

    let data_hex = result
        .get("data")
        .and_then(|d| d.as_str())
        .unwrap_or("0x");
    let data = match hex::decode(data_hex.strip_prefix("0x").unwrap_or(data_hex)) {
        Ok(data) => data,
        Err(e) => {
            warn!(
                subscription = %subscription,
                tx = %transaction_hash,
                error = %e,
                "dropping log with malformed data"
            );
            return Frame::Ignored;
        }
    };

    Frame::Log {
        subscription,
        log: RawLog {
            address: address.to_lowercase(),
            topics,
            data,
            transaction_hash: transaction_hash.to_string(),
            block_number: hex_str_to_u64(result.get("blockNumber").and_then(|b| b.as_str())),
            log_index: hex_str_to_u64(result.get("logIndex").and_then(|l| l.as_str())),
        },
    }
}

fn hex_str_to_u64(s: Option<&str>) -> Option<u64> {
    s.and_then(|h| u64::from_str_radix(h.strip_prefix("0x").unwrap_or(h), 16).ok())
}

/// Reduce an endpoint to `scheme://host[:port]` before logging it.
/// Provider API keys live in the userinfo, path or query.
fn redact_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return "<invalid url>".into();
    };
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
