//! Telegram Bot API sink.
//!
//! One `sendMessage` call per alert, HTML parse mode, no retries. The bot
//! token is part of the request URL, so request errors are reported
//! without their URL.

use async_trait::async_trait;
use chainalert_core::{error::SinkError, sink::AlertSink};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public Bot API endpoint.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts to one Telegram chat.
pub struct TelegramSink {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSink")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramSink {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("chainalert/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_base: TELEGRAM_API_BASE.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Point at a different Bot API server (self-hosted or test double).
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: &str) -> Result<(), SinkError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: message,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::Http(e.without_url().to_string()))?;

        let status = resp.status();
        let parsed: Option<ApiResponse> = resp.json().await.ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(SinkError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| status.to_string()),
            }),
            None => Err(SinkError::Rejected {
                status: status.as_u16(),
                description: format!("unreadable response ({status})"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// Local Bot API double: accepts chat "42", rejects anything else.
    async fn spawn_api(seen: Seen) -> String {
        let app = Router::new().route(
            "/:bot/sendMessage",
            post(move |Path(bot): Path<String>, Json(body): Json<Value>| {
                let seen = Arc::clone(&seen);
                async move {
                    let ok = body["chat_id"] == "42";
                    seen.lock().unwrap().push((bot, body));
                    if ok {
                        (StatusCode::OK, Json(json!({ "ok": true, "result": {} })))
                    } else {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "ok": false, "description": "Bad Request: chat not found" })),
                        )
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_html_message() {
        let seen: Seen = Arc::default();
        let base = spawn_api(Arc::clone(&seen)).await;
        let sink = TelegramSink::new("123:abc", "42").unwrap().with_api_base(base);

        sink.send("💰 <b>1.0 USDC</b>").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (bot, body) = &seen[0];
        assert_eq!(bot, "bot123:abc");
        assert_eq!(body["text"], "💰 <b>1.0 USDC</b>");
        assert_eq!(body["parse_mode"], "HTML");
        assert_eq!(body["disable_web_page_preview"], true);
    }

    #[tokio::test]
    async fn api_rejection_is_an_error() {
        let base = spawn_api(Arc::default()).await;
        let sink = TelegramSink::new("123:abc", "7").unwrap().with_api_base(base);

        match sink.send("hi").await {
            Err(SinkError::Rejected { status, description }) => {
                assert_eq!(status, 400);
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_hides_token() {
        let addr = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let sink = TelegramSink::new("secret-token", "42")
            .unwrap()
            .with_api_base(format!("http://{addr}"));

        match sink.send("hi").await {
            Err(SinkError::Http(msg)) => assert!(!msg.contains("secret-token")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn debug_omits_token() {
        let sink = TelegramSink::new("secret-token", "42").unwrap();
        assert!(!format!("{sink:?}").contains("secret-token"));
    }
}
