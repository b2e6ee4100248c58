//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or an environment variable; a `.env`
//! file in the working directory is loaded first by `main`.

use anyhow::{bail, Result};
use chainalert_core::{alert::ExplorerLinks, pool::PoolRegistry, sink::AlertSink};
use chainalert_evm::EventDescriptor;
use chainalert_notify::{LogSink, TelegramSink};
use chainalert_observability::LogConfig;
use chainalert_stream::RelayContext;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "chainalert",
    about = "Watch EVM pools for deposits and relay alerts to Telegram",
    long_about = "
ChainAlert: subscribes to deposit events on a set of pool contracts over a
WebSocket RPC endpoint and posts a formatted alert for each one.

Without TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID alerts are only logged.
",
    version
)]
pub struct Cli {
    /// WebSocket RPC endpoint, e.g. wss://eth-mainnet.example/ws
    #[arg(long, env = "WS_RPC_URL")]
    pub ws_url: String,

    /// JSON array of pools: [{"address": "0x..", "name": "..", "decimals": 6}]
    #[arg(long, env = "POOLS", default_value = "[]")]
    pub pools: String,

    /// JSON ABI (array or single event entry) of the deposit event
    #[arg(long, env = "EVENT_ABI")]
    pub event_abi: Option<String>,

    /// Flat event signature, used when no ABI is given
    #[arg(long, env = "EVENT_SIGNATURE")]
    pub event_signature: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    /// Telegram chat id (numeric id, negative for groups and channels, or @channel)
    #[arg(long, env = "TELEGRAM_CHAT_ID", allow_hyphen_values = true)]
    pub telegram_chat_id: Option<String>,

    /// Block explorer base URL; derived from the RPC host when omitted
    #[arg(long, env = "EXPLORER_URL")]
    pub explorer_url: Option<String>,

    /// Port of the liveness endpoint
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Log level or EnvFilter directives
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Per-component level overrides, e.g. chainalert_stream=debug
    #[arg(long = "log-component", env = "LOG_COMPONENTS", value_delimiter = ',')]
    pub log_components: Vec<String>,

    /// Emit JSON logs
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

/// Blank values (common in `.env` templates) count as unset.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if self.ws_url.trim().is_empty() {
            bail!("WS_RPC_URL must not be empty");
        }
        Ok(())
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            json: self.log_json,
            ..LogConfig::default()
        }
        .with_components(self.log_components.iter().map(String::as_str))
    }

    pub fn explorer(&self) -> ExplorerLinks {
        match non_empty(&self.explorer_url) {
            Some(base) => ExplorerLinks::new(base),
            None => ExplorerLinks::for_endpoint(self.ws_url.trim()),
        }
    }

    /// Telegram when both credentials are present, otherwise a dry-run sink.
    pub fn sink(&self) -> Result<Arc<dyn AlertSink>> {
        match (
            non_empty(&self.telegram_bot_token),
            non_empty(&self.telegram_chat_id),
        ) {
            (Some(token), Some(chat_id)) => Ok(Arc::new(TelegramSink::new(token, chat_id)?)),
            (token, chat_id) => {
                if token.is_some() || chat_id.is_some() {
                    warn!("only one of TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID is set");
                }
                warn!("Telegram not configured, alerts will only be logged");
                Ok(Arc::new(LogSink::new()))
            }
        }
    }

    /// Resolve everything the relay needs. Bad pool lists and event
    /// descriptions degrade with a warning instead of failing.
    pub fn relay_context(&self) -> Result<RelayContext> {
        let pools = PoolRegistry::from_json_lenient(&self.pools);
        let descriptor = EventDescriptor::resolve(
            non_empty(&self.event_abi),
            non_empty(&self.event_signature),
        );
        let explorer = self.explorer();
        let sink = self.sink()?;

        info!(
            pools = pools.len(),
            decoding = descriptor.is_some(),
            explorer = %explorer.base(),
            sink = sink.name(),
            "configuration loaded"
        );

        Ok(RelayContext::new(pools, descriptor, explorer, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WS: &str = "wss://eth-mainnet.example.org/ws";
    const POOL_A: &str = "0x1111111111111111111111111111111111111111";
    const DEPOSIT: &str = "Deposit(address indexed sender, address indexed owner, uint256 assets, uint256 shares)";

    fn parse(extra: &[&str]) -> Cli {
        let mut args = vec!["chainalert", "--ws-url", WS];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--pools", "[]", "--port", "3000", "--log-level", "info"]);
        assert_eq!(cli.port, 3000);
        assert_eq!(cli.log_config().level, "info");
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn missing_ws_url_is_rejected() {
        let cli = Cli {
            ws_url: "  ".into(),
            ..parse(&[])
        };
        assert!(cli.validate().is_err());
    }

    #[test]
    fn dry_run_without_both_credentials() {
        let cli = parse(&["--telegram-bot-token", "123:abc", "--telegram-chat-id", " "]);
        assert_eq!(cli.sink().unwrap().name(), "log");
    }

    #[test]
    fn telegram_with_both_credentials() {
        let cli = parse(&["--telegram-bot-token", "123:abc", "--telegram-chat-id", "-100"]);
        assert_eq!(cli.sink().unwrap().name(), "telegram");
    }

    #[test]
    fn negative_group_chat_id_is_a_value() {
        let cli = parse(&["--telegram-chat-id", "-1001234567890", "--port", "8080"]);
        assert_eq!(cli.telegram_chat_id.as_deref(), Some("-1001234567890"));
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn component_levels_reach_the_log_config() {
        let cli = parse(&[
            "--log-level",
            "warn",
            "--log-component",
            "chainalert_stream=debug,reqwest=error",
        ]);
        let config = cli.log_config();
        assert_eq!(
            config.directives(),
            "warn,chainalert_stream=debug,reqwest=error"
        );
    }

    #[test]
    fn explorer_override_and_derivation() {
        let cli = parse(&["--explorer-url", "https://basescan.org/"]);
        assert_eq!(cli.explorer().base(), "https://basescan.org");

        let cli = Cli {
            ws_url: "wss://eth-sepolia.example.org/ws".into(),
            explorer_url: None,
            ..parse(&[])
        };
        assert_eq!(cli.explorer().base(), "https://sepolia.etherscan.io");
    }

    #[test]
    fn relay_context_from_pools_and_signature() {
        let pools = format!(r#"[{{"address":"{POOL_A}","name":"USDT Vault","decimals":6}}]"#);
        let cli = parse(&["--pools", &pools, "--event-signature", DEPOSIT]);
        let ctx = cli.relay_context().unwrap();

        let filters = ctx.filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].address, POOL_A);
        assert!(filters[0].topic0.is_some());
    }

    #[test]
    fn bad_inputs_degrade_instead_of_failing() {
        let cli = parse(&["--pools", "{not json", "--event-signature", "Deposit(uint999 x)"]);
        let ctx = cli.relay_context().unwrap();
        assert!(ctx.pools.is_empty());
        assert!(ctx.descriptor.is_none());
        assert!(ctx.filters().is_empty());
    }

    #[test]
    fn blank_abi_falls_through_to_signature() {
        let cli = parse(&["--event-abi", "", "--event-signature", DEPOSIT]);
        let ctx = cli.relay_context().unwrap();
        let descriptor = ctx.descriptor.as_ref().unwrap();
        assert_eq!(descriptor.name(), "Deposit");
    }
}
