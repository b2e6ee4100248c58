//! Alert message rendering.
//!
//! Messages target a chat transport in HTML parse mode, so every
//! interpolated string is escaped.

use url::Url;

/// Mainnet block explorer.
pub const MAINNET_EXPLORER: &str = "https://etherscan.io";
/// Test-network block explorer.
pub const TESTNET_EXPLORER: &str = "https://sepolia.etherscan.io";

/// Host tokens that mark an endpoint as a test or staging network.
/// `test` also covers `testnet`.
const TESTNET_HOST_TOKENS: &[&str] = &["test", "staging", "sepolia", "goerli", "holesky"];

/// Which message shape was produced for a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Amount decoded and scaled
    Deposit,
    /// Decoding unavailable or failed
    Generic,
}

/// Builds transaction links into a block explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerLinks {
    base: String,
}

impl ExplorerLinks {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Pick the explorer from the transport endpoint's host.
    /// Unparsable endpoints fall back to the mainnet explorer.
    pub fn for_endpoint(endpoint: &str) -> Self {
        let host = Url::parse(endpoint)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();
        if TESTNET_HOST_TOKENS.iter().any(|t| host.contains(t)) {
            Self::new(TESTNET_EXPLORER)
        } else {
            Self::new(MAINNET_EXPLORER)
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `{base}/tx/{hash}`
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.base, tx_hash)
    }
}

/// Display symbol for a pool.
///
/// Presentation heuristic only: names containing "USDT" (any case) are
/// labelled USDT, everything else USDC.
pub fn classify_symbol(pool_name: &str) -> &'static str {
    if pool_name.to_uppercase().contains("USDT") {
        "USDT"
    } else {
        "USDC"
    }
}

/// Message for a decoded deposit.
pub fn deposit_message(amount: &str, symbol: &str, pool_name: &str, tx_url: &str, tx_hash: &str) -> String {
    format!(
        "💰 <b>{} {}</b> have just been deposited on <b>{}</b>: Check txn {}",
        escape_html(amount),
        escape_html(symbol),
        escape_html(pool_name),
        tx_anchor(tx_url, tx_hash),
    )
}

/// Message used when the log could not be decoded.
pub fn generic_message(pool_name: &str, tx_url: &str, tx_hash: &str) -> String {
    format!(
        "💰 New deposit on <b>{}</b>: Check txn {}",
        escape_html(pool_name),
        tx_anchor(tx_url, tx_hash),
    )
}

fn tx_anchor(tx_url: &str, tx_hash: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(tx_url),
        escape_html(tx_hash)
    )
}

/// Escape the characters the HTML parse mode treats as markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
