//! Event topic computation.
//!
//! The topic of an EVM event is the keccak256 hash of its canonical
//! signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef

use tiny_keccak::{Hasher, Keccak};

/// Compute the keccak256 topic of an event signature string.
/// Input: `"EventName(type1,type2,...)"`. Output: lowercase 0x-prefixed hex.
pub fn keccak256_signature(signature: &str) -> String {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(signature.as_bytes());
    hasher.finalize(&mut output);
    format!("0x{}", hex::encode(output))
}

/// Returns `true` if `topic` is a 0x-prefixed (or bare) 32-byte hex hash.
pub fn is_topic_hex(topic: &str) -> bool {
    let hex = topic.strip_prefix("0x").unwrap_or(topic);
    hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
}
