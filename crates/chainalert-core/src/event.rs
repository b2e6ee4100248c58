//! Raw and decoded log types, and the filter a pool subscribes with.

use crate::types::NormalizedValue;

/// A raw, undecoded log as delivered by the streaming transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// Contract address that emitted the log
    pub address: String,
    /// topics[0] is the event signature hash; additional topics are indexed params.
    pub topics: Vec<String>,
    /// ABI-encoded non-indexed parameters.
    pub data: Vec<u8>,
    /// Transaction hash (hex-encoded with 0x prefix)
    pub transaction_hash: String,
    /// Block number, when the transport reports it
    pub block_number: Option<u64>,
    /// Log index within the block, when the transport reports it
    pub log_index: Option<u64>,
}

impl RawLog {
    /// Returns topics[0] as the event signature hash, if present.
    pub fn event_signature(&self) -> Option<&str> {
        self.topics.first().map(|s| s.as_str())
    }
}

/// Address + topic filter registered for a single pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: String,
    /// Exact-match value for topics[0]; `None` leaves topics unset.
    pub topic0: Option<String>,
}

impl LogFilter {
    /// JSON-RPC `eth_subscribe("logs", ...)` filter object.
    pub fn to_rpc_params(&self) -> serde_json::Value {
        match &self.topic0 {
            Some(topic) => serde_json::json!({ "address": self.address, "topics": [topic] }),
            None => serde_json::json!({ "address": self.address }),
        }
    }
}

/// A raw log tagged with the index of the filter that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribedLog {
    pub filter: usize,
    pub log: RawLog,
}

/// A log decoded against an event descriptor.
/// Fields keep their declared order so positional lookups are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    /// Event name, e.g. "Deposit"
    pub event: String,
    /// Decoded field values in declaration order
    pub fields: Vec<(String, NormalizedValue)>,
}

impl DecodedLog {
    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&NormalizedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a field value by declaration position.
    pub fn field_at(&self, index: usize) -> Option<&NormalizedValue> {
        self.fields.get(index).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_with_topic() {
        let f = LogFilter {
            address: "0xabc".into(),
            topic0: Some("0xdead".into()),
        };
        assert_eq!(
            f.to_rpc_params(),
            serde_json::json!({ "address": "0xabc", "topics": ["0xdead"] })
        );
    }

    #[test]
    fn filter_without_topic_leaves_topics_unset() {
        let f = LogFilter {
            address: "0xabc".into(),
            topic0: None,
        };
        let params = f.to_rpc_params();
        assert!(params.get("topics").is_none());
    }

    #[test]
    fn decoded_log_lookup_by_name_and_position() {
        let log = DecodedLog {
            event: "Deposit".into(),
            fields: vec![
                ("sender".into(), NormalizedValue::Address("0x01".into())),
                ("assets".into(), NormalizedValue::Uint(5)),
            ],
        };
        assert_eq!(log.field("assets"), Some(&NormalizedValue::Uint(5)));
        assert_eq!(log.field_at(0), Some(&NormalizedValue::Address("0x01".into())));
        assert!(log.field("shares").is_none());
        assert!(log.field_at(9).is_none());
    }
}
