//! Log decoding against an `EventDescriptor`.
//!
//! Decoding is strict: a log whose topic count does not match the
//! descriptor's indexed parameters, or whose data does not decode as the
//! non-indexed tuple, is rejected as a whole.

use alloy_core::dyn_abi::DynSolType;
use chainalert_core::{
    error::DecodeError,
    event::{DecodedLog, RawLog},
    types::NormalizedValue,
};

use crate::descriptor::EventDescriptor;
use crate::{fingerprint, normalizer};

/// Decode a raw log into its declared fields, in declaration order.
pub fn decode_log(descriptor: &EventDescriptor, raw: &RawLog) -> Result<DecodedLog, DecodeError> {
    let topic0 = raw.event_signature().ok_or(DecodeError::TopicCount {
        expected: descriptor.indexed_count() + 1,
        got: 0,
    })?;
    if !topic0.eq_ignore_ascii_case(descriptor.topic_id()) {
        return Err(DecodeError::TopicMismatch {
            expected: descriptor.topic_id().to_string(),
            got: topic0.to_string(),
        });
    }

    let expected_topics = descriptor.indexed_count() + 1;
    if raw.topics.len() > expected_topics {
        return Err(DecodeError::TopicCount {
            expected: expected_topics,
            got: raw.topics.len(),
        });
    }

    // Indexed fields → topics[1..], in declaration order
    let mut indexed_values = Vec::with_capacity(descriptor.indexed_count());
    for (i, param) in descriptor.params().iter().filter(|p| p.indexed).enumerate() {
        let topic = raw.topics.get(i + 1).ok_or_else(|| DecodeError::MissingField {
            field: param.name.clone(),
            topics: raw.topics.len(),
        })?;
        indexed_values.push(decode_topic(topic, &param.ty)?);
    }

    // Non-indexed fields → data payload
    let data_types: Vec<DynSolType> = descriptor
        .params()
        .iter()
        .filter(|p| !p.indexed)
        .map(|p| p.ty.clone())
        .collect();
    let data_values = decode_data(&raw.data, data_types)?;

    let mut indexed_iter = indexed_values.into_iter();
    let mut data_iter = data_values.into_iter();
    let mut fields = Vec::with_capacity(descriptor.params().len());
    for param in descriptor.params() {
        let next = if param.indexed {
            indexed_iter.next()
        } else {
            data_iter.next()
        };
        let value = next.ok_or_else(|| DecodeError::AbiDecodeFailed {
            reason: format!("no value decoded for '{}'", param.name),
        })?;
        fields.push((param.name.clone(), value));
    }

    Ok(DecodedLog {
        event: descriptor.name().to_string(),
        fields,
    })
}

/// Decode the log data (non-indexed params) as an ABI-encoded parameter list.
fn decode_data(raw_data: &[u8], types: Vec<DynSolType>) -> Result<Vec<NormalizedValue>, DecodeError> {
    if types.is_empty() {
        return Ok(Vec::new());
    }
    let expected = types.len();

    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(raw_data)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: e.to_string(),
        })?;

    let values = match decoded {
        alloy_core::dyn_abi::DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };
    if values.len() != expected {
        return Err(DecodeError::AbiDecodeFailed {
            reason: format!("expected {expected} data values, got {}", values.len()),
        });
    }
    Ok(values.into_iter().map(normalizer::normalize).collect())
}

/// Decode a single indexed topic (always 32 bytes, ABI-encoded).
///
/// Reference types (string, bytes, arrays, tuples) are stored as the
/// keccak256 of their encoding and cannot be recovered; the raw 32-byte
/// hash is returned as `Bytes`.
fn decode_topic(topic_hex: &str, ty: &DynSolType) -> Result<NormalizedValue, DecodeError> {
    if !fingerprint::is_topic_hex(topic_hex) {
        return Err(DecodeError::InvalidTopic {
            reason: format!("'{topic_hex}' is not a 32-byte hex word"),
        });
    }
    let hex = topic_hex.strip_prefix("0x").unwrap_or(topic_hex);
    let bytes = hex::decode(hex).map_err(|e| DecodeError::InvalidTopic {
        reason: e.to_string(),
    })?;

    match ty {
        DynSolType::String
        | DynSolType::Bytes
        | DynSolType::Array(_)
        | DynSolType::FixedArray(..)
        | DynSolType::Tuple(_) => return Ok(NormalizedValue::Bytes(bytes)),
        _ => {}
    }

    ty.abi_decode(&bytes)
        .map(normalizer::normalize)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: format!("topic decode: {e}"),
        })
}
