//! Event descriptor resolution.
//!
//! The watched event's shape comes from one of two places:
//! - a structured description: a JSON ABI array (or a single ABI entry), from
//!   which the first `"type": "event"` entry is taken
//! - a flat signature such as
//!   `Deposit(address indexed sender, address indexed owner, uint256 assets, uint256 shares)`
//!
//! The structured description wins when both are given. Anything unusable
//! resolves to `None`, which turns decoding off for every pool.

use alloy_core::dyn_abi::DynSolType;
use alloy_dyn_abi::Specifier;
use alloy_json_abi::Event;
use chainalert_core::{
    error::{DecodeError, DescriptorError},
    event::{DecodedLog, RawLog},
};
use serde_json::Value;
use tracing::{info, warn};

use crate::{decoder, fingerprint};

/// One declared event parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Declared name, or `arg{i}` when the declaration has none
    pub name: String,
    /// Canonical type tag, e.g. "uint256" or "(address,uint256)"
    pub type_tag: String,
    pub ty: DynSolType,
    /// Indexed parameters live in topics[1..]
    pub indexed: bool,
}

/// A resolved, decodable event shape.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    name: String,
    signature: String,
    topic_id: String,
    params: Vec<ParamSpec>,
}

/// Fill the keys solc always emits but hand-written ABI snippets often
/// omit, so `alloy_json_abi::Event` deserialization accepts them.
fn fill_abi_defaults(entry: &mut Value) {
    if let Some(obj) = entry.as_object_mut() {
        obj.entry("anonymous").or_insert(Value::Bool(false));
        obj.entry("inputs").or_insert_with(|| Value::Array(Vec::new()));
        if let Some(Value::Array(inputs)) = obj.get_mut("inputs") {
            for input in inputs {
                if let Some(input) = input.as_object_mut() {
                    input.entry("indexed").or_insert(Value::Bool(false));
                }
                fill_param_names(input);
            }
        }
    }
}

fn fill_param_names(param: &mut Value) {
    if let Some(obj) = param.as_object_mut() {
        obj.entry("name").or_insert_with(|| Value::String(String::new()));
        if let Some(Value::Array(components)) = obj.get_mut("components") {
            components.iter_mut().for_each(fill_param_names);
        }
    }
}

impl EventDescriptor {
    /// Resolve the optional event description sources.
    ///
    /// Never fails: an unusable description is logged as a warning and
    /// yields `None`.
    pub fn resolve(abi_json: Option<&str>, signature: Option<&str>) -> Option<Self> {
        let abi_json = abi_json.map(str::trim).filter(|s| !s.is_empty());
        let signature = signature.map(str::trim).filter(|s| !s.is_empty());

        let result = match (abi_json, signature) {
            (Some(json), _) => Self::from_abi_json(json),
            (None, Some(sig)) => Self::from_signature(sig),
            (None, None) => {
                info!("no event description configured, sending generic alerts");
                return None;
            }
        };

        match result {
            Ok(descriptor) => {
                info!(
                    signature = %descriptor.signature,
                    topic = %descriptor.topic_id,
                    "event descriptor resolved"
                );
                Some(descriptor)
            }
            Err(e) => {
                warn!(error = %e, "event description unusable, decoding disabled");
                None
            }
        }
    }

    /// Build from a JSON ABI array or a single ABI entry.
    pub fn from_abi_json(json: &str) -> Result<Self, DescriptorError> {
        let value: Value = serde_json::from_str(json)?;
        let entries = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut entry = entries
            .into_iter()
            .find(|e| e.get("type").and_then(|t| t.as_str()) == Some("event"))
            .ok_or(DescriptorError::NoEvent)?;
        fill_abi_defaults(&mut entry);
        let event: Event = serde_json::from_value(entry)?;

        Self::from_event(event)
    }

    /// Build from a flat signature; the `event` keyword is optional.
    pub fn from_signature(signature: &str) -> Result<Self, DescriptorError> {
        let sig = signature.trim();
        let source = if sig.starts_with("event ") {
            sig.to_string()
        } else {
            format!("event {sig}")
        };

        let invalid = |reason: String| DescriptorError::InvalidSignature {
            signature: sig.to_string(),
            reason,
        };

        let event = Event::parse(&source).map_err(|e| invalid(e.to_string()))?;
        Self::from_event(event)
    }

    fn from_event(event: Event) -> Result<Self, DescriptorError> {
        if event.anonymous {
            return Err(DescriptorError::Anonymous { name: event.name });
        }

        let params = event
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let ty: DynSolType = input.resolve().map_err(|e| DescriptorError::UnsupportedType {
                    ty: input.ty.clone(),
                    reason: e.to_string(),
                })?;
                Ok(param_spec(i, &input.name, ty, input.indexed))
            })
            .collect::<Result<Vec<_>, DescriptorError>>()?;

        Self::from_parts(event.name, params)
    }

    fn from_parts(name: String, params: Vec<ParamSpec>) -> Result<Self, DescriptorError> {
        let name = name.trim().to_string();
        let valid_ident = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid_ident {
            return Err(DescriptorError::InvalidSignature {
                signature: name,
                reason: "event name is not an identifier".into(),
            });
        }

        let types: Vec<&str> = params.iter().map(|p| p.type_tag.as_str()).collect();
        let signature = format!("{}({})", name, types.join(","));
        let topic_id = fingerprint::keccak256_signature(&signature);

        Ok(Self {
            name,
            signature,
            topic_id,
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical signature, `Name(type1,type2,...)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// keccak256 of the canonical signature, lowercase 0x-prefixed hex.
    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Ordered parameter type tags.
    pub fn field_types(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.type_tag.as_str()).collect()
    }

    /// Number of parameters carried in topics[1..].
    pub fn indexed_count(&self) -> usize {
        self.params.iter().filter(|p| p.indexed).count()
    }

    /// Decode a log's topics and data against this shape.
    pub fn decode(&self, raw: &RawLog) -> Result<DecodedLog, DecodeError> {
        decoder::decode_log(self, raw)
    }
}

fn param_spec(index: usize, name: &str, ty: DynSolType, indexed: bool) -> ParamSpec {
    let name = if name.trim().is_empty() {
        format!("arg{index}")
    } else {
        name.trim().to_string()
    };
    ParamSpec {
        name,
        type_tag: ty.sol_type_name().into_owned(),
        ty,
        indexed,
    }
}
