//! # chainalert-evm
//!
//! Resolves the watched event's shape and decodes EVM logs against it.
//!
//! ## Implementation notes
//! - Uses `alloy-core` for ABI decode
//! - Topics[0] → event signature topic (keccak256 of the canonical signature)
//! - Topics[1..] → indexed parameters (each 32 bytes, ABI-encoded)
//! - `data` → non-indexed parameters (ABI-encoded tuple)

pub mod amount;
pub mod decoder;
pub mod descriptor;
pub mod fingerprint;
pub mod normalizer;

pub use amount::{deposit_amount, format_units};
pub use decoder::decode_log;
pub use descriptor::{EventDescriptor, ParamSpec};
