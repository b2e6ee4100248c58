//! Converts alloy-core `DynSolValue` → ChainAlert `NormalizedValue`.

use alloy_core::dyn_abi::DynSolValue;
use chainalert_core::types::NormalizedValue;

/// Convert a decoded `DynSolValue` into a `NormalizedValue`.
pub fn normalize(val: DynSolValue) -> NormalizedValue {
    match val {
        DynSolValue::Bool(b) => NormalizedValue::Bool(b),

        DynSolValue::Int(i, _bits) => match i128::try_from(i) {
            Ok(v) => NormalizedValue::Int(v),
            Err(_) => NormalizedValue::BigInt(i.to_string()),
        },

        DynSolValue::Uint(u, _bits) => match u128::try_from(u) {
            Ok(v) => NormalizedValue::Uint(v),
            Err(_) => NormalizedValue::BigUint(u.to_string()),
        },

        DynSolValue::FixedBytes(word, size) => NormalizedValue::Bytes(word[..size].to_vec()),

        DynSolValue::Bytes(b) => NormalizedValue::Bytes(b),

        DynSolValue::String(s) => NormalizedValue::Str(s),

        // EIP-55 checksum encoding
        DynSolValue::Address(a) => NormalizedValue::Address(a.to_checksum(None)),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            NormalizedValue::Array(vals.into_iter().map(normalize).collect())
        }

        DynSolValue::Tuple(fields) => {
            // Unnamed tuple fields get positional names "0", "1", ...
            let named: Vec<(String, NormalizedValue)> = fields
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), normalize(v)))
                .collect();
            NormalizedValue::Tuple(named)
        }

        DynSolValue::Function(f) => NormalizedValue::Bytes(f.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    #[test]
    fn normalize_uint256_small() {
        let v = normalize(DynSolValue::Uint(U256::from(42u64), 256));
        assert_eq!(v, NormalizedValue::Uint(42));
    }

    #[test]
    fn normalize_uint256_large() {
        let v = normalize(DynSolValue::Uint(U256::MAX, 256));
        assert_eq!(v, NormalizedValue::BigUint(U256::MAX.to_string()));
    }

    #[test]
    fn normalize_address_checksummed() {
        let addr: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
        let v = normalize(DynSolValue::Address(addr));
        assert_eq!(
            v,
            NormalizedValue::Address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into())
        );
    }
}
