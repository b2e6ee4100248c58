//! Decoded value representation.
//!
//! Every decoded log field is normalized into a `NormalizedValue` so the
//! handler never touches ABI-specific representations.

/// A decoded, normalized value.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Uint(u128),
    /// Large uints (> u128) stored as decimal string
    BigUint(String),
    Int(i128),
    /// Large ints (> i128) stored as decimal string
    BigInt(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    /// EVM address, hex with 0x prefix (EIP-55 checksummed)
    Address(String),
    Array(Vec<NormalizedValue>),
    Tuple(Vec<(String, NormalizedValue)>),
}

impl NormalizedValue {
    /// Decimal digits of a non-negative integer scalar.
    /// `None` for negative integers and every non-integer variant.
    pub fn as_unsigned_decimal(&self) -> Option<String> {
        match self {
            NormalizedValue::Uint(v) => Some(v.to_string()),
            NormalizedValue::BigUint(v) => Some(v.clone()),
            NormalizedValue::Int(v) if *v >= 0 => Some(v.to_string()),
            NormalizedValue::BigInt(v) if !v.starts_with('-') => Some(v.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_decimal_rejects_negative() {
        assert_eq!(NormalizedValue::Int(-1).as_unsigned_decimal(), None);
        assert_eq!(NormalizedValue::BigInt("-1".into()).as_unsigned_decimal(), None);
        assert_eq!(
            NormalizedValue::Int(7).as_unsigned_decimal().as_deref(),
            Some("7")
        );
    }
}
