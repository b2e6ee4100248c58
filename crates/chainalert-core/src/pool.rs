//! Pool registry: the validated list of watched contract addresses.

use crate::error::ConfigError;
use serde::Deserialize;
use tracing::warn;

/// Decimals assumed when a pool entry omits them (USDC / USDT scale).
pub const DEFAULT_DECIMALS: u8 = 6;

/// Largest scale whose power of ten still fits in 256 bits.
pub const MAX_DECIMALS: u8 = 77;

/// A single watched pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Lowercase, 0x-prefixed 20-byte address
    pub address: String,
    /// Display name used in alerts
    pub name: String,
    /// Power-of-ten scale for amount formatting
    pub decimals: u8,
}

impl PoolConfig {
    /// Build a validated pool. The address is trimmed and lowercased.
    pub fn new(address: &str, name: &str, decimals: u8) -> Result<Self, ConfigError> {
        let address = normalize_address(address)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if decimals > MAX_DECIMALS {
            return Err(ConfigError::DecimalsOutOfRange {
                decimals: decimals.into(),
                max: MAX_DECIMALS,
            });
        }
        Ok(Self {
            address,
            name: name.to_string(),
            decimals,
        })
    }
}

#[derive(Deserialize)]
struct PoolEntry {
    address: String,
    name: String,
    #[serde(default = "default_decimals")]
    decimals: u64,
}

fn default_decimals() -> u64 {
    DEFAULT_DECIMALS as u64
}

/// Ordered, immutable set of watched pools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolRegistry {
    pools: Vec<PoolConfig>,
}

impl PoolRegistry {
    pub fn new(pools: Vec<PoolConfig>) -> Self {
        Self { pools }
    }

    /// Parse a JSON array of `{address, name, decimals}` entries.
    ///
    /// The document shape must be valid; individual bad entries are skipped
    /// with a warning, as are repeated addresses (the first entry wins).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let entries = value.as_array().ok_or(ConfigError::NotAnArray)?;

        let mut pools: Vec<PoolConfig> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match parse_entry(index, entry) {
                Ok(pool) => {
                    if pools.iter().any(|p| p.address == pool.address) {
                        warn!(address = %pool.address, "duplicate pool address, keeping first entry");
                        continue;
                    }
                    pools.push(pool);
                }
                Err(e) => warn!(error = %e, "skipping pool entry"),
            }
        }
        Ok(Self { pools })
    }

    /// Like `from_json`, but a malformed document yields an empty registry.
    pub fn from_json_lenient(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            warn!(error = %e, "pool list unusable, watching nothing");
            Self::default()
        })
    }

    pub fn get(&self, index: usize) -> Option<&PoolConfig> {
        self.pools.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolConfig> {
        self.pools.iter()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

fn parse_entry(index: usize, entry: &serde_json::Value) -> Result<PoolConfig, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidPool { index, reason };

    let raw: PoolEntry = serde_json::from_value(entry.clone()).map_err(|e| invalid(e.to_string()))?;
    let decimals = u8::try_from(raw.decimals).map_err(|_| {
        invalid(
            ConfigError::DecimalsOutOfRange {
                decimals: raw.decimals,
                max: MAX_DECIMALS,
            }
            .to_string(),
        )
    })?;
    PoolConfig::new(&raw.address, &raw.name, decimals).map_err(|e| invalid(e.to_string()))
}

fn normalize_address(address: &str) -> Result<String, ConfigError> {
    let lower = address.trim().to_lowercase();
    let hex = lower.strip_prefix("0x").unwrap_or(&lower);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidAddress {
            address: address.trim().to_string(),
        });
    }
    Ok(format!("0x{hex}"))
}
