//! Resolver public keys.

use std::fmt;

use serde_json::{json, Value};

use enscribe_coin::to_checksum_address;
use enscribe_core::bytes::{bytes32_from_value, bytes_from_phex, bytes_from_value, phex_from_bytes, short_phex};
use enscribe_core::constants::{ETH_ADDRESS_SIZE, PUBKEY_SIZE, WORD_SIZE};
use enscribe_core::error::{EnscribeError, Result};
use enscribe_crypto::keccak256;

/// A 64-byte `x || y` public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey([u8; PUBKEY_SIZE]);

impl Default for Pubkey {
    fn default() -> Self {
        Pubkey([0u8; PUBKEY_SIZE])
    }
}

impl Pubkey {
    /// Wraps exactly 64 bytes.
    pub fn from_bytes(v: &[u8]) -> Result<Pubkey> {
        let bytes: [u8; PUBKEY_SIZE] = v.try_into().map_err(|_| {
            EnscribeError::InvalidPubkey(format!("expected {PUBKEY_SIZE} bytes, got {}", v.len()))
        })?;
        Ok(Pubkey(bytes))
    }

    /// Builds a key from coordinates given as 32 bytes, hex, or integers.
    pub fn from_xy(x: &Value, y: &Value) -> Result<Pubkey> {
        let coord = |name: &str, v: &Value| {
            bytes32_from_value(v).map_err(|e| EnscribeError::InvalidPubkey(format!("{name}: {e}")))
        };
        let mut bytes = [0u8; PUBKEY_SIZE];
        bytes[..WORD_SIZE].copy_from_slice(&coord("x", x)?);
        bytes[WORD_SIZE..].copy_from_slice(&coord("y", y)?);
        Ok(Pubkey(bytes))
    }

    /// Builds a key from JSON.
    ///
    /// Falsy values give the zero key; a same-case hex string or byte array
    /// must be 64 bytes; an object supplies `x` and `y`.
    pub fn from_value(value: &Value) -> Result<Pubkey> {
        match value {
            Value::Null | Value::Bool(false) => Ok(Pubkey::default()),
            Value::String(s) if s.is_empty() => Ok(Pubkey::default()),
            Value::String(s) => {
                let v = bytes_from_phex(s).map_err(|e| EnscribeError::InvalidPubkey(e.to_string()))?;
                Self::from_bytes(&v)
            }
            Value::Array(_) => {
                let v = bytes_from_value(value).map_err(|e| EnscribeError::InvalidPubkey(e.to_string()))?;
                Self::from_bytes(&v)
            }
            Value::Object(obj) => {
                let null = Value::Null;
                Self::from_xy(obj.get("x").unwrap_or(&null), obj.get("y").unwrap_or(&null))
            }
            other => Err(EnscribeError::InvalidPubkey(format!("unknown format: {other}"))),
        }
    }

    /// The 64 raw bytes.
    pub fn bytes(&self) -> &[u8; PUBKEY_SIZE] {
        &self.0
    }

    /// The x coordinate.
    pub fn x(&self) -> &[u8] {
        &self.0[..WORD_SIZE]
    }

    /// The y coordinate.
    pub fn y(&self) -> &[u8] {
        &self.0[WORD_SIZE..]
    }

    /// True if every byte is zero.
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The EVM address of this key: last 20 bytes of its keccak-256, checksummed.
    pub fn address(&self) -> String {
        let hash = keccak256(&self.0);
        // 20 bytes always formats
        to_checksum_address(&hash[hash.len() - ETH_ADDRESS_SIZE..]).unwrap_or_default()
    }

    /// All 64 bytes as `0x` hex.
    pub fn to_phex(&self) -> String {
        phex_from_bytes(&self.0)
    }

    /// `{x, y, address}` with full-width coordinates.
    pub fn to_object(&self) -> Value {
        json!({
            "x": phex_from_bytes(self.x()),
            "y": phex_from_bytes(self.y()),
            "address": self.address(),
        })
    }

    /// `{x, y}` with leading zero nibbles stripped.
    pub fn to_json(&self) -> Value {
        json!({
            "x": short_phex(self.x()),
            "y": short_phex(self.y()),
        })
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_phex())
    }
}
