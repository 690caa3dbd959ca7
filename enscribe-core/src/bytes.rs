//! Byte and numeric coercion.
//!
//! Hex strings are `0x`-prefixed and must be *same-case*: all hex letters
//! uppercase or all lowercase. Mixed case carries EIP-55 checksum meaning and is
//! only accepted by the coin codecs, never here.

use num_bigint::BigUint;
use serde_json::Value;

use crate::constants::WORD_SIZE;
use crate::error::{EnscribeError, Result};

/// Returns true if `s` is `0x` followed by hex digits of a single letter case.
pub fn is_samecase_phex(s: &str) -> bool {
    let Some(digits) = s.strip_prefix("0x") else {
        return false;
    };
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    let upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    let lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    !(upper && lower)
}

/// Decodes a same-case `0x` hex string.
pub fn bytes_from_phex(s: &str) -> Result<Vec<u8>> {
    if !is_samecase_phex(s) {
        return Err(EnscribeError::Format(format!(
            "expected same-case 0x-hex: {s}"
        )));
    }
    Ok(hex::decode(&s[2..])?)
}

/// Encodes bytes as `0x` + lowercase hex.
pub fn phex_from_bytes(v: &[u8]) -> String {
    format!("0x{}", hex::encode(v))
}

/// Renders bytes as the shortest `0x` hex of the same integer (`0x0` for zero).
pub fn short_phex(v: &[u8]) -> String {
    let digits = hex::encode(v);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".into()
    } else {
        format!("0x{trimmed}")
    }
}

/// Coerces a JSON value into bytes.
///
/// Accepts a same-case `0x` hex string or an array of byte values.
pub fn bytes_from_value(x: &Value) -> Result<Vec<u8>> {
    match x {
        Value::String(s) => bytes_from_phex(s),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| EnscribeError::Format(format!("expected byte value: {item}")))
            })
            .collect(),
        other => Err(EnscribeError::Format(format!("expected bytes-like: {other}"))),
    }
}

/// Left-pads an unsigned integer into one 32-byte big-endian word.
pub fn bytes32_from_uint(n: &BigUint) -> Result<[u8; 32]> {
    let be = n.to_bytes_be();
    if be.len() > WORD_SIZE {
        return Err(EnscribeError::Format(format!("integer exceeds 256 bits: {n}")));
    }
    let mut word = [0u8; 32];
    // to_bytes_be() of zero is [0]
    word[WORD_SIZE - be.len()..].copy_from_slice(&be);
    Ok(word)
}

/// Coerces a JSON value into exactly 32 bytes.
///
/// Byte arrays must already be 32 long. Numbers, decimal strings and `0x` hex
/// strings are treated as unsigned integers and padded to one word.
pub fn bytes32_from_value(x: &Value) -> Result<[u8; 32]> {
    match x {
        Value::Array(_) => {
            let v = bytes_from_value(x)?;
            v.as_slice().try_into().map_err(|_| EnscribeError::InvalidLength {
                expected: WORD_SIZE,
                actual: v.len(),
            })
        }
        Value::Number(n) => {
            let n = n
                .as_u64()
                .ok_or_else(|| EnscribeError::Format(format!("expected unsigned integer: {n}")))?;
            bytes32_from_uint(&BigUint::from(n))
        }
        Value::String(s) => bytes32_from_uint(&parse_uint(s)?),
        other => Err(EnscribeError::Format(format!("expected 32-byte value: {other}"))),
    }
}

/// Parses a decimal or `0x` hex unsigned integer.
pub fn parse_uint(s: &str) -> Result<BigUint> {
    let parsed = match s.strip_prefix("0x") {
        Some("") => None,
        Some(digits) => BigUint::parse_bytes(digits.as_bytes(), 16),
        None => BigUint::parse_bytes(s.as_bytes(), 10),
    };
    parsed.ok_or_else(|| EnscribeError::Format(format!("expected unsigned integer: {s}")))
}

/// Reads a 32-byte big-endian unsigned integer at `offset`.
pub fn big_uint_at(v: &[u8], offset: usize) -> Result<BigUint> {
    let no_word = || EnscribeError::Format(format!("no word at offset {offset}"));
    let end = offset.checked_add(WORD_SIZE).ok_or_else(no_word)?;
    let word = v.get(offset..end).ok_or_else(no_word)?;
    Ok(BigUint::from_bytes_be(word))
}

/// Reads a 32-byte word at `offset` as a `usize`, failing if it does not fit.
pub fn usize_at(v: &[u8], offset: usize) -> Result<usize> {
    let n = big_uint_at(v, offset)?;
    usize::try_from(&n).map_err(|_| EnscribeError::Format(format!("word too large: {n}")))
}

/// Decodes UTF-8 bytes.
pub fn utf8_from_bytes(v: &[u8]) -> Result<String> {
    String::from_utf8(v.to_vec()).map_err(|e| EnscribeError::Format(e.to_string()))
}
