//! Minimal ABI encoding for resolver calls.
//!
//! Calls are `selector || head || tail`. Static arguments sit in the head;
//! dynamic arguments put a pointer in the head (relative to the first byte
//! after the selector) and `length || data` padded to a word in the tail.

use num_bigint::BigUint;

use enscribe_core::bytes::{bytes32_from_uint, usize_at};
use enscribe_core::constants::{SELECTOR_SIZE, WORD_SIZE};
use enscribe_core::error::{EnscribeError, Result};

/// One call argument.
#[derive(Clone, Copy, Debug)]
pub enum AbiArg<'a> {
    /// A 32-byte word (`uint256`, `bytes32`, ...).
    Word([u8; 32]),
    /// Dynamic `bytes`.
    Bytes(&'a [u8]),
    /// Dynamic `string`, encoded as UTF-8 bytes.
    Str(&'a str),
    /// Word-aligned bytes copied into the head verbatim.
    Raw(&'a [u8]),
}

impl AbiArg<'_> {
    /// A word holding an unsigned integer.
    pub fn uint(n: &BigUint) -> Result<AbiArg<'static>> {
        Ok(AbiArg::Word(bytes32_from_uint(n)?))
    }

    fn dynamic(&self) -> Option<&[u8]> {
        match self {
            AbiArg::Bytes(v) => Some(v),
            AbiArg::Str(s) => Some(s.as_bytes()),
            AbiArg::Word(_) | AbiArg::Raw(_) => None,
        }
    }

    fn head_len(&self) -> usize {
        match self {
            AbiArg::Raw(v) => v.len(),
            _ => WORD_SIZE,
        }
    }
}

fn padded_len(n: usize) -> usize {
    n.div_ceil(WORD_SIZE) * WORD_SIZE
}

fn word_from_usize(n: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[WORD_SIZE - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

/// Encodes `selector(args...)`.
pub fn encode_call(selector: u32, args: &[AbiArg<'_>]) -> Result<Vec<u8>> {
    for arg in args {
        if let AbiArg::Raw(v) = arg {
            if v.len() % WORD_SIZE != 0 {
                return Err(EnscribeError::Format(format!(
                    "raw argument is not word-aligned: {} bytes",
                    v.len()
                )));
            }
        }
    }

    let head_len: usize = args.iter().map(AbiArg::head_len).sum();
    let tail_len: usize = args
        .iter()
        .filter_map(AbiArg::dynamic)
        .map(|v| WORD_SIZE + padded_len(v.len()))
        .sum();

    let mut head = Vec::with_capacity(SELECTOR_SIZE + head_len + tail_len);
    head.extend_from_slice(&selector.to_be_bytes());
    let mut tail = Vec::with_capacity(tail_len);
    for arg in args {
        if let Some(v) = arg.dynamic() {
            head.extend_from_slice(&word_from_usize(head_len + tail.len()));
            tail.extend_from_slice(&word_from_usize(v.len()));
            tail.extend_from_slice(v);
            tail.resize(tail.len() + padded_len(v.len()) - v.len(), 0);
            continue;
        }
        match arg {
            AbiArg::Word(word) => head.extend_from_slice(word),
            AbiArg::Raw(v) => head.extend_from_slice(v),
            AbiArg::Bytes(_) | AbiArg::Str(_) => {}
        }
    }
    head.extend_from_slice(&tail);
    Ok(head)
}

/// Reads a dynamic value: the word at `pos` is an offset into `v`, where a
/// length word is followed by that many bytes.
pub fn read_memory(v: &[u8], pos: usize) -> Result<&[u8]> {
    let call_err = |what: &str| EnscribeError::CallParse(format!("{what} out of bounds"));
    let offset = usize_at(v, pos).map_err(|_| call_err("offset"))?;
    let len = usize_at(v, offset).map_err(|_| call_err("length"))?;
    let start = offset
        .checked_add(WORD_SIZE)
        .ok_or_else(|| call_err("data"))?;
    let end = start.checked_add(len).ok_or_else(|| call_err("data"))?;
    v.get(start..end).ok_or_else(|| call_err("data"))
}

/// Splits a call into its selector and arguments.
pub fn split_call(call: &[u8]) -> Result<(u32, &[u8])> {
    if call.len() < SELECTOR_SIZE {
        return Err(EnscribeError::CallParse(format!(
            "call too short: {} bytes",
            call.len()
        )));
    }
    let (selector, args) = call.split_at(SELECTOR_SIZE);
    let selector = u32::from_be_bytes([selector[0], selector[1], selector[2], selector[3]]);
    Ok((selector, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_static_only() {
        let call = encode_call(0x1234_5678, &[AbiArg::Word([7u8; 32])]).unwrap();
        assert_eq!(call.len(), 36);
        assert_eq!(&call[..4], &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(&call[4..], &[7u8; 32]);
    }

    #[test]
    fn test_string_layout() {
        // text(bytes32,string) with key "avatar"
        let call = encode_call(0x59d1_d43c, &[AbiArg::Word([0u8; 32]), AbiArg::Str("avatar")]).unwrap();
        assert_eq!(call.len(), 4 + 32 * 4);
        assert_eq!(usize_at(&call[4..], 32).unwrap(), 64);
        assert_eq!(usize_at(&call[4..], 64).unwrap(), 6);
        assert_eq!(&call[4 + 96..4 + 102], b"avatar");
        assert!(call[4 + 102..].iter().all(|&b| b == 0));
        assert_eq!(read_memory(&call[4..], 32).unwrap(), b"avatar");
    }

    #[test]
    fn test_two_dynamic_args() {
        let call = encode_call(
            0x10f1_3a8c,
            &[AbiArg::Word([0u8; 32]), AbiArg::Str("k"), AbiArg::Str("value")],
        )
        .unwrap();
        let args = &call[4..];
        assert_eq!(read_memory(args, 32).unwrap(), b"k");
        assert_eq!(read_memory(args, 64).unwrap(), b"value");
        assert_eq!(usize_at(args, 64).unwrap(), 96 + 64);
    }

    #[test]
    fn test_empty_bytes() {
        let call = encode_call(1, &[AbiArg::Bytes(&[])]).unwrap();
        assert_eq!(call.len(), 4 + 64);
        assert_eq!(read_memory(&call[4..], 0).unwrap(), b"");
    }

    #[test]
    fn test_raw_alignment() {
        assert!(encode_call(1, &[AbiArg::Raw(&[0u8; 64])]).is_ok());
        assert!(encode_call(1, &[AbiArg::Raw(&[0u8; 33])]).is_err());
    }

    #[test]
    fn test_read_memory_bounds() {
        assert!(read_memory(&[], 0).is_err());
        let mut v = word_from_usize(32).to_vec();
        v.extend_from_slice(&word_from_usize(100));
        assert!(matches!(read_memory(&v, 0), Err(EnscribeError::CallParse(_))));
    }

    #[test]
    fn test_split_call() {
        assert_eq!(split_call(&[1, 2, 3, 4, 5]).unwrap(), (0x0102_0304, &[5u8][..]));
        assert!(split_call(&[1, 2]).is_err());
    }

    proptest! {
        #[test]
        fn test_bytes_tail_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..100)) {
            let call = encode_call(0, &[AbiArg::Word([1u8; 32]), AbiArg::Bytes(&data)]).unwrap();
            prop_assert_eq!(call.len() % 32, 4);
            prop_assert_eq!(read_memory(&call[4..], 32).unwrap(), data.as_slice());
        }
    }
}
