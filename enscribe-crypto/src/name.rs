//! ENS name hashing and DNS wire encoding.
//!
//! ```text
//! namehash("")      = 0^32
//! namehash(l . rest) = keccak256(namehash(rest) || keccak256(l))
//! ```
//!
//! Names are hashed exactly as given. Callers normalize labels first.

use enscribe_core::constants::{DNS_MAX_LABEL, HASH_SIZE};
use enscribe_core::error::{EnscribeError, Result};

use crate::hash::{keccak256, keccak256_multi};

/// Splits a dotted name into labels. The empty name has no labels.
pub fn namesplit(name: &str) -> Vec<&str> {
    if name.is_empty() {
        Vec::new()
    } else {
        name.split('.').collect()
    }
}

/// Hashes a single label.
pub fn labelhash(label: &str) -> [u8; 32] {
    keccak256(label.as_bytes())
}

/// Hashes a child label under an already hashed parent.
pub fn child_namehash(parent: &[u8; 32], labelhash: &[u8; 32]) -> [u8; 32] {
    keccak256_multi(&[parent.as_slice(), labelhash.as_slice()])
}

/// Computes the namehash of a dotted name.
pub fn namehash(name: &str) -> [u8; 32] {
    namehash_labels(&namesplit(name))
}

/// Computes the namehash of a label sequence, most specific label first.
pub fn namehash_labels<S: AsRef<str>>(labels: &[S]) -> [u8; 32] {
    labels
        .iter()
        .rev()
        .fold([0u8; HASH_SIZE], |node, label| {
            child_namehash(&node, &labelhash(label.as_ref()))
        })
}

/// Encodes a dotted name in DNS wire format: length-prefixed labels, then `0x00`.
pub fn dns_encode(name: &str) -> Result<Vec<u8>> {
    let labels = namesplit(name);
    let mut dns = Vec::with_capacity(name.len() + 2);
    for label in labels {
        let v = label.as_bytes();
        if v.is_empty() {
            return Err(EnscribeError::InvalidName {
                name: name.into(),
                reason: "empty label".into(),
            });
        }
        if v.len() > DNS_MAX_LABEL {
            return Err(EnscribeError::InvalidName {
                name: name.into(),
                reason: format!("label too long: {} bytes", v.len()),
            });
        }
        dns.push(v.len() as u8);
        dns.extend_from_slice(v);
    }
    dns.push(0);
    Ok(dns)
}
