//! Common traits for enscribe.
//!
//! These traits are the seams to collaborators that live outside this
//! workspace's core logic: the per-coin address codecs and the label normalizer.

use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS CODEC
// ═══════════════════════════════════════════════════════════════════════════════

/// Converts between the human form of an address and its canonical bytes.
///
/// Implementations must satisfy `parse(format(bytes)) == bytes` for every
/// byte string they accept.
pub trait AddressCodec: Send + Sync {
    /// Decodes a human-readable address into canonical bytes.
    fn parse(&self, s: &str) -> Result<Vec<u8>>;

    /// Encodes canonical bytes into the human-readable address.
    fn format(&self, v: &[u8]) -> Result<String>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// LABEL NORMALIZER
// ═══════════════════════════════════════════════════════════════════════════════

/// Normalizes a single name label before it is hashed or stored.
pub trait LabelNormalizer: Send + Sync {
    /// Returns the normalized form of `label`, or fails if it is not valid.
    fn normalize(&self, label: &str) -> Result<String>;

    /// Returns a display form of an already-normalized name.
    fn beautify(&self, name: &str) -> String {
        name.to_string()
    }
}
