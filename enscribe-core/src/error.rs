//! Error types for enscribe.
//!
//! This module provides a single error hierarchy using `thiserror`.
//! Wrapping variants keep the root cause as their `source`.

use thiserror::Error;

/// Result type alias using `EnscribeError`.
pub type Result<T> = std::result::Result<T, EnscribeError>;

/// Main error type for all enscribe operations.
#[derive(Debug, Error)]
pub enum EnscribeError {
    // ═══════════════════════════════════════════════════════════════════════════
    // COERCION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Malformed hex, byte or URL input.
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte count.
        expected: usize,
        /// Byte count received.
        actual: usize,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // COIN ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// No coin is registered under this name.
    #[error("Unknown coin: {0}")]
    UnknownCoin(String),

    /// The coin exists but has no codec for this operation.
    #[error("Unsupported coin {coin}: {reason}")]
    UnsupportedCoin {
        /// Coin name.
        coin: String,
        /// What the coin cannot do.
        reason: String,
    },

    /// Address bytes do not survive `parse(format(bytes))`.
    #[error("Roundtrip failed for {coin}: {bytes}")]
    Roundtrip {
        /// Coin name.
        coin: String,
        /// Offending bytes as phex.
        bytes: String,
    },

    /// Coin-specific codec rejected the input.
    #[error("Codec error: {0}")]
    Codec(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // ADDRESS / PUBKEY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Address could not be constructed for the coin.
    #[error("Invalid {coin} address '{value}': {source}")]
    InvalidAddress {
        /// Coin name.
        coin: String,
        /// Rejected address text or bytes.
        value: String,
        /// Codec failure.
        #[source]
        source: Box<EnscribeError>,
    },

    /// Public key has the wrong shape or length.
    #[error("Invalid pubkey: {0}")]
    InvalidPubkey(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTENT HASH ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Envelope codec is not one of the known protocols.
    #[error("Unknown contenthash codec: 0x{0:x}")]
    UnknownCodec(u64),

    /// Envelope is truncated or its varint is malformed.
    #[error("Malformed contenthash envelope: {0}")]
    MalformedEnvelope(String),

    /// Onion v3 checksum does not match its public key.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    Checksum {
        /// Checksum derived from the key.
        expected: String,
        /// Checksum carried by the input.
        actual: String,
    },

    /// Protocol-native hash could not be parsed.
    #[error("Invalid {protocol} hash '{hash}': {reason}")]
    InvalidHash {
        /// Protocol name.
        protocol: String,
        /// Rejected hash text.
        hash: String,
        /// Parser message.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // RECORD ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Key cannot be routed to any record field.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A record field failed to store.
    #[error("Storing \"{key}\": {source}")]
    Field {
        /// Record key.
        key: String,
        /// Value as JSON text.
        value: String,
        /// Failure while storing.
        #[source]
        source: Box<EnscribeError>,
    },

    /// Resolver call or answer could not be decoded.
    #[error("Call parse error: {0}")]
    CallParse(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // TREE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Label rejected by the normalizer or not a single label.
    #[error("Invalid label '{label}': {reason}")]
    InvalidLabel {
        /// Label as given.
        label: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Name cannot be encoded.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName {
        /// Name as given.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Bulk import failed below a node.
    #[error("import \"{path}\": {source}")]
    Import {
        /// Name of the node being imported.
        path: String,
        /// First failure below it.
        #[source]
        source: Box<EnscribeError>,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnscribeError {
    /// Wraps an error with the record key and value that produced it.
    pub fn field(key: impl Into<String>, value: impl Into<String>, source: EnscribeError) -> Self {
        EnscribeError::Field {
            key: key.into(),
            value: value.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an error with the name path of the node being imported.
    pub fn import(path: impl Into<String>, source: EnscribeError) -> Self {
        EnscribeError::Import {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Returns the innermost error of a wrapping chain.
    pub fn root_cause(&self) -> &EnscribeError {
        match self {
            EnscribeError::InvalidAddress { source, .. }
            | EnscribeError::Field { source, .. }
            | EnscribeError::Import { source, .. } => source.root_cause(),
            _ => self,
        }
    }

    /// Returns true if this is a coin resolution or address error.
    pub fn is_coin_error(&self) -> bool {
        matches!(
            self.root_cause(),
            EnscribeError::UnknownCoin(_)
                | EnscribeError::UnsupportedCoin { .. }
                | EnscribeError::Roundtrip { .. }
                | EnscribeError::Codec(_)
        )
    }

    /// Returns true if this is a content hash error.
    pub fn is_content_hash_error(&self) -> bool {
        matches!(
            self.root_cause(),
            EnscribeError::UnknownCodec(_)
                | EnscribeError::MalformedEnvelope(_)
                | EnscribeError::Checksum { .. }
                | EnscribeError::InvalidHash { .. }
        )
    }

    /// Returns true if this is a resolver call decoding error.
    pub fn is_call_error(&self) -> bool {
        matches!(self.root_cause(), EnscribeError::CallParse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EnscribeError::InvalidLength {
            expected: 32,
            actual: 31,
        };
        assert!(err.to_string().contains("32"));
        assert!(err.to_string().contains("31"));
    }

    #[test]
    fn test_field_wrapping_keeps_cause() {
        let err = EnscribeError::field("$eth", "0x12", EnscribeError::UnknownCoin("eth".into()));
        assert!(err.to_string().contains("$eth"));
        assert!(err.is_coin_error());
        assert!(matches!(err.root_cause(), EnscribeError::UnknownCoin(_)));
    }

    #[test]
    fn test_import_wrapping_nests() {
        let inner = EnscribeError::field("#ipfs", "x", EnscribeError::UnknownCodec(0x99));
        let err = EnscribeError::import("raffy.eth", inner);
        assert!(err.to_string().starts_with("import \"raffy.eth\""));
        assert!(err.is_content_hash_error());
        assert!(!err.is_call_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(EnscribeError::from);
        assert!(matches!(result, Err(EnscribeError::Json(_))));
    }
}
