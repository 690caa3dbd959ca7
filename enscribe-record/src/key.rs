//! Record keys.
//!
//! | key            | field                          |
//! |----------------|--------------------------------|
//! | `$<coin>`      | address for the named coin     |
//! | `#chash`       | content hash (shape decides)   |
//! | `#contenthash` | content hash (shape decides)   |
//! | `#pubkey`      | public key                     |
//! | `#name`        | canonical name                 |
//! | `#<hint>`      | content hash routed by `hint`  |
//! | anything else  | text                           |

use std::fmt;
use std::str::FromStr;

use enscribe_coin::Coin;
use enscribe_core::constants::{KEY_CHASH, KEY_NAME, KEY_PUBKEY, SIGIL_COIN, SIGIL_MAGIC};
use enscribe_core::error::{EnscribeError, Result};

const KEY_CONTENTHASH: &str = "#contenthash";

/// A parsed record key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordKey {
    /// Text field.
    Text(String),
    /// Address for a coin.
    Addr(Coin),
    /// Content hash with an optional construction hint.
    Chash(Option<String>),
    /// Public key.
    Pubkey,
    /// Canonical name.
    Name,
}

impl RecordKey {
    /// Parses a human key.
    pub fn parse(key: &str) -> Result<RecordKey> {
        if key.is_empty() {
            return Err(EnscribeError::UnknownField(key.into()));
        }
        if let Some(coin) = key.strip_prefix(SIGIL_COIN) {
            return Ok(RecordKey::Addr(Coin::from_name(coin)?));
        }
        match key {
            KEY_CHASH | KEY_CONTENTHASH => return Ok(RecordKey::Chash(None)),
            KEY_PUBKEY => return Ok(RecordKey::Pubkey),
            KEY_NAME => return Ok(RecordKey::Name),
            _ => {}
        }
        if let Some(hint) = key.strip_prefix(SIGIL_MAGIC) {
            let hint = (!hint.is_empty()).then(|| hint.to_string());
            return Ok(RecordKey::Chash(hint));
        }
        Ok(RecordKey::Text(key.into()))
    }
}

impl FromStr for RecordKey {
    type Err = EnscribeError;

    fn from_str(s: &str) -> Result<Self> {
        RecordKey::parse(s)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Text(key) => f.write_str(key),
            RecordKey::Addr(coin) => write!(f, "{SIGIL_COIN}{}", coin.name()),
            RecordKey::Chash(None) => f.write_str(KEY_CHASH),
            RecordKey::Chash(Some(hint)) => write!(f, "{SIGIL_MAGIC}{hint}"),
            RecordKey::Pubkey => f.write_str(KEY_PUBKEY),
            RecordKey::Name => f.write_str(KEY_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("avatar", RecordKey::Text("avatar".into()))]
    #[test_case("com.twitter", RecordKey::Text("com.twitter".into()))]
    #[test_case("#chash", RecordKey::Chash(None))]
    #[test_case("#contenthash", RecordKey::Chash(None))]
    #[test_case("#", RecordKey::Chash(None))]
    #[test_case("#ipfs", RecordKey::Chash(Some("ipfs".into())))]
    #[test_case("#text/html", RecordKey::Chash(Some("text/html".into())))]
    #[test_case("#pubkey", RecordKey::Pubkey)]
    #[test_case("#name", RecordKey::Name)]
    fn test_parse(key: &str, expected: RecordKey) {
        assert_eq!(RecordKey::parse(key).unwrap(), expected);
    }

    #[test]
    fn test_parse_coin() {
        assert_eq!(RecordKey::parse("$eth").unwrap(), RecordKey::Addr(Coin::eth()));
        assert_eq!(RecordKey::parse("$ETH").unwrap(), RecordKey::Addr(Coin::eth()));
        assert!(RecordKey::parse("$nope").unwrap_err().is_coin_error());
        assert!(matches!(RecordKey::parse(""), Err(EnscribeError::UnknownField(_))));
    }

    #[test]
    fn test_display_roundtrip() {
        for key in ["avatar", "$btc", "#chash", "#ipfs", "#pubkey", "#name", "$chain:2"] {
            let parsed: RecordKey = key.parse().unwrap();
            assert_eq!(parsed.to_string(), key);
        }
    }
}
