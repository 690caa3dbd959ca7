//! Coin-tagged addresses.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use enscribe_core::bytes::{bytes_from_value, phex_from_bytes};
use enscribe_core::error::{EnscribeError, Result};

use crate::coin::{Coin, CoinQuery};

/// A validated address for a specific coin.
///
/// Holds both the canonical bytes and their human-readable form, so
/// formatting never fails after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    coin: Coin,
    bytes: Vec<u8>,
    value: String,
}

impl Address {
    fn wrap(coin: &Coin, value: impl Into<String>, source: EnscribeError) -> EnscribeError {
        EnscribeError::InvalidAddress {
            coin: coin.name(),
            value: value.into(),
            source: Box::new(source),
        }
    }

    /// Builds an address from canonical bytes, checking the codec round trip.
    pub fn new(coin: Coin, bytes: Vec<u8>) -> Result<Address> {
        let phex = phex_from_bytes(&bytes);
        coin.assert_valid(&bytes)
            .map_err(|e| Self::wrap(&coin, phex.clone(), e))?;
        let value = coin.format(&bytes).map_err(|e| Self::wrap(&coin, phex, e))?;
        Ok(Address { coin, bytes, value })
    }

    /// Parses the human-readable form for `coin`.
    pub fn parse(coin: Coin, s: &str) -> Result<Address> {
        let bytes = coin.parse(s).map_err(|e| Self::wrap(&coin, s, e))?;
        Self::new(coin, bytes)
    }

    /// Resolves the coin, then parses the address.
    pub fn from_query(query: impl Into<CoinQuery>, s: &str) -> Result<Address> {
        Self::parse(Coin::from_query(query)?, s)
    }

    /// Builds an address from JSON: a string is parsed, an array is raw bytes.
    pub fn from_value(coin: Coin, value: &Value) -> Result<Address> {
        match value {
            Value::String(s) => Self::parse(coin, s),
            other => {
                let bytes = bytes_from_value(other).map_err(|e| Self::wrap(&coin, other.to_string(), e))?;
                Self::new(coin, bytes)
            }
        }
    }

    /// Parses an Ethereum address.
    pub fn eth(s: &str) -> Result<Address> {
        Self::parse(Coin::eth(), s)
    }

    /// The coin this address belongs to.
    pub fn coin(&self) -> &Coin {
        &self.coin
    }

    /// The coin type.
    pub fn type_(&self) -> &num_bigint::BigUint {
        self.coin.coin_type()
    }

    /// The coin name.
    pub fn name(&self) -> String {
        self.coin.name()
    }

    /// Canonical bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the address, returning its canonical bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Human-readable form.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Canonical bytes as `0x` hex.
    pub fn to_phex(&self) -> String {
        phex_from_bytes(&self.bytes)
    }

    /// JSON description: `{type, name, value, bytes}`.
    pub fn to_object(&self) -> Value {
        let coin = self.coin.to_object();
        json!({
            "type": coin["type"],
            "name": self.name(),
            "value": self.value,
            "bytes": self.to_phex(),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Address {
    type Err = EnscribeError;

    /// Parses as an Ethereum address.
    fn from_str(s: &str) -> Result<Self> {
        Address::eth(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    const ETH: &str = "0x51050ec063d393217B436747617aD1C2285Aeeee";

    #[test]
    fn test_eth_default() {
        let a: Address = ETH.parse().unwrap();
        assert_eq!(a.coin(), &Coin::eth());
        assert_eq!(a.to_string(), ETH);
        assert_eq!(a.bytes().len(), 20);
        assert_eq!(a.to_phex(), ETH.to_lowercase());
    }

    #[test]
    fn test_lowercase_normalizes_to_checksum() {
        let a = Address::eth(&ETH.to_lowercase()).unwrap();
        assert_eq!(a.value(), ETH);
    }

    #[test_case("btc", "bc1q9ejpfyp7fvjdq5fjx5hhrd6uzevn9gupxd98aq", "0x00142e6414903e4b24d05132352f71b75c165932a381"; "btc segwit")]
    #[test_case("eth", "0x51050ec063d393217B436747617aD1C2285Aeeee", "0x51050ec063d393217b436747617ad1c2285aeeee"; "eth")]
    #[test_case("ltc", "LaMT348PWRnrqeeWArpwQPbuanpXDZGEUz", "0x76a914a5f4d12ce3685781b227c1f39548ddef429e978388ac"; "ltc p2pkh")]
    #[test_case("ltc", "MC8TCxUkkKjV9ZgMNWQGsQ5tLGBDXvkTu4", "0xa9142e6414903e4b24d05132352f71b75c165932a38187"; "ltc p2sh")]
    #[test_case("ltc", "ltc1q9ejpfyp7fvjdq5fjx5hhrd6uzevn9gupz3lr9s", "0x00142e6414903e4b24d05132352f71b75c165932a381"; "ltc segwit")]
    #[test_case("doge", "DKcAMwyEq5rwe2nXUMBqVYZFSNneCg6iSL", "0x76a9149eb02ebe2f323494320f9b1153f07a2e0eff528588ac"; "doge p2pkh")]
    fn test_from_query(coin: &str, value: &str, phex: &str) {
        let a = Address::from_query(coin, value).unwrap();
        assert_eq!(a.to_phex(), phex);
        assert_eq!(a.value(), value);
    }

    #[test]
    fn test_doge_roundtrip() {
        let a = Address::from_query("doge", "DKcAMwyEq5rwe2nXUMBqVYZFSNneCg6iSL").unwrap();
        assert_eq!(a.value(), "DKcAMwyEq5rwe2nXUMBqVYZFSNneCg6iSL");
        let b = Address::new(a.coin().clone(), a.bytes().to_vec()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_address_wraps_cause() {
        let err = Address::eth("0x1234").unwrap_err();
        assert!(matches!(err, EnscribeError::InvalidAddress { .. }));
        assert!(err.is_coin_error());
        assert!(Address::new(Coin::eth(), vec![0u8; 19]).is_err());
    }

    #[test]
    fn test_from_value() {
        let a = Address::from_value(Coin::eth(), &json!(ETH)).unwrap();
        let b = Address::from_value(Coin::eth(), &json!(a.bytes().to_vec())).unwrap();
        assert_eq!(a, b);
        assert!(Address::from_value(Coin::eth(), &json!(true)).is_err());
    }

    #[test]
    fn test_unknown_coin_bytes() {
        let coin = Coin::from_type(69420u64);
        let a = Address::new(coin.clone(), vec![0xab]).unwrap();
        assert_eq!(a.value(), "[0xab]");
        assert!(Address::parse(coin, "[0xab]").is_err());
    }

    #[test]
    fn test_to_object() {
        let obj = Address::eth(ETH).unwrap().to_object();
        assert_eq!(obj["type"], json!(60));
        assert_eq!(obj["name"], json!("eth"));
        assert_eq!(obj["value"], json!(ETH));
    }

    /// Output scripts a UTXO coin can carry for a 20-byte hash.
    fn scripts(hash: &[u8], segwit: bool) -> Vec<Vec<u8>> {
        let mut p2pkh = vec![0x76, 0xa9, 0x14];
        p2pkh.extend_from_slice(hash);
        p2pkh.extend_from_slice(&[0x88, 0xac]);
        let mut p2sh = vec![0xa9, 0x14];
        p2sh.extend_from_slice(hash);
        p2sh.push(0x87);
        let mut out = vec![p2pkh, p2sh];
        if segwit {
            let mut v0 = vec![0x00, 0x14];
            v0.extend_from_slice(hash);
            out.push(v0);
        }
        out
    }

    proptest! {
        #[test]
        fn prop_named_coin_roundtrip(hash in proptest::array::uniform20(any::<u8>())) {
            let eth = Coin::eth();
            prop_assert_eq!(eth.parse(&eth.format(&hash).unwrap()).unwrap(), hash.to_vec());

            for (name, segwit) in [("btc", true), ("ltc", true), ("doge", false)] {
                let coin = Coin::from_name(name).unwrap();
                for script in scripts(&hash, segwit) {
                    let text = coin.format(&script).unwrap();
                    prop_assert_eq!(coin.parse(&text).unwrap(), script);
                }
            }
        }
    }
}
