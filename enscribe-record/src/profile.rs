//! Profiles: which record fields to query or declare, without values.

use std::collections::BTreeSet;

use num_bigint::BigUint;
use serde_json::{json, Value};

use enscribe_coin::{Coin, CoinQuery};
use enscribe_core::constants::{
    KEY_ADDR0, KEY_CHASH, KEY_NAME, KEY_PUBKEY, SEL_ADDR, SEL_ADDR0, SEL_CONTENTHASH, SEL_NAME,
    SEL_PUBKEY, SEL_TEXT, SIGIL_COIN,
};
use enscribe_core::error::{EnscribeError, Result};
use enscribe_crypto::namehash;

use crate::abi::{encode_call, AbiArg};
use crate::key::RecordKey;
use crate::record::Record;

const ENS_TEXTS: &[&str] = &[
    "avatar",
    "description",
    "display",
    "email",
    "keywords",
    "mail",
    "notice",
    "location",
    "phone",
    "url",
    "header",
    "com.github",
    "com.twitter",
    "com.discord",
    "org.telegram",
    "com.reddit",
];

const ENS_COINS: &[&str] = &["btc", "ltc", "doge", "eth", "sol", "op", "arb1", "base", "matic"];

/// A field shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    /// Text keys.
    pub texts: BTreeSet<String>,
    /// Coin types.
    pub coins: BTreeSet<BigUint>,
    /// Content hash.
    pub chash: bool,
    /// Public key.
    pub pubkey: bool,
    /// Canonical name.
    pub name: bool,
    /// Legacy `addr(bytes32)` ETH address.
    pub addr0: bool,
}

impl Profile {
    /// Creates an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Common ENS profile fields: social texts, popular coins, content hash and pubkey.
    pub fn ens() -> Self {
        let mut profile = Self {
            texts: ENS_TEXTS.iter().map(|s| s.to_string()).collect(),
            chash: true,
            pubkey: true,
            ..Self::default()
        };
        for name in ENS_COINS {
            if let Ok(coin) = Coin::from_name(name) {
                profile.coins.insert(coin.coin_type().clone());
            }
        }
        profile
    }

    /// The fields present in a record.
    pub fn from_record(record: &Record) -> Self {
        let mut profile = Self::new();
        profile.import_record(record);
        profile
    }

    /// A profile from human keys; `#addr0` selects the legacy address.
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut profile = Self::new();
        for key in keys {
            profile.add_key(key.as_ref())?;
        }
        Ok(profile)
    }

    /// Adds one human key.
    pub fn add_key(&mut self, key: &str) -> Result<()> {
        if key == KEY_ADDR0 {
            self.addr0 = true;
            return Ok(());
        }
        match RecordKey::parse(key)? {
            RecordKey::Text(k) => {
                self.texts.insert(k);
            }
            RecordKey::Addr(coin) => {
                self.coins.insert(coin.coin_type().clone());
            }
            RecordKey::Chash(_) => self.chash = true,
            RecordKey::Pubkey => self.pubkey = true,
            RecordKey::Name => self.name = true,
        }
        Ok(())
    }

    /// Adds the fields present in a record.
    pub fn import_record(&mut self, record: &Record) {
        self.texts.extend(record.text_keys().map(String::from));
        self.coins.extend(record.coin_types().cloned());
        self.chash |= record.chash().is_some();
        self.pubkey |= record.pubkey().is_some();
        self.name |= record.name().is_some();
    }

    /// Adds the keys of a JSON object; values are ignored.
    pub fn import_json(&mut self, value: &Value) -> Result<()> {
        let obj = value
            .as_object()
            .ok_or_else(|| EnscribeError::Format(format!("expected object: {value}")))?;
        for key in obj.keys() {
            self.add_key(key)?;
        }
        Ok(())
    }

    /// Adds a text key.
    pub fn set_text(&mut self, key: impl Into<String>) {
        self.texts.insert(key.into());
    }

    /// Adds a coin.
    pub fn set_coin(&mut self, coin: impl Into<CoinQuery>) -> Result<()> {
        self.coins.insert(Coin::type_of(coin)?);
        Ok(())
    }

    /// Every field of either profile.
    pub fn union(&self, other: &Profile) -> Profile {
        Profile {
            texts: self.texts.union(&other.texts).cloned().collect(),
            coins: self.coins.union(&other.coins).cloned().collect(),
            chash: self.chash || other.chash,
            pubkey: self.pubkey || other.pubkey,
            name: self.name || other.name,
            addr0: self.addr0 || other.addr0,
        }
    }

    /// Number of getter calls this profile produces.
    pub fn len(&self) -> usize {
        self.texts.len()
            + self.coins.len()
            + [self.chash, self.pubkey, self.name, self.addr0]
                .into_iter()
                .filter(|&b| b)
                .count()
    }

    /// True if no field is selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human keys in getter order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.texts.iter().cloned().collect();
        keys.extend(
            self.coins
                .iter()
                .map(|t| format!("{SIGIL_COIN}{}", Coin::from_type(t.clone()).name())),
        );
        let flags = [
            (self.chash, KEY_CHASH),
            (self.pubkey, KEY_PUBKEY),
            (self.name, KEY_NAME),
            (self.addr0, KEY_ADDR0),
        ];
        keys.extend(flags.into_iter().filter(|(on, _)| *on).map(|(_, k)| k.to_string()));
        keys
    }

    /// `{texts, coins, chash, pubkey, name, addr0}` with coin names.
    pub fn to_json(&self) -> Value {
        let coins: Vec<String> = self
            .coins
            .iter()
            .map(|t| Coin::from_type(t.clone()).name())
            .collect();
        json!({
            "texts": self.texts,
            "coins": coins,
            "chash": self.chash,
            "pubkey": self.pubkey,
            "name": self.name,
            "addr0": self.addr0,
        })
    }

    /// Getter calls for `node` in order: texts, coins, content hash, pubkey,
    /// name, legacy address.
    pub fn make_getters(&self, node: &[u8; 32]) -> Result<Vec<Vec<u8>>> {
        let node = AbiArg::Word(*node);
        let mut calls = Vec::with_capacity(self.len());
        for key in &self.texts {
            calls.push(encode_call(SEL_TEXT, &[node, AbiArg::Str(key)])?);
        }
        for coin_type in &self.coins {
            calls.push(encode_call(SEL_ADDR, &[node, AbiArg::uint(coin_type)?])?);
        }
        let flags = [
            (self.chash, SEL_CONTENTHASH),
            (self.pubkey, SEL_PUBKEY),
            (self.name, SEL_NAME),
            (self.addr0, SEL_ADDR0),
        ];
        for (_, selector) in flags.into_iter().filter(|(on, _)| *on) {
            calls.push(encode_call(selector, &[node])?);
        }
        Ok(calls)
    }

    /// Getter calls for a dotted name.
    pub fn make_calls_for_name(&self, name: &str) -> Result<Vec<Vec<u8>>> {
        self.make_getters(&namehash(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{read_memory, split_call};
    use enscribe_core::bytes::usize_at;

    #[test]
    fn test_ens_preset() {
        let profile = Profile::ens();
        assert_eq!(profile.texts.len(), 16);
        assert_eq!(profile.coins.len(), 9);
        assert!(profile.chash && profile.pubkey);
        assert!(!profile.name && !profile.addr0);
        assert_eq!(profile.len(), 27);
        assert!(profile.coins.contains(&BigUint::from(60u32)));
    }

    #[test]
    fn test_make_getters_order() {
        let profile = Profile::from_keys(["avatar", "$eth", "#chash", "#pubkey", "#name", "#addr0"]).unwrap();
        let node = [0x22u8; 32];
        let calls = profile.make_getters(&node).unwrap();
        let selectors: Vec<u32> = calls.iter().map(|c| split_call(c).unwrap().0).collect();
        assert_eq!(selectors, [SEL_TEXT, SEL_ADDR, SEL_CONTENTHASH, SEL_PUBKEY, SEL_NAME, SEL_ADDR0]);
        assert_eq!(read_memory(&calls[0][4..], 32).unwrap(), b"avatar");
        assert_eq!(usize_at(&calls[1][4..], 32).unwrap(), 60);
        assert_eq!(calls[2].len(), 36);
        assert!(calls.iter().all(|c| c[4..36] == node));
    }

    #[test]
    fn test_from_record_and_json() {
        let record = Record::from_json(&json!({
            "avatar": "x",
            "$btc": "bc1q9ejpfyp7fvjdq5fjx5hhrd6uzevn9gupxd98aq",
            "#name": "raffy.eth",
        }))
        .unwrap();
        let profile = Profile::from_record(&record);
        assert_eq!(profile.keys(), ["avatar", "$btc", "#name"]);

        let mut from_json = Profile::new();
        from_json.import_json(&json!({"avatar": null, "$btc": 0, "#name": false})).unwrap();
        assert_eq!(from_json, profile);
    }

    #[test]
    fn test_union() {
        let a = Profile::from_keys(["avatar", "$eth"]).unwrap();
        let b = Profile::from_keys(["url", "$eth", "#pubkey"]).unwrap();
        let u = a.union(&b);
        assert_eq!(u.len(), 4);
        assert_eq!(u.keys(), ["avatar", "url", "$eth", "#pubkey"]);
    }

    #[test]
    fn test_setters_and_json() {
        let mut p = Profile::new();
        p.set_text("url");
        p.set_coin("op").unwrap();
        p.set_coin(0u32).unwrap();
        assert!(p.set_coin("nope").is_err());
        assert_eq!(
            p.to_json(),
            json!({"texts": ["url"], "coins": ["btc", "op"], "chash": false, "pubkey": false, "name": false, "addr0": false})
        );
    }

    #[test]
    fn test_calls_for_name() {
        let p = Profile::from_keys(["#name"]).unwrap();
        let calls = p.make_calls_for_name("raffy.eth").unwrap();
        assert_eq!(&calls[0][4..], &namehash("raffy.eth"));
        assert!(Profile::from_keys([""]).is_err());
    }
}
