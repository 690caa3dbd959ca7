//! The record: the resolvable fields of one name.
//!
//! Every field holds its canonical binary form. Human strings are parsed on
//! the way in ([`Record::set`]) and rendered on the way out
//! ([`Record::to_entries`], [`Record::to_json`], [`Record::to_object`]).

use std::collections::BTreeMap;

use num_bigint::BigUint;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use enscribe_chash::ContentHash;
use enscribe_coin::{Address, Coin, CoinQuery};
use enscribe_core::constants::{KEY_CHASH, KEY_NAME, KEY_PUBKEY, SIGIL_COIN, SIGIL_MAGIC};
use enscribe_core::error::{EnscribeError, Result};

use crate::key::RecordKey;
use crate::pubkey::Pubkey;

/// Result of a lenient batch operation.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Items stored or deleted successfully.
    pub applied: usize,
    /// Items that failed, each wrapped with its key or call index.
    pub errors: Vec<EnscribeError>,
}

impl ImportOutcome {
    /// True if no item failed.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Text, address, content hash, pubkey and name fields of one name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub(crate) texts: BTreeMap<String, String>,
    pub(crate) addrs: BTreeMap<BigUint, Vec<u8>>,
    pub(crate) chash: Option<ContentHash>,
    pub(crate) pubkey: Option<Pubkey>,
    pub(crate) name: Option<String>,
}

/// JSON values that delete a field instead of setting it.
fn is_falsy(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false))
        || value.as_str().is_some_and(str::is_empty)
}

fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object of human keys.
    pub fn from_json(value: &Value) -> Result<Record> {
        let mut record = Record::new();
        record.import(value)?;
        Ok(record)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // KEYED ACCESS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Stores a human value under a human key. Falsy values delete the field.
    ///
    /// Errors are wrapped with the key and value.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let wrap = |e| EnscribeError::field(key, value_label(value), e);
        let parsed = RecordKey::parse(key).map_err(wrap)?;
        self.set_key(&parsed, value).map_err(wrap)
    }

    /// Stores a human value under a parsed key.
    pub fn set_key(&mut self, key: &RecordKey, value: &Value) -> Result<()> {
        if is_falsy(value) {
            self.delete_key(key);
            return Ok(());
        }
        match key {
            RecordKey::Text(k) => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => return Err(EnscribeError::Format(format!("expected text: {other}"))),
                };
                self.texts.insert(k.clone(), text);
            }
            RecordKey::Addr(coin) => {
                self.set_address(Address::from_value(coin.clone(), value)?);
            }
            RecordKey::Chash(hint) => {
                self.chash = Some(ContentHash::from(value, hint.as_deref())?);
            }
            RecordKey::Pubkey => self.set_pubkey(Some(Pubkey::from_value(value)?)),
            RecordKey::Name => match value {
                Value::String(s) => self.name = Some(s.clone()),
                other => return Err(EnscribeError::Format(format!("expected name: {other}"))),
            },
        }
        Ok(())
    }

    /// Returns the human value stored under a key.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        match RecordKey::parse(key)? {
            RecordKey::Text(k) => Ok(self.texts.get(&k).cloned().map(Value::String)),
            RecordKey::Addr(coin) => Ok(self.address(coin)?.map(|a| Value::String(a.value().into()))),
            RecordKey::Chash(hint) => {
                let Some(chash) = &self.chash else {
                    return Ok(None);
                };
                let Some(hint) = hint else {
                    return Ok(Some(Value::String(chash.to_phex())));
                };
                let (entry_key, entry_value) = chash.to_entry()?;
                if entry_key == hint {
                    Ok(Some(entry_value))
                } else {
                    Ok(Some(Value::String(chash.to_url()?)))
                }
            }
            RecordKey::Pubkey => Ok(self.pubkey.map(|pk| pk.to_json())),
            RecordKey::Name => Ok(self.name.clone().map(Value::String)),
        }
    }

    /// Deletes the field under a key. Returns true if something was removed.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.delete_key(&RecordKey::parse(key)?))
    }

    fn delete_key(&mut self, key: &RecordKey) -> bool {
        match key {
            RecordKey::Text(k) => self.texts.remove(k).is_some(),
            RecordKey::Addr(coin) => self.addrs.remove(coin.coin_type()).is_some(),
            RecordKey::Chash(_) => self.chash.take().is_some(),
            RecordKey::Pubkey => self.pubkey.take().is_some(),
            RecordKey::Name => self.name.take().is_some(),
        }
    }

    /// Sets every key of a JSON object, failing on the first bad field.
    #[instrument(skip_all)]
    pub fn import(&mut self, value: &Value) -> Result<()> {
        let obj = value
            .as_object()
            .ok_or_else(|| EnscribeError::Format(format!("expected record object: {value}")))?;
        for (k, v) in obj {
            self.set(k, v)?;
        }
        Ok(())
    }

    /// Sets every entry, collecting failures instead of stopping.
    #[instrument(skip_all)]
    pub fn import_entries<K, I>(&mut self, entries: I) -> ImportOutcome
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut outcome = ImportOutcome::default();
        for (k, v) in entries {
            match self.set(k.as_ref(), &v) {
                Ok(()) => outcome.applied += 1,
                Err(e) => {
                    debug!(key = k.as_ref(), error = %e, "Skipped record field");
                    outcome.errors.push(e);
                }
            }
        }
        outcome
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TYPED ACCESS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Text value.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Sets or clears (`None`) a text value.
    pub fn set_text(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match value {
            Some(v) if !v.is_empty() => {
                self.texts.insert(key, v);
            }
            _ => {
                self.texts.remove(&key);
            }
        }
    }

    /// Raw address bytes for a coin.
    pub fn addr(&self, coin: impl Into<CoinQuery>) -> Result<Option<&[u8]>> {
        let coin_type = Coin::type_of(coin)?;
        Ok(self.addrs.get(&coin_type).map(Vec::as_slice))
    }

    /// Address for a coin.
    pub fn address(&self, coin: impl Into<CoinQuery>) -> Result<Option<Address>> {
        let coin = Coin::from_query(coin)?;
        match self.addrs.get(coin.coin_type()) {
            Some(v) => Ok(Some(Address::new(coin, v.clone())?)),
            None => Ok(None),
        }
    }

    /// Stores a validated address.
    pub fn set_address(&mut self, address: Address) {
        let coin_type = address.type_().clone();
        self.addrs.insert(coin_type, address.into_bytes());
    }

    /// Validates and stores raw address bytes; empty bytes clear the address.
    pub fn set_addr(&mut self, coin: impl Into<CoinQuery>, bytes: Vec<u8>) -> Result<()> {
        let coin = Coin::from_query(coin)?;
        if bytes.is_empty() {
            self.addrs.remove(coin.coin_type());
            return Ok(());
        }
        self.set_address(Address::new(coin, bytes)?);
        Ok(())
    }

    /// Coin types with an address, ascending.
    pub fn coin_types(&self) -> impl Iterator<Item = &BigUint> {
        self.addrs.keys()
    }

    /// Text keys, ascending.
    pub fn text_keys(&self) -> impl Iterator<Item = &str> {
        self.texts.keys().map(String::as_str)
    }

    /// Content hash.
    pub fn chash(&self) -> Option<&ContentHash> {
        self.chash.as_ref()
    }

    /// Sets or clears the content hash.
    pub fn set_chash(&mut self, chash: Option<ContentHash>) {
        self.chash = chash;
    }

    /// Public key.
    pub fn pubkey(&self) -> Option<&Pubkey> {
        self.pubkey.as_ref()
    }

    /// Sets or clears the public key. The zero key clears.
    pub fn set_pubkey(&mut self, pubkey: Option<Pubkey>) {
        self.pubkey = pubkey.filter(|pk| !pk.is_null());
    }

    /// Canonical name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets or clears the canonical name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name.filter(|n| !n.is_empty());
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.texts.len()
            + self.addrs.len()
            + usize::from(self.chash.is_some())
            + usize::from(self.pubkey.is_some())
            + usize::from(self.name.is_some())
    }

    /// True if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RENDERING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Human `(key, value)` pairs in field order: texts, addresses, content
    /// hash, pubkey, name.
    ///
    /// Machine mode renders the content hash and pubkey as hex under `#chash`
    /// and `#pubkey`. Human mode uses the content hash's short entry (such as
    /// `#ipfs`) and the pubkey's `{x, y}` form.
    pub fn to_entries(&self, human: bool) -> Result<Vec<(String, Value)>> {
        let mut entries = Vec::with_capacity(self.len());
        for (k, v) in &self.texts {
            entries.push((k.clone(), Value::String(v.clone())));
        }
        for (coin_type, v) in &self.addrs {
            let coin = Coin::from_type(coin_type.clone());
            let value = coin.format(v)?;
            entries.push((format!("{SIGIL_COIN}{}", coin.name()), Value::String(value)));
        }
        if let Some(chash) = &self.chash {
            if human {
                let (k, v) = chash.to_entry()?;
                entries.push((format!("{SIGIL_MAGIC}{k}"), v));
            } else {
                entries.push((KEY_CHASH.into(), Value::String(chash.to_phex())));
            }
        }
        if let Some(pubkey) = &self.pubkey {
            let value = if human {
                pubkey.to_json()
            } else {
                Value::String(pubkey.to_phex())
            };
            entries.push((KEY_PUBKEY.into(), value));
        }
        if let Some(name) = &self.name {
            entries.push((KEY_NAME.into(), Value::String(name.clone())));
        }
        Ok(entries)
    }

    /// JSON object of [`to_entries`](Self::to_entries).
    pub fn to_json(&self, human: bool) -> Result<Value> {
        Ok(Value::Object(self.to_entries(human)?.into_iter().collect()))
    }

    /// Rich JSON description with decomposed addresses, content hash and pubkey.
    pub fn to_object(&self) -> Result<Value> {
        let mut obj = Map::new();
        for (k, v) in &self.texts {
            obj.insert(k.clone(), Value::String(v.clone()));
        }
        for (coin_type, v) in &self.addrs {
            let address = Address::new(Coin::from_type(coin_type.clone()), v.clone())?;
            obj.insert(format!("{SIGIL_COIN}{}", address.name()), address.to_object());
        }
        if let Some(chash) = &self.chash {
            obj.insert(KEY_CHASH.into(), chash.to_object()?);
        }
        if let Some(pubkey) = &self.pubkey {
            obj.insert(KEY_PUBKEY.into(), pubkey.to_object());
        }
        if let Some(name) = &self.name {
            obj.insert(KEY_NAME.into(), Value::String(name.clone()));
        }
        Ok(Value::Object(obj))
    }
}
