//! Resolver calls: decoding getter answers into a record and encoding setters.

use num_bigint::BigUint;
use tracing::{debug, instrument, warn};

use enscribe_chash::ContentHash;
use enscribe_coin::{Address, Coin};
use enscribe_core::bytes::{big_uint_at, utf8_from_bytes};
use enscribe_core::constants::{
    ETH_ADDRESS_SIZE, HASH_SIZE, PUBKEY_SIZE, SEL_ADDR, SEL_ADDR0, SEL_CONTENTHASH,
    SEL_NAME, SEL_PUBKEY, SEL_SET_ADDR, SEL_SET_CONTENTHASH, SEL_SET_NAME, SEL_SET_PUBKEY,
    SEL_SET_TEXT, SEL_TEXT, WORD_SIZE,
};
use enscribe_core::error::{EnscribeError, Result};

use crate::abi::{encode_call, read_memory, split_call, AbiArg};
use crate::pubkey::Pubkey;
use crate::record::{ImportOutcome, Record};

/// Options for [`Record::make_setters`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SetterOptions<'a> {
    /// Namehash of the node the setters target.
    pub node: [u8; 32],
    /// Previous record. When present only changed fields get a setter, and
    /// fields missing from the current record are cleared.
    pub init: Option<&'a Record>,
}

impl<'a> SetterOptions<'a> {
    /// Setters for every field of the record at `node`.
    pub fn new(node: [u8; 32]) -> Self {
        Self { node, init: None }
    }

    /// Only emit setters for the fields that differ from `init`.
    pub fn diff(mut self, init: &'a Record) -> Self {
        self.init = Some(init);
        self
    }
}

fn call_err(msg: impl Into<String>) -> EnscribeError {
    EnscribeError::CallParse(msg.into())
}

fn check_answer(answer: &[u8]) -> Result<()> {
    if answer.is_empty() {
        return Err(call_err("no answer"));
    }
    if answer.len() % WORD_SIZE != 0 {
        if answer.len() > 4 && (answer.len() - 4) % WORD_SIZE == 0 {
            return Err(call_err(format!("reverted: {} bytes", answer.len())));
        }
        return Err(call_err(format!("misaligned answer: {} bytes", answer.len())));
    }
    Ok(())
}

fn is_zero(v: &[u8]) -> bool {
    v.iter().all(|&b| b == 0)
}

impl Record {
    // ═══════════════════════════════════════════════════════════════════════════
    // DECODING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Applies one getter call and its ABI answer to this record.
    ///
    /// Empty dynamic answers and all-zero fixed answers clear the field.
    pub fn parse_call(&mut self, call: &[u8], answer: &[u8]) -> Result<()> {
        check_answer(answer)?;
        let (selector, args) = split_call(call)?;
        if args.len() < HASH_SIZE {
            return Err(call_err("call is missing its node"));
        }
        match selector {
            SEL_TEXT => {
                let key = utf8_from_bytes(read_memory(args, WORD_SIZE)?)?;
                let value = utf8_from_bytes(read_memory(answer, 0)?)?;
                self.set_text(key, Some(value));
            }
            SEL_ADDR => {
                let coin_type = big_uint_at(args, WORD_SIZE).map_err(|e| call_err(e.to_string()))?;
                let value = read_memory(answer, 0)?;
                self.set_addr(coin_type, value.to_vec())?;
            }
            SEL_CONTENTHASH => {
                let value = read_memory(answer, 0)?;
                let chash = if value.is_empty() {
                    None
                } else {
                    Some(ContentHash::from_bytes(value)?)
                };
                self.set_chash(chash);
            }
            SEL_PUBKEY => {
                if answer.len() != PUBKEY_SIZE {
                    return Err(call_err(format!("expected {PUBKEY_SIZE}-byte pubkey, got {}", answer.len())));
                }
                self.set_pubkey(Some(Pubkey::from_bytes(answer)?));
            }
            SEL_NAME => {
                let name = utf8_from_bytes(read_memory(answer, 0)?)?;
                self.set_name(Some(name));
            }
            SEL_ADDR0 => {
                if answer.len() != WORD_SIZE {
                    return Err(call_err(format!("expected 32-byte address, got {}", answer.len())));
                }
                let eth = Coin::eth();
                if is_zero(answer) {
                    self.addrs.remove(eth.coin_type());
                } else {
                    let address = Address::new(eth, answer[WORD_SIZE - ETH_ADDRESS_SIZE..].to_vec())?;
                    self.set_address(address);
                }
            }
            other => return Err(call_err(format!("unknown selector 0x{other:08x}"))),
        }
        Ok(())
    }

    /// Applies a batch of calls and answers, skipping items that fail.
    ///
    /// Multicall batches routinely contain reverts for unset fields, so a
    /// failed item never stops the batch. Only mismatched lengths are an error.
    #[instrument(skip_all, fields(calls = calls.len()))]
    pub fn parse_calls<C, A>(&mut self, calls: &[C], answers: &[A]) -> Result<ImportOutcome>
    where
        C: AsRef<[u8]>,
        A: AsRef<[u8]>,
    {
        if calls.len() != answers.len() {
            return Err(call_err(format!(
                "expected {} answers, got {}",
                calls.len(),
                answers.len()
            )));
        }
        let mut outcome = ImportOutcome::default();
        for (index, (call, answer)) in calls.iter().zip(answers).enumerate() {
            match self.parse_call(call.as_ref(), answer.as_ref()) {
                Ok(()) => outcome.applied += 1,
                Err(e) => {
                    warn!(index, error = %e, "Skipped resolver answer");
                    outcome.errors.push(e);
                }
            }
        }
        debug!(applied = outcome.applied, failed = outcome.errors.len(), "Parsed resolver answers");
        Ok(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENCODING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Encodes setter calls in field order: texts, addresses, content hash,
    /// pubkey, name.
    pub fn make_setters(&self, options: &SetterOptions<'_>) -> Result<Vec<Vec<u8>>> {
        let node = AbiArg::Word(options.node);
        let empty = Record::default();
        let init = options.init.unwrap_or(&empty);
        let diff = options.init.is_some();
        let mut calls = Vec::new();

        let mut text_keys: Vec<&String> = self.texts.keys().collect();
        if diff {
            text_keys.extend(init.texts.keys().filter(|k| !self.texts.contains_key(*k)));
            text_keys.sort();
        }
        for key in text_keys {
            let value = self.texts.get(key);
            if diff && value == init.texts.get(key) {
                continue;
            }
            let value = value.map(String::as_str).unwrap_or_default();
            calls.push(encode_call(SEL_SET_TEXT, &[node, AbiArg::Str(key), AbiArg::Str(value)])?);
        }

        let mut coin_types: Vec<&BigUint> = self.addrs.keys().collect();
        if diff {
            coin_types.extend(init.addrs.keys().filter(|k| !self.addrs.contains_key(*k)));
            coin_types.sort();
        }
        for coin_type in coin_types {
            let value = self.addrs.get(coin_type);
            if diff && value == init.addrs.get(coin_type) {
                continue;
            }
            let value = value.map(Vec::as_slice).unwrap_or_default();
            calls.push(encode_call(
                SEL_SET_ADDR,
                &[node, AbiArg::uint(coin_type)?, AbiArg::Bytes(value)],
            )?);
        }

        if !(diff && self.chash == init.chash) && (diff || self.chash.is_some()) {
            let value = self.chash.as_ref().map(ContentHash::bytes).unwrap_or_default();
            calls.push(encode_call(SEL_SET_CONTENTHASH, &[node, AbiArg::Bytes(value)])?);
        }

        if !(diff && self.pubkey == init.pubkey) && (diff || self.pubkey.is_some()) {
            let pubkey = self.pubkey.unwrap_or_default();
            calls.push(encode_call(SEL_SET_PUBKEY, &[node, AbiArg::Raw(pubkey.bytes())])?);
        }

        if !(diff && self.name == init.name) && (diff || self.name.is_some()) {
            let value = self.name.as_deref().unwrap_or_default();
            calls.push(encode_call(SEL_SET_NAME, &[node, AbiArg::Str(value)])?);
        }

        debug!(calls = calls.len(), diff, "Encoded setters");
        Ok(calls)
    }
}
