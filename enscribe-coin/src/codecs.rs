//! Address codecs for the bundled coin table.
//!
//! Canonical bytes follow ENSIP-9: EVM addresses are the raw 20 bytes, UTXO
//! coins store the output script (P2PKH, P2SH or a segwit program).

use bech32::{FromBase32, ToBase32, Variant};

use enscribe_core::bytes::is_samecase_phex;
use enscribe_core::constants::ETH_ADDRESS_SIZE;
use enscribe_core::error::{EnscribeError, Result};
use enscribe_core::traits::AddressCodec;
use enscribe_crypto::keccak256;

fn codec_err(msg: impl Into<String>) -> EnscribeError {
    EnscribeError::Codec(msg.into())
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVM
// ═══════════════════════════════════════════════════════════════════════════════

/// EIP-55 hex address codec.
///
/// The strict form only accepts input whose mixed case is a valid checksum.
/// The lenient form additionally accepts all-lowercase or all-uppercase hex.
#[derive(Clone, Copy, Debug)]
pub struct EvmCodec {
    /// Accept same-case hex without a checksum.
    pub lenient: bool,
}

/// EIP-55 codec as published by the coin table.
pub const EVM_CHECKSUM: EvmCodec = EvmCodec { lenient: false };

/// EIP-55 codec that also accepts same-case hex.
pub const EVM_LENIENT: EvmCodec = EvmCodec { lenient: true };

/// Renders 20 address bytes with the EIP-55 mixed-case checksum.
pub fn to_checksum_address(v: &[u8]) -> Result<String> {
    if v.len() != ETH_ADDRESS_SIZE {
        return Err(EnscribeError::InvalidLength {
            expected: ETH_ADDRESS_SIZE,
            actual: v.len(),
        });
    }
    let lower = hex::encode(v);
    let hash = keccak256(lower.as_bytes());
    let checksummed: String = lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect();
    Ok(format!("0x{checksummed}"))
}

impl AddressCodec for EvmCodec {
    fn parse(&self, s: &str) -> Result<Vec<u8>> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| codec_err("expected 0x prefix"))?;
        if digits.len() != ETH_ADDRESS_SIZE * 2 {
            return Err(codec_err(format!("expected 40 hex digits, got {}", digits.len())));
        }
        let bytes = hex::decode(digits)?;
        if self.lenient && is_samecase_phex(s) {
            return Ok(bytes);
        }
        if to_checksum_address(&bytes)? != s {
            return Err(codec_err("invalid checksum"));
        }
        Ok(bytes)
    }

    fn format(&self, v: &[u8]) -> Result<String> {
        to_checksum_address(v)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// UTXO (Base58Check + segwit)
// ═══════════════════════════════════════════════════════════════════════════════

/// Bitcoin-family codec: Base58Check P2PKH/P2SH and optional segwit.
#[derive(Clone, Copy, Debug)]
pub struct UtxoCodec {
    /// Segwit human-readable part, if the coin supports segwit.
    pub hrp: Option<&'static str>,
    /// Accepted P2PKH version bytes; the first is used when formatting.
    pub p2pkh: &'static [u8],
    /// Accepted P2SH version bytes; the first is used when formatting.
    pub p2sh: &'static [u8],
}

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;
const PUSH_20: u8 = 0x14;

impl UtxoCodec {
    fn parse_segwit(&self, hrp: &str, s: &str) -> Result<Vec<u8>> {
        let (decoded_hrp, data, variant) = bech32::decode(s).map_err(|e| codec_err(e.to_string()))?;
        if decoded_hrp != hrp {
            return Err(codec_err(format!("expected hrp {hrp}, got {decoded_hrp}")));
        }
        let (version, program) = data
            .split_first()
            .ok_or_else(|| codec_err("empty witness program"))?;
        let version = version.to_u8();
        let program = Vec::<u8>::from_base32(program).map_err(|e| codec_err(e.to_string()))?;
        let expected = if version == 0 { Variant::Bech32 } else { Variant::Bech32m };
        if version > 16 || variant != expected {
            return Err(codec_err(format!("invalid witness version {version}")));
        }
        if !(2..=40).contains(&program.len()) || (version == 0 && ![20, 32].contains(&program.len())) {
            return Err(codec_err(format!("invalid witness program length {}", program.len())));
        }
        let opcode = if version == 0 { 0 } else { OP_1 + version - 1 };
        let mut script = vec![opcode, program.len() as u8];
        script.extend_from_slice(&program);
        Ok(script)
    }

    fn format_segwit(&self, hrp: &str, v: &[u8]) -> Result<String> {
        let version = match v[0] {
            0 => 0,
            op @ OP_1..=OP_16 => op - OP_1 + 1,
            op => return Err(codec_err(format!("unknown witness opcode 0x{op:02x}"))),
        };
        let variant = if version == 0 { Variant::Bech32 } else { Variant::Bech32m };
        let mut data = vec![bech32::u5::try_from_u8(version).map_err(|e| codec_err(e.to_string()))?];
        data.extend((&v[2..]).to_base32());
        bech32::encode(hrp, data, variant).map_err(|e| codec_err(e.to_string()))
    }

    fn base58check(version: u8, hash: &[u8]) -> String {
        let mut payload = Vec::with_capacity(1 + hash.len());
        payload.push(version);
        payload.extend_from_slice(hash);
        bs58::encode(payload).with_check().into_string()
    }
}

impl AddressCodec for UtxoCodec {
    fn parse(&self, s: &str) -> Result<Vec<u8>> {
        if let Some(hrp) = self.hrp {
            if s.to_ascii_lowercase().starts_with(&format!("{hrp}1")) {
                return self.parse_segwit(hrp, s);
            }
        }
        let decoded = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|e| codec_err(e.to_string()))?;
        let (version, hash) = decoded
            .split_first()
            .ok_or_else(|| codec_err("empty payload"))?;
        if hash.len() != 20 {
            return Err(codec_err(format!("expected 20-byte hash, got {}", hash.len())));
        }
        if self.p2pkh.contains(version) {
            let mut script = vec![OP_DUP, OP_HASH160, PUSH_20];
            script.extend_from_slice(hash);
            script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
            Ok(script)
        } else if self.p2sh.contains(version) {
            let mut script = vec![OP_HASH160, PUSH_20];
            script.extend_from_slice(hash);
            script.push(OP_EQUAL);
            Ok(script)
        } else {
            Err(codec_err(format!("unknown version byte 0x{version:02x}")))
        }
    }

    fn format(&self, v: &[u8]) -> Result<String> {
        match v {
            [OP_DUP, OP_HASH160, PUSH_20, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG] if hash.len() == 20 => {
                Ok(Self::base58check(self.p2pkh[0], hash))
            }
            [OP_HASH160, PUSH_20, hash @ .., OP_EQUAL] if hash.len() == 20 => {
                Ok(Self::base58check(self.p2sh[0], hash))
            }
            [_, len, program @ ..] if *len as usize == program.len() && (2..=40).contains(&program.len()) => {
                let hrp = self.hrp.ok_or_else(|| codec_err("segwit unsupported"))?;
                self.format_segwit(hrp, v)
            }
            _ => Err(codec_err("unrecognized output script")),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BASE58
// ═══════════════════════════════════════════════════════════════════════════════

/// Plain Base58 of a fixed-length public key (Solana).
#[derive(Clone, Copy, Debug)]
pub struct Base58Codec {
    /// Required byte length.
    pub len: usize,
}

impl AddressCodec for Base58Codec {
    fn parse(&self, s: &str) -> Result<Vec<u8>> {
        let v = bs58::decode(s).into_vec().map_err(|e| codec_err(e.to_string()))?;
        if v.len() != self.len {
            return Err(EnscribeError::InvalidLength {
                expected: self.len,
                actual: v.len(),
            });
        }
        Ok(v)
    }

    fn format(&self, v: &[u8]) -> Result<String> {
        if v.len() != self.len {
            return Err(EnscribeError::InvalidLength {
                expected: self.len,
                actual: v.len(),
            });
        }
        Ok(bs58::encode(v).into_string())
    }
}
