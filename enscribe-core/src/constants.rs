//! Protocol constants for enscribe.
//!
//! Coin types follow SLIP-44 / ENSIP-11, content-hash codecs follow the
//! multicodec table used by EIP-1577, and selectors are the first four bytes
//! of the Keccak-256 hash of the public resolver function signatures.

// ═══════════════════════════════════════════════════════════════════════════════
// COIN TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// SLIP-44 coin type of Ethereum.
pub const COIN_TYPE_ETH: u64 = 60;

/// High bit marking an EVM chain coin type (ENSIP-11): `type = chain | MSB`.
pub const COIN_TYPE_EVM_MSB: u64 = 0x8000_0000;

/// Chain id of Ethereum mainnet, which maps to [`COIN_TYPE_ETH`] instead of `1 | MSB`.
pub const ETH_CHAIN_ID: u64 = 1;

/// Prefix of synthetic EVM coin names, e.g. `chain:10`.
pub const PREFIX_CHAIN: &str = "chain:";

/// Prefix of explicit unknown coin names, e.g. `#69420`.
pub const PREFIX_UNKNOWN_COIN: &str = "#";

// ═══════════════════════════════════════════════════════════════════════════════
// RECORD KEY SIGILS
// ═══════════════════════════════════════════════════════════════════════════════

/// Record keys starting with this sigil address a coin: `$eth`, `$btc`.
pub const SIGIL_COIN: char = '$';

/// Record keys starting with this sigil address a magic field: `#chash`, `#ipfs`.
pub const SIGIL_MAGIC: char = '#';

/// Magic key for the raw content hash.
pub const KEY_CHASH: &str = "#chash";

/// Magic key for the secp256k1 public key.
pub const KEY_PUBKEY: &str = "#pubkey";

/// Magic key for the reverse (canonical) name.
pub const KEY_NAME: &str = "#name";

/// Magic key for the legacy `addr(bytes32)` ETH address in a profile.
pub const KEY_ADDR0: &str = "#addr0";

/// Import key that designates a node's own record.
pub const LABEL_SELF: &str = ".";

// ═══════════════════════════════════════════════════════════════════════════════
// CONTENT-HASH CODECS (multicodec)
// ═══════════════════════════════════════════════════════════════════════════════

/// `ipfs-ns`
pub const CODEC_IPFS: u64 = 0xE3;
/// `swarm-ns`
pub const CODEC_SWARM: u64 = 0xE4;
/// `ipns-ns`
pub const CODEC_IPNS: u64 = 0xE5;
/// `arweave-ns`
pub const CODEC_ARWEAVE: u64 = 0xB2_9910;
/// `onion` (v2, 10-byte hash)
pub const CODEC_ONION_LEGACY: u64 = 0x1BC;
/// `onion3` (v3, 35-byte payload)
pub const CODEC_ONION: u64 = 0x1BD;
/// Data URL: `varint(mime.len) || mime || data`
pub const CODEC_DATA_URL: u64 = 0x12345;
/// Generic URL: UTF-8 bytes of the URL
pub const CODEC_GENERIC_URL: u64 = 0x12346;

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVER SELECTORS
// ═══════════════════════════════════════════════════════════════════════════════

/// `text(bytes32,string)`
pub const SEL_TEXT: u32 = 0x59d1_d43c;
/// `addr(bytes32,uint256)`
pub const SEL_ADDR: u32 = 0xf1cb_7e06;
/// `addr(bytes32)` (legacy ETH address)
pub const SEL_ADDR0: u32 = 0x3b3b_57de;
/// `contenthash(bytes32)`
pub const SEL_CONTENTHASH: u32 = 0xbc1c_58d1;
/// `pubkey(bytes32)`
pub const SEL_PUBKEY: u32 = 0xc869_0233;
/// `name(bytes32)`
pub const SEL_NAME: u32 = 0x691f_3431;

/// `setText(bytes32,string,string)`
pub const SEL_SET_TEXT: u32 = 0x10f1_3a8c;
/// `setAddr(bytes32,uint256,bytes)`
pub const SEL_SET_ADDR: u32 = 0x8b95_dd71;
/// `setContenthash(bytes32,bytes)`
pub const SEL_SET_CONTENTHASH: u32 = 0x304e_6ade;
/// `setPubkey(bytes32,bytes32,bytes32)`
pub const SEL_SET_PUBKEY: u32 = 0x29cd_62ea;
/// `setName(bytes32,string)`
pub const SEL_SET_NAME: u32 = 0x7737_2213;

// ═══════════════════════════════════════════════════════════════════════════════
// SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// ABI word size.
pub const WORD_SIZE: usize = 32;

/// Size of a selector in a call payload.
pub const SELECTOR_SIZE: usize = 4;

/// Size of keccak256 / sha3-256 output.
pub const HASH_SIZE: usize = 32;

/// Size of an Ethereum address.
pub const ETH_ADDRESS_SIZE: usize = 20;

/// Size of an uncompressed secp256k1 public key without the `0x04` tag.
pub const PUBKEY_SIZE: usize = 64;

/// Maximum length of one DNS wire label.
pub const DNS_MAX_LABEL: usize = 255;
