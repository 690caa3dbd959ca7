//! Bundled coin table.
//!
//! Name and codec per SLIP-44 coin type, or per ENSIP-11 EVM coin type
//! (`chain | 0x80000000`). This is the registry the [`Coin`](crate::Coin)
//! cache is populated from.

use enscribe_core::traits::AddressCodec;

use crate::codecs::{Base58Codec, UtxoCodec, EVM_CHECKSUM};

/// One entry of the coin table.
pub struct CoinSpec {
    /// Coin type.
    pub coin_type: u64,
    /// Short lookup name.
    pub name: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Address codec as published.
    pub codec: &'static dyn AddressCodec,
    /// Codec is the strict EIP-55 codec.
    pub evm: bool,
}

const fn evm(chain: u64, name: &'static str, title: &'static str) -> CoinSpec {
    CoinSpec {
        coin_type: chain | 0x8000_0000,
        name,
        title,
        codec: &EVM_CHECKSUM,
        evm: true,
    }
}

/// Every named coin.
pub static COIN_TABLE: &[CoinSpec] = &[
    CoinSpec {
        coin_type: 0,
        name: "btc",
        title: "Bitcoin",
        codec: &UtxoCodec { hrp: Some("bc"), p2pkh: &[0x00], p2sh: &[0x05] },
        evm: false,
    },
    CoinSpec {
        coin_type: 2,
        name: "ltc",
        title: "Litecoin",
        codec: &UtxoCodec { hrp: Some("ltc"), p2pkh: &[0x30], p2sh: &[0x32, 0x05] },
        evm: false,
    },
    CoinSpec {
        coin_type: 3,
        name: "doge",
        title: "Dogecoin",
        codec: &UtxoCodec { hrp: None, p2pkh: &[0x1e], p2sh: &[0x16] },
        evm: false,
    },
    CoinSpec {
        coin_type: 60,
        name: "eth",
        title: "Ethereum",
        codec: &EVM_CHECKSUM,
        evm: true,
    },
    CoinSpec {
        coin_type: 61,
        name: "etcLegacy",
        title: "[LEGACY] Ethereum Classic",
        codec: &EVM_CHECKSUM,
        evm: true,
    },
    CoinSpec {
        coin_type: 501,
        name: "sol",
        title: "Solana",
        codec: &Base58Codec { len: 32 },
        evm: false,
    },
    evm(10, "op", "Optimism"),
    evm(56, "bsc", "BNB Smart Chain"),
    evm(61, "etc", "Ethereum Classic"),
    evm(100, "gno", "Gnosis"),
    evm(137, "matic", "Polygon"),
    evm(8453, "base", "Base"),
    evm(42161, "arb1", "Arbitrum One"),
    evm(43114, "avaxc", "Avalanche C-Chain"),
];

/// Looks up a table entry by coin type.
pub fn spec_by_type(coin_type: u64) -> Option<&'static CoinSpec> {
    COIN_TABLE.iter().find(|spec| spec.coin_type == coin_type)
}

/// Looks up a table entry by name, ignoring ASCII case (`etcLegacy` == `etclegacy`).
pub fn spec_by_name(name: &str) -> Option<&'static CoinSpec> {
    COIN_TABLE
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}
