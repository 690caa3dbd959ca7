//! Coin resolution.
//!
//! A [`Coin`] is a network identifier plus its address codec. Coins resolve
//! into three kinds:
//!
//! - **Named**: present in the coin table
//! - **Unnamed EVM**: an ENSIP-11 chain type (`chain | 0x80000000`) missing from
//!   the table, named `chain:<id>`
//! - **Unknown**: no codec at all, named `#<type>`; parsing always fails
//!
//! # Registry
//!
//! Named and unnamed EVM coins are memoized in a process-wide registry keyed
//! by coin type. Entries are inserted lazily on first resolution. Unknown
//! coins are rebuilt on every call since their type space is unbounded. The first call to
//! [`Coin::count`] or [`Coin::all`] populates the registry with the whole
//! table exactly once; after that the registry is only read.

use std::collections::HashMap;
use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use enscribe_core::bytes::{parse_uint, phex_from_bytes};
use enscribe_core::constants::{
    COIN_TYPE_ETH, COIN_TYPE_EVM_MSB, ETH_CHAIN_ID, PREFIX_CHAIN, PREFIX_UNKNOWN_COIN,
};
use enscribe_core::error::{EnscribeError, Result};
use enscribe_core::traits::AddressCodec;

use crate::codecs::EVM_LENIENT;
use crate::table::{spec_by_name, spec_by_type, COIN_TABLE};

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

struct CoinRegistry {
    coins: RwLock<HashMap<BigUint, Coin>>,
    populated: OnceCell<()>,
}

impl CoinRegistry {
    fn new() -> Self {
        Self {
            coins: RwLock::new(HashMap::with_capacity(COIN_TABLE.len())),
            populated: OnceCell::new(),
        }
    }

    #[instrument(skip_all)]
    fn populate(&self) {
        self.populated.get_or_init(|| {
            let mut coins = self.coins.write();
            for spec in COIN_TABLE {
                let coin_type = BigUint::from(spec.coin_type);
                coins
                    .entry(coin_type.clone())
                    .or_insert_with(|| Coin::named(coin_type, spec.name, spec.title, spec.codec, spec.evm));
            }
            debug!(count = coins.len(), "Coin registry populated");
        });
    }
}

static REGISTRY: Lazy<CoinRegistry> = Lazy::new(CoinRegistry::new);

// ═══════════════════════════════════════════════════════════════════════════════
// COIN
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy)]
enum CoinKind {
    Named {
        name: &'static str,
        title: &'static str,
        codec: &'static dyn AddressCodec,
    },
    UnnamedEvm,
    Unknown,
}

/// A coin type with its address codec.
#[derive(Clone)]
pub struct Coin {
    coin_type: BigUint,
    kind: CoinKind,
}

/// Anything a coin can be resolved from.
#[derive(Clone, Debug)]
pub enum CoinQuery {
    /// An already resolved coin.
    Coin(Coin),
    /// A numeric coin type.
    Type(BigUint),
    /// A coin name, `chain:<id>` or `#<type>`.
    Name(String),
    /// An EVM chain id.
    Chain(u64),
}

impl Coin {
    fn named(
        coin_type: BigUint,
        name: &'static str,
        title: &'static str,
        codec: &'static dyn AddressCodec,
        evm: bool,
    ) -> Self {
        // ENS data often carries lowercase EVM addresses
        let codec: &'static dyn AddressCodec = if evm { &EVM_LENIENT } else { codec };
        Self {
            coin_type,
            kind: CoinKind::Named { name, title, codec },
        }
    }

    /// Returns the Ethereum coin.
    pub fn eth() -> Coin {
        Self::from_type(BigUint::from(COIN_TYPE_ETH))
    }

    /// Resolves a coin by numeric type.
    ///
    /// Types that do not fit the table's integer range are unknown, not errors.
    pub fn from_type(coin_type: impl Into<BigUint>) -> Coin {
        let coin_type = coin_type.into();
        if let Some(coin) = REGISTRY.coins.read().get(&coin_type) {
            return coin.clone();
        }

        let small = u64::try_from(&coin_type).ok();
        let coin = if let Some(spec) = small.and_then(spec_by_type) {
            Coin::named(coin_type.clone(), spec.name, spec.title, spec.codec, spec.evm)
        } else if small.map_or(false, |t| t & COIN_TYPE_EVM_MSB != 0 && t <= u64::from(u32::MAX)) {
            Coin {
                coin_type: coin_type.clone(),
                kind: CoinKind::UnnamedEvm,
            }
        } else {
            return Coin {
                coin_type,
                kind: CoinKind::Unknown,
            };
        };
        REGISTRY
            .coins
            .write()
            .entry(coin_type)
            .or_insert(coin)
            .clone()
    }

    /// Resolves a coin by name.
    ///
    /// `chain:<id>` maps to `id | 0x80000000` (ids must be below 2^31), `#<n>`
    /// maps to type `n`, and any other name is looked up in the table ignoring case.
    pub fn from_name(name: &str) -> Result<Coin> {
        if let Some(chain) = name.strip_prefix(PREFIX_CHAIN) {
            let msb = BigUint::from(COIN_TYPE_EVM_MSB);
            let chain = parse_uint(chain)
                .ok()
                .filter(|chain| *chain < msb)
                .ok_or_else(|| EnscribeError::UnknownCoin(name.into()))?;
            return Ok(Self::from_type(chain + msb));
        }
        if let Some(coin_type) = name.strip_prefix(PREFIX_UNKNOWN_COIN) {
            let coin_type = parse_uint(coin_type).map_err(|_| EnscribeError::UnknownCoin(name.into()))?;
            return Ok(Self::from_type(coin_type));
        }
        let spec = spec_by_name(name).ok_or_else(|| EnscribeError::UnknownCoin(name.into()))?;
        Ok(Self::from_type(spec.coin_type))
    }

    /// Resolves a coin by EVM chain id. Chain 1 is Ethereum (type 60).
    pub fn from_chain(chain: u64) -> Coin {
        if chain == ETH_CHAIN_ID {
            Self::eth()
        } else {
            Self::from_type(BigUint::from(chain) + BigUint::from(COIN_TYPE_EVM_MSB))
        }
    }

    /// Resolves any [`CoinQuery`].
    pub fn from_query(query: impl Into<CoinQuery>) -> Result<Coin> {
        match query.into() {
            CoinQuery::Coin(coin) => Ok(coin),
            CoinQuery::Type(coin_type) => Ok(Self::from_type(coin_type)),
            CoinQuery::Name(name) => Self::from_name(&name),
            CoinQuery::Chain(chain) => Ok(Self::from_chain(chain)),
        }
    }

    /// Resolves a query to its numeric coin type.
    pub fn type_of(query: impl Into<CoinQuery>) -> Result<BigUint> {
        Ok(Self::from_query(query)?.coin_type)
    }

    /// Resolves a coin from JSON: a type number, a name string, or an object
    /// with `type`, `name` or `chain` (checked in that order).
    pub fn from_value(value: &Value) -> Result<Coin> {
        let as_type = |v: &Value| -> Result<BigUint> {
            match v {
                Value::Number(n) => n
                    .as_u64()
                    .map(BigUint::from)
                    .ok_or_else(|| EnscribeError::Format(format!("invalid coin type: {n}"))),
                Value::String(s) => parse_uint(s),
                other => Err(EnscribeError::Format(format!("invalid coin type: {other}"))),
            }
        };
        match value {
            Value::Number(_) => Ok(Self::from_type(as_type(value)?)),
            Value::String(name) => Self::from_name(name),
            Value::Object(obj) => {
                if let Some(coin_type) = obj.get("type") {
                    Ok(Self::from_type(as_type(coin_type)?))
                } else if let Some(name) = obj.get("name").and_then(Value::as_str) {
                    Self::from_name(name)
                } else if let Some(chain) = obj.get("chain").and_then(Value::as_u64) {
                    Ok(Self::from_chain(chain))
                } else {
                    Err(EnscribeError::UnknownCoin(value.to_string()))
                }
            }
            other => Err(EnscribeError::UnknownCoin(other.to_string())),
        }
    }

    /// Number of named coins. Populates the registry on first use.
    pub fn count() -> usize {
        REGISTRY.populate();
        REGISTRY.coins.read().values().filter(|c| matches!(c.kind, CoinKind::Named { .. })).count()
    }

    /// Every named coin ordered by type. Populates the registry on first use.
    pub fn all() -> Vec<Coin> {
        REGISTRY.populate();
        let mut coins: Vec<Coin> = REGISTRY
            .coins
            .read()
            .values()
            .filter(|c| matches!(c.kind, CoinKind::Named { .. }))
            .cloned()
            .collect();
        coins.sort_by(|a, b| a.coin_type.cmp(&b.coin_type));
        coins
    }

    /// The numeric coin type.
    pub fn coin_type(&self) -> &BigUint {
        &self.coin_type
    }

    /// The EVM chain id, if this coin is an EVM chain.
    pub fn chain(&self) -> Option<u64> {
        let msb = BigUint::from(COIN_TYPE_EVM_MSB);
        if self.coin_type == BigUint::from(COIN_TYPE_ETH) {
            Some(ETH_CHAIN_ID)
        } else if !(&self.coin_type & &msb).is_zero() {
            u64::try_from(&(&self.coin_type - &msb)).ok()
        } else {
            None
        }
    }

    /// The lookup name: table name, `chain:<id>`, or `#<type>`.
    pub fn name(&self) -> String {
        match self.kind {
            CoinKind::Named { name, .. } => name.to_string(),
            CoinKind::UnnamedEvm => format!("{PREFIX_CHAIN}{}", self.chain().unwrap_or_default()),
            CoinKind::Unknown => format!("{PREFIX_UNKNOWN_COIN}{}", self.coin_type),
        }
    }

    /// The display title.
    pub fn title(&self) -> &'static str {
        match self.kind {
            CoinKind::Named { title, .. } => title,
            CoinKind::UnnamedEvm => "Unknown Chain",
            CoinKind::Unknown => "Unknown Coin",
        }
    }

    /// Returns true if the coin is not in the table.
    pub fn is_unnamed(&self) -> bool {
        !matches!(self.kind, CoinKind::Named { .. })
    }

    /// Returns true if the coin has no codec.
    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, CoinKind::Unknown)
    }

    fn codec(&self) -> Option<&'static dyn AddressCodec> {
        match self.kind {
            CoinKind::Named { codec, .. } => Some(codec),
            CoinKind::UnnamedEvm => Some(&EVM_LENIENT),
            CoinKind::Unknown => None,
        }
    }

    /// Decodes a human-readable address into canonical bytes.
    pub fn parse(&self, s: &str) -> Result<Vec<u8>> {
        match self.codec() {
            Some(codec) => codec.parse(s),
            None => Err(EnscribeError::UnsupportedCoin {
                coin: self.name(),
                reason: "no address parser".into(),
            }),
        }
    }

    /// Encodes canonical bytes into the human-readable address.
    ///
    /// Unknown coins render a bracketed hex literal such as `[0x1234]`.
    pub fn format(&self, v: &[u8]) -> Result<String> {
        match self.codec() {
            Some(codec) => codec.format(v),
            None => Ok(format!("[{}]", phex_from_bytes(v))),
        }
    }

    /// Checks that `parse(format(v)) == v`. Unknown coins only require non-empty bytes.
    pub fn assert_valid(&self, v: &[u8]) -> Result<()> {
        if self.is_unknown() {
            if v.is_empty() {
                return Err(EnscribeError::Roundtrip {
                    coin: self.name(),
                    bytes: phex_from_bytes(v),
                });
            }
            return Ok(());
        }
        let formatted = self.format(v)?;
        let parsed = self.parse(&formatted)?;
        if parsed != v {
            return Err(EnscribeError::Roundtrip {
                coin: self.name(),
                bytes: phex_from_bytes(v),
            });
        }
        Ok(())
    }

    /// JSON description: `{type, name, title, chain}`.
    pub fn to_object(&self) -> Value {
        let coin_type = match u64::try_from(&self.coin_type) {
            Ok(n) => json!(n),
            Err(_) => json!(self.coin_type.to_string()),
        };
        if self.is_unknown() {
            return json!({ "type": coin_type, "title": self.title() });
        }
        let mut obj = json!({
            "type": coin_type,
            "name": self.name(),
            "title": self.title(),
        });
        if let Some(chain) = self.chain() {
            obj["chain"] = json!(chain);
        }
        obj
    }
}

impl PartialEq for Coin {
    fn eq(&self, other: &Self) -> bool {
        self.coin_type == other.coin_type
    }
}

impl Eq for Coin {}

impl fmt::Debug for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coin({}, {})", self.coin_type, self.name())
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<Coin> for CoinQuery {
    fn from(coin: Coin) -> Self {
        CoinQuery::Coin(coin)
    }
}

impl From<&Coin> for CoinQuery {
    fn from(coin: &Coin) -> Self {
        CoinQuery::Coin(coin.clone())
    }
}

impl From<u32> for CoinQuery {
    fn from(coin_type: u32) -> Self {
        CoinQuery::Type(coin_type.into())
    }
}

impl From<u64> for CoinQuery {
    fn from(coin_type: u64) -> Self {
        CoinQuery::Type(coin_type.into())
    }
}

impl From<BigUint> for CoinQuery {
    fn from(coin_type: BigUint) -> Self {
        CoinQuery::Type(coin_type)
    }
}

impl From<&BigUint> for CoinQuery {
    fn from(coin_type: &BigUint) -> Self {
        CoinQuery::Type(coin_type.clone())
    }
}

impl From<&str> for CoinQuery {
    fn from(name: &str) -> Self {
        CoinQuery::Name(name.into())
    }
}

impl From<String> for CoinQuery {
    fn from(name: String) -> Self {
        CoinQuery::Name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("btc", 0)]
    #[test_case("eth", 60)]
    #[test_case("ETH", 60)]
    #[test_case("doge", 3)]
    #[test_case("etcLegacy", 61)]
    #[test_case("etclegacy", 61)]
    #[test_case("op", 0x8000_000a)]
    #[test_case("chain:2", 0x8000_0002)]
    #[test_case("#69420", 69420)]
    fn test_from_name(name: &str, coin_type: u64) {
        assert_eq!(Coin::from_name(name).unwrap().coin_type(), &BigUint::from(coin_type));
    }

    #[test]
    fn test_from_name_unknown() {
        assert!(matches!(Coin::from_name("chonk"), Err(EnscribeError::UnknownCoin(_))));
        assert!(Coin::from_name("chain:x").is_err());
    }

    #[test_case("chain:2147483648"; "msb set")]
    #[test_case("chain:4294967295"; "u32 max")]
    #[test_case("chain:18446744073709551615"; "u64 max")]
    fn test_from_name_chain_out_of_range(name: &str) {
        assert!(matches!(Coin::from_name(name), Err(EnscribeError::UnknownCoin(_))));
    }

    #[test]
    fn test_unnamed_evm_memoized() {
        let coin = Coin::from_chain(0x7fff_fabc);
        assert!(coin.is_unnamed());
        assert!(REGISTRY.coins.read().contains_key(coin.coin_type()));
        assert_eq!(Coin::from_name(&coin.name()).unwrap(), coin);
        assert!(Coin::from_name("chain:2147483647").unwrap().is_unnamed());

        let unknown = Coin::from_type(0x1234_5678_9abc_u64);
        assert!(unknown.is_unknown());
        assert!(!REGISTRY.coins.read().contains_key(unknown.coin_type()));
        assert_eq!(Coin::from_name(&unknown.name()).unwrap(), unknown);

        assert!(Coin::all().iter().all(|c| !c.is_unnamed()));
    }

    #[test]
    fn test_from_type_named() {
        let eth = Coin::from_type(60u64);
        assert_eq!(eth.name(), "eth");
        assert_eq!(eth.title(), "Ethereum");
        assert_eq!(eth.chain(), Some(1));
        assert!(!eth.is_unnamed());
    }

    #[test]
    fn test_from_chain() {
        assert_eq!(Coin::from_chain(1), Coin::eth());
        let coin = Coin::from_chain(2);
        assert_eq!(coin.coin_type(), &BigUint::from(0x8000_0002u64));
        assert_eq!(coin.name(), "chain:2");
        assert_eq!(coin.title(), "Unknown Chain");
        assert!(coin.is_unnamed());
        assert_eq!(Coin::from_chain(10).name(), "op");
    }

    #[test]
    fn test_unknown_coin() {
        let coin = Coin::from_type(69420u64);
        assert!(coin.is_unknown());
        assert_eq!(coin.name(), "#69420");
        assert_eq!(coin.chain(), None);
        assert_eq!(coin.format(&[0x12, 0x34]).unwrap(), "[0x1234]");
        assert!(matches!(coin.parse("anything"), Err(EnscribeError::UnsupportedCoin { .. })));
        assert!(coin.assert_valid(&[1]).is_ok());
        assert!(coin.assert_valid(&[]).is_err());
    }

    #[test]
    fn test_huge_type_is_unknown() {
        let huge = BigUint::from(u64::MAX) * BigUint::from(1000u32);
        let coin = Coin::from_type(huge.clone());
        assert!(coin.is_unknown());
        assert_eq!(coin.coin_type(), &huge);
        assert_eq!(coin.to_object()["type"], json!(huge.to_string()));
    }

    #[test]
    fn test_from_query_and_value() {
        assert_eq!(Coin::from_query("eth").unwrap(), Coin::eth());
        assert_eq!(Coin::from_query(60u32).unwrap(), Coin::eth());
        assert_eq!(Coin::from_query(&Coin::eth()).unwrap(), Coin::eth());
        assert_eq!(Coin::type_of("op").unwrap(), BigUint::from(0x8000_000au64));
        assert_eq!(Coin::from_value(&json!({"type": 60})).unwrap(), Coin::eth());
        assert_eq!(Coin::from_value(&json!({"name": "eth"})).unwrap(), Coin::eth());
        assert_eq!(Coin::from_value(&json!({"chain": 1})).unwrap(), Coin::eth());
        assert_eq!(Coin::from_value(&json!(0)).unwrap().name(), "btc");
        assert!(Coin::from_value(&json!({})).is_err());
    }

    #[test]
    fn test_eth_parse_lenient() {
        let eth = Coin::eth();
        let address = "0x51050ec063d393217B436747617aD1C2285Aeeee";
        let bytes = eth.parse(address).unwrap();
        assert_eq!(eth.parse(&address.to_lowercase()).unwrap(), bytes);
        assert_eq!(eth.parse(&format!("0x{}", address[2..].to_uppercase())).unwrap(), bytes);
        assert_eq!(eth.format(&bytes).unwrap(), address);
    }

    #[test]
    fn test_assert_valid() {
        let eth = Coin::eth();
        assert!(eth.assert_valid(&[0u8; 20]).is_ok());
        for len in [0, 19, 21] {
            assert!(eth.assert_valid(&vec![0u8; len]).is_err());
        }
        let btc = Coin::from_name("btc").unwrap();
        assert!(btc.assert_valid(&[]).is_err());
        assert!(btc.assert_valid(&[0u8; 5]).is_err());
    }

    #[test]
    fn test_registry_enumeration() {
        let count = Coin::count();
        assert_eq!(count, COIN_TABLE.len());
        let all = Coin::all();
        assert_eq!(all.len(), count);
        assert!(all.windows(2).all(|w| w[0].coin_type() < w[1].coin_type()));
    }

    #[test]
    fn test_to_object() {
        let obj = Coin::eth().to_object();
        assert_eq!(obj["type"], json!(60));
        assert_eq!(obj["name"], json!("eth"));
        assert_eq!(obj["chain"], json!(1));
        assert!(Coin::from_name("btc").unwrap().to_object().get("chain").is_none());
    }
}
