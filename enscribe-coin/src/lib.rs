//! # enscribe Coins
//!
//! Coin registry and address codecs for the enscribe record store.
//!
//! This crate provides:
//!
//! - **Coin**: Resolution by type, name, or EVM chain id with a memoized registry
//! - **Address**: Coin-tagged canonical bytes with their human form
//! - **Codecs**: EIP-55, Base58Check/segwit, and Base58 address codecs
//!
//! ## Example
//!
//! ```rust
//! use enscribe_coin::{Address, Coin};
//!
//! let coin = Coin::from_chain(10);
//! assert_eq!(coin.name(), "op");
//!
//! let a = Address::eth("0x51050ec063d393217b436747617ad1c2285aeeee").unwrap();
//! assert_eq!(a.to_string(), "0x51050ec063d393217B436747617aD1C2285Aeeee");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod address;
pub mod codecs;
pub mod coin;
pub mod table;

pub use address::Address;
pub use codecs::to_checksum_address;
pub use coin::{Coin, CoinQuery};
