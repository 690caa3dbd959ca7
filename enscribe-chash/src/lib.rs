//! # enscribe Content Hash
//!
//! Self-describing pointers to off-chain content: `varint(codec) || payload`.
//!
//! | Protocol    | Codec      | Hash form                  |
//! |-------------|------------|----------------------------|
//! | IPFS        | `0xE3`     | CID (`ipfs://`)            |
//! | Swarm       | `0xE4`     | CID (`bzz://`)             |
//! | IPNS        | `0xE5`     | CID (`ipns://`)            |
//! | Arweave     | `0xB29910` | base64url (`ar://`)        |
//! | Onion (v2)  | `0x1BC`    | base32, 16 chars           |
//! | Onion (v3)  | `0x1BD`    | base32, 56 chars, checksum |
//! | DataURL     | `0x12345`  | `data:` URL                |
//! | URL         | `0x12346`  | the URL itself             |
//!
//! ## Example
//!
//! ```rust
//! use enscribe_chash::{ContentHash, Protocol};
//!
//! let ch = ContentHash::from_url("ar://yBYkngZXGCQgYU-nUCwo5vns2ALUU0LXXZrCUlUUWkk").unwrap();
//! assert_eq!(ch.protocol(), Protocol::Arweave);
//! assert_eq!(ch.to_gateway_url().unwrap(), "https://arweave.net/yBYkngZXGCQgYU-nUCwo5vns2ALUU0LXXZrCUlUUWkk");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod chash;
pub mod datauri;
pub mod protocol;

pub use chash::ContentHash;
pub use datauri::{ShortKey, SHORT_KEYS};
pub use protocol::{split_url, Protocol, UrlParts};
