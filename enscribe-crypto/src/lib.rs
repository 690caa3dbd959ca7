//! # enscribe Cryptography
//!
//! Hash primitives and name hashing for the enscribe record store.
//!
//! This crate provides:
//!
//! - **Hash**: Keccak-256 and SHA3-256
//! - **Name**: ENS namehash, labelhash, DNS wire encoding
//! - **Normalize**: The default label normalizer
//!
//! ## Example
//!
//! ```rust
//! use enscribe_crypto::{labelhash, namehash};
//!
//! let eth = namehash("eth");
//! assert_eq!(namehash("raffy.eth"), enscribe_crypto::name::child_namehash(&eth, &labelhash("raffy")));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod hash;
pub mod name;
pub mod normalize;

// Re-export main functions at crate root
pub use hash::{keccak256, sha3_256};
pub use name::{dns_encode, labelhash, namehash, namehash_labels, namesplit};
pub use normalize::BasicNormalizer;
