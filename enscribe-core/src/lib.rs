//! # enscribe Core
//!
//! Core errors, constants, and traits for the enscribe ENS record store.
//!
//! This crate provides the foundational building blocks used by all other enscribe crates:
//!
//! - **Errors**: One error taxonomy with context-carrying wrappers
//! - **Constants**: Coin types, content-hash codecs, resolver selectors
//! - **Bytes**: Strict hex / byte / numeric coercion
//! - **Traits**: Seams for the external coin codec table and label normalizer
//!
//! ## Example
//!
//! ```rust
//! use enscribe_core::bytes::{bytes_from_phex, phex_from_bytes};
//!
//! let v = bytes_from_phex("0xdeadbeef").unwrap();
//! assert_eq!(phex_from_bytes(&v), "0xdeadbeef");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod bytes;
pub mod constants;
pub mod error;
pub mod traits;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{EnscribeError, Result};
pub use traits::*;
