//! # enscribe Record
//!
//! Resolver records and the call payloads that read and write them.
//!
//! - [`Record`]: texts, coin addresses, content hash, pubkey and name
//! - [`Profile`]: which fields to fetch, as getter calls
//! - [`Record::parse_call`] / [`Record::make_setters`]: ABI answers in, setters out
//!
//! ## Example
//!
//! ```rust
//! use enscribe_record::{Profile, Record, SetterOptions};
//! use serde_json::json;
//!
//! let record = Record::from_json(&json!({
//!     "avatar": "https://example.com/a.png",
//!     "$eth": "0x51050ec063d393217B436747617aD1C2285Aeeee",
//! })).unwrap();
//!
//! let node = enscribe_crypto::namehash("raffy.eth");
//! let setters = record.make_setters(&SetterOptions::new(node)).unwrap();
//! assert_eq!(setters.len(), 2);
//!
//! let getters = Profile::from_record(&record).make_getters(&node).unwrap();
//! assert_eq!(getters.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod abi;
pub mod calls;
pub mod key;
pub mod profile;
pub mod pubkey;
pub mod record;

pub use abi::{encode_call, AbiArg};
pub use calls::SetterOptions;
pub use key::RecordKey;
pub use profile::Profile;
pub use pubkey::Pubkey;
pub use record::{ImportOutcome, Record};
