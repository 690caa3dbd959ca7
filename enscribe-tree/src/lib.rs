//! # enscribe Tree
//!
//! A trie of normalized labels where any node may own a [`Record`](enscribe_record::Record).
//!
//! `"a.b.c"` means node `a` under `b` under `c` under the root, so names are
//! walked right to left.
//!
//! ## Example
//!
//! ```rust
//! use enscribe_tree::Node;
//! use serde_json::json;
//!
//! let root = Node::new_root(None);
//! root.import(&json!({
//!     "eth": {
//!         "raffy": { "avatar": "https://raffy.xyz/avatar.png" },
//!     },
//! })).unwrap();
//!
//! let raffy = root.find("raffy.eth").unwrap();
//! assert_eq!(raffy.depth(), 2);
//! assert_eq!(raffy.namehash(), enscribe_crypto::namehash("raffy.eth"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod node;

pub use node::Node;
