#![deny(missing_docs, unsafe_code, deprecated_in_future)]

//! An ordered, thread-safe, in-memory multi-map over an adaptive radix
//! tree.
//!
//! Keys are order-preserving byte strings built by the [`Key`]
//! constructors; each key maps to a deduplicated [`ValueSet`] of values.
//! The [`MultiMap`] supports point operations and range queries over the
//! bytewise key ordering, backed by a trie whose nodes adapt among seven
//! capacity classes with cache-line-conscious layouts.
//!
//! # Examples
//!
//! ```rust
//! use artmap::{Key, MultiMap};
//!
//! let map = MultiMap::new();
//! map.add_value(&Key::from_i64(-3), "minus three");
//! map.add_value(&Key::from_i64(0), "zero");
//! map.add_value(&Key::from_u64(2), "two");
//!
//! // Integer keys order numerically across signedness and width.
//! let non_negative = map.values_from_inclusive(&Key::from_i64(0));
//! assert!(non_negative.contains(&"zero"));
//! assert!(non_negative.contains(&"two"));
//! assert!(!non_negative.contains(&"minus three"));
//! ```
//!
//! # References
//!
//!  - Leis, V., Kemper, A., & Neumann, T. (2013, April). The adaptive radix
//!    tree: ARTful indexing for main-memory databases. In 2013 IEEE 29th
//!    International Conference on Data Engineering (ICDE) (pp. 38-49). IEEE.
//!    [Link to PDF][ART paper]
//!
//! [ART paper]: https://www-db.in.tum.de/~leis/papers/ART.pdf

mod key;
mod map;
mod nodes;
#[cfg(test)]
mod proptests;
mod set;

pub use key::Key;
pub use map::MultiMap;
pub use set::ValueSet;
