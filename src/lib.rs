//! # Chain Map
//!
//! A string-keyed hash table with separate chaining and automatic capacity management.
//!
//! Keys are hashed with a 53-bit two-lane mix and reduced modulo the bucket count. Keys that
//! collide share a bucket and are kept in a singly linked [`Chain`]. The bucket array starts at
//! [`MIN_SIZE`] buckets, doubles when three quarters of the buckets are occupied and halves again
//! as buckets empty out, rehashing every entry on each resize.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chainmap::HashTable;
//!
//! // Create a new table
//! let mut table = HashTable::new();
//!
//! // Insert values, keys are trimmed
//! table.set("apple", 1)?;
//! table.set("  banana ", 2)?;
//!
//! // Retrieve values
//! assert_eq!(table.get("banana")?.map(|entry| *entry.value()), Some(2));
//!
//! // Update values
//! table.set("apple", 10)?;
//! assert_eq!(table.get("apple")?.map(|entry| *entry.value()), Some(10));
//! assert_eq!(table.len(), 2);
//!
//! // Remove values
//! assert!(table.remove("apple")?);
//! assert!(!table.has("apple")?);
//! # Ok::<(), chainmap::TableError>(())
//! ```
//!
//! ## Keys
//!
//! Any [`TableKey`] can be passed as a key. Empty or absent keys are never stored and always miss,
//! while non-text keys are rejected:
//!
//! ```rust
//! use chainmap::{HashTable, TableError};
//!
//! let mut table = HashTable::new();
//! table.set("", "ignored")?;
//! assert!(table.is_empty());
//!
//! assert_eq!(table.set(&42, "x"), Err(TableError::InvalidKeyType { found: "i32" }));
//! # Ok::<(), TableError>(())
//! ```

/// Module implementing the singly linked chain stored in each bucket
mod chain;
/// Module defining the error type of table operations
mod error;
/// Module implementing the key hash and its bucket mapping
mod hash;
/// Module implementing the separate-chaining hash table
mod hash_table;
/// Module defining which values can be used as keys
mod key;

pub use chain::{Chain, ChainIntoIter, ChainIter, Entry};
pub use error::TableError;
pub use hash::{bucket_index, cyrb53};
pub use hash_table::{HashTable, Iter, LOAD_FACTOR, MIN_SIZE};
pub use key::{TableKey, normalize};
