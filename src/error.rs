//! Error type shared by every keyed `HashTable` operation

use thiserror::Error;

/// Failures reported by the hash table.
///
/// Keys that are empty or absent are not errors; they are treated as a guaranteed miss.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The key passed to an operation was not text
    #[error("key: expected text but received '{found}'")]
    InvalidKeyType {
        /// Rust type name of the rejected key
        found: &'static str,
    },
}
