//! Key arguments accepted by the table and their normalization

use std::{any::type_name, borrow::Cow, rc::Rc, sync::Arc};

use crate::TableError;

/// A value that can be passed as a key to [`HashTable`](crate::HashTable) operations.
///
/// Text types yield their contents, `Option::None` stands for an absent key, and the non-text
/// primitives are rejected with [`TableError::InvalidKeyType`].
pub trait TableKey {
    /// Returns the raw key text, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidKeyType`] if the key is not text.
    fn key_text(&self) -> Result<Option<&str>, TableError>;
}

impl TableKey for str {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        Ok(Some(self))
    }
}

impl TableKey for String {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        Ok(Some(self.as_str()))
    }
}

impl TableKey for Cow<'_, str> {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        Ok(Some(&**self))
    }
}

impl TableKey for Box<str> {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        Ok(Some(&**self))
    }
}

impl TableKey for Rc<str> {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        Ok(Some(&**self))
    }
}

impl TableKey for Arc<str> {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        Ok(Some(&**self))
    }
}

impl<T: TableKey + ?Sized> TableKey for &T {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        (**self).key_text()
    }
}

impl<T: TableKey> TableKey for Option<T> {
    fn key_text(&self) -> Result<Option<&str>, TableError> {
        self.as_ref().map_or(Ok(None), TableKey::key_text)
    }
}

/// Implements [`TableKey`] for types that are never valid keys
macro_rules! reject_non_text_keys {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TableKey for $ty {
                fn key_text(&self) -> Result<Option<&str>, TableError> {
                    Err(TableError::InvalidKeyType { found: type_name::<$ty>() })
                }
            }
        )*
    };
}

reject_non_text_keys!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, (),
);

/// Trims surrounding whitespace; an empty result is not hashable.
#[must_use]
pub fn normalize(key: &str) -> Option<&str> {
    let key = key.trim();
    if key.is_empty() { None } else { Some(key) }
}

/// Extracts and normalizes the text of `key`.
///
/// `Ok(None)` means the key is absent or empty and the caller should treat it as a miss.
pub(crate) fn resolve<K: TableKey + ?Sized>(key: &K) -> Result<Option<&str>, TableError> {
    Ok(key.key_text()?.and_then(normalize))
}
