use std::{iter, mem, slice};

use log::{debug, trace};

use crate::{
    TableError,
    chain::{Chain, ChainIter, Entry},
    hash::bucket_index,
    key::{TableKey, normalize, resolve},
};

/// Initial and smallest number of buckets
pub const MIN_SIZE: usize = 16;

/// Ratio of occupied buckets to bucket count at which the table grows
pub const LOAD_FACTOR: f64 = 0.75;

/// A string-keyed hash table that resolves collisions with separate chaining.
///
/// Each bucket is either empty or owns a non-empty [`Chain`]. Keys are trimmed before use; empty
/// or absent keys are never stored and every lookup with them misses.
///
/// Capacity is driven by the number of occupied buckets rather than the number of entries: the
/// bucket array doubles once `occupied / buckets >= LOAD_FACTOR` and halves, never below
/// [`MIN_SIZE`], once `occupied / (buckets / 2) < LOAD_FACTOR`. Every resize rehashes all
/// entries into a fresh array.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct HashTable<V> {
    /// The bucket array, its length is always a power of two
    buckets: Vec<Option<Chain<V>>>,
    /// Number of buckets currently holding a chain
    occupied: usize,
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with [`MIN_SIZE`] buckets
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MIN_SIZE)
    }

    /// Creates an empty table with at least `capacity` buckets
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_SIZE).next_power_of_two();
        Self { buckets: empty_buckets(capacity), occupied: 0 }
    }

    /// Inserts `value` under `key`, overwriting the value of an existing entry in place.
    ///
    /// Empty or absent keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidKeyType`] if `key` is not text.
    pub fn set<K: TableKey + ?Sized>(&mut self, key: &K, value: V) -> Result<(), TableError> {
        let Some(key) = resolve(key)? else {
            trace!("ignoring set with a non-hashable key");
            return Ok(());
        };
        self.insert(key.to_owned(), value, false);
        Ok(())
    }

    /// Returns the entry stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidKeyType`] if `key` is not text.
    pub fn get<K: TableKey + ?Sized>(&self, key: &K) -> Result<Option<&Entry<V>>, TableError> {
        Ok(resolve(key)?.and_then(|key| self.chain_for(key)?.get(key)))
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidKeyType`] if `key` is not text.
    pub fn get_mut<K: TableKey + ?Sized>(&mut self, key: &K) -> Result<Option<&mut V>, TableError> {
        let Some(key) = resolve(key)? else {
            return Ok(None);
        };
        let index = self.index_of(key);
        Ok(self
            .buckets
            .get_mut(index)
            .and_then(Option::as_mut)
            .and_then(|chain| chain.get_mut(key))
            .map(Entry::value_mut))
    }

    /// Returns true if an entry is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidKeyType`] if `key` is not text.
    pub fn has<K: TableKey + ?Sized>(&self, key: &K) -> Result<bool, TableError> {
        let Some(key) = resolve(key)? else {
            return Ok(false);
        };
        Ok(self.chain_for(key).is_some_and(|chain| chain.contains(key)))
    }

    /// Removes the entry stored under `key`, returning whether one was removed.
    ///
    /// Emptying a bucket may shrink the table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidKeyType`] if `key` is not text.
    pub fn remove<K: TableKey + ?Sized>(&mut self, key: &K) -> Result<bool, TableError> {
        let Some(key) = resolve(key)? else {
            return Ok(false);
        };
        let index = self.index_of(key);
        let Some(slot) = self.buckets.get_mut(index) else {
            return Ok(false);
        };
        let Some(chain) = slot.as_mut() else {
            return Ok(false);
        };
        if !chain.find_and_remove(key) {
            return Ok(false);
        }

        if chain.is_empty() {
            *slot = None;
            self.occupied = self.occupied.saturating_sub(1);
            trace!("bucket {index} emptied, {} buckets occupied", self.occupied);
            self.check_shrink();
        }
        Ok(true)
    }

    /// Returns the number of stored entries, counted chain by chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().flatten().map(Chain::size).sum()
    }

    /// Returns true if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Removes every entry and resets the bucket array to [`MIN_SIZE`]
    pub fn clear(&mut self) {
        debug!("clearing table of {} buckets", self.buckets.len());
        self.buckets = empty_buckets(MIN_SIZE);
        self.occupied = 0;
    }

    /// Returns the keys in bucket order, then chain order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|entry| entry.key().to_owned()).collect()
    }

    /// Returns a copy of every stored value, in the same order as [`HashTable::keys`]
    #[must_use]
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns a copy of every stored entry, in the same order as [`HashTable::keys`]
    #[must_use]
    pub fn entries(&self) -> Vec<Entry<V>>
    where
        V: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Returns an iterator over the entries in bucket order, then chain order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { buckets: self.buckets.iter(), chain: None }
    }

    /// Returns the length of the bucket array
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of non-empty buckets
    #[must_use]
    pub fn occupied_buckets(&self) -> usize {
        self.occupied
    }

    /// Returns the ratio of occupied buckets to the bucket count
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.occupied_ratio(self.buckets.len())
    }

    /// Returns the chain length of every bucket, 0 for empty buckets
    #[must_use]
    pub fn chain_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(|slot| slot.as_ref().map_or(0, Chain::size)).collect()
    }

    /// Computes the bucket of a normalized key under the current array length
    fn index_of(&self, key: &str) -> usize {
        bucket_index(key, self.buckets.len())
    }

    /// Returns the chain of the bucket `key` maps to
    fn chain_for(&self, key: &str) -> Option<&Chain<V>> {
        self.buckets.get(self.index_of(key)).and_then(Option::as_ref)
    }

    /// Stores a normalized key.
    ///
    /// `resizing` is set while a resize re-inserts entries, so the capacity check does not run
    /// again in the middle of the rehash. The index is reduced modulo the bucket count, so the
    /// slot lookup always succeeds.
    fn insert(&mut self, key: String, value: V, resizing: bool) {
        let index = self.index_of(&key);
        let Some(slot) = self.buckets.get_mut(index) else {
            return;
        };

        let created = slot.is_none();
        if created {
            self.occupied = self.occupied.saturating_add(1);
            trace!("bucket {index} received its first entry");
        }

        let chain = slot.get_or_insert_with(Chain::new);
        if let Some(entry) = chain.get_mut(&key) {
            *entry.value_mut() = value;
            return;
        }
        chain.append(Entry::new(key, value));

        if created && !resizing {
            self.check_growth();
        }
    }

    /// Doubles the bucket array once enough buckets are occupied
    fn check_growth(&mut self) {
        let buckets_len = self.buckets.len();
        if self.occupied_ratio(buckets_len) >= LOAD_FACTOR {
            self.change_size(buckets_len.saturating_mul(2));
        }
    }

    /// Halves the bucket array once the occupied buckets would fit below the load factor
    fn check_shrink(&mut self) {
        let buckets_len = self.buckets.len();
        let half = buckets_len / 2;
        if buckets_len > MIN_SIZE && self.occupied_ratio(half) < LOAD_FACTOR {
            self.change_size(half);
        }
    }

    /// Ratio of occupied buckets to `slots`
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    fn occupied_ratio(&self, slots: usize) -> f64 {
        self.occupied as f64 / slots as f64
    }

    /// Replaces the bucket array with one of `new_len` buckets and rehashes every entry into it
    fn change_size(&mut self, new_len: usize) {
        let old_buckets = mem::replace(&mut self.buckets, empty_buckets(new_len));
        let old_len = old_buckets.len();
        self.occupied = 0;

        let mut moved: usize = 0;
        for entry in old_buckets.into_iter().flatten().flatten() {
            let (key, value) = entry.into_parts();
            self.insert(key, value, true);
            moved = moved.saturating_add(1);
        }

        debug!(
            "resized bucket array from {old_len} to {new_len}, rehashed {moved} entries into {} buckets",
            self.occupied
        );
    }
}

/// Allocates `len` empty buckets
fn empty_buckets<V>(len: usize) -> Vec<Option<Chain<V>>> {
    iter::repeat_with(|| None).take(len).collect()
}

impl<K: AsRef<str>, V> Extend<(K, V)> for HashTable<V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            if let Some(key) = normalize(key.as_ref()) {
                self.insert(key.to_owned(), value, false);
            }
        }
    }
}

impl<K: AsRef<str>, V> FromIterator<(K, V)> for HashTable<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = &'a Entry<V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`HashTable`]
#[derive(Debug)]
pub struct Iter<'a, V> {
    /// Buckets not visited yet
    buckets: slice::Iter<'a, Option<Chain<V>>>,
    /// Chain of the bucket being visited
    chain: Option<ChainIter<'a, V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                return Some(entry);
            }
            self.chain = self.buckets.next()?.as_ref().map(Chain::iter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Finds a key that lands in bucket `index` of a table with `buckets_len` buckets
    fn key_in_bucket(index: usize, buckets_len: usize) -> String {
        (0..)
            .map(|i| format!("probe-{i}"))
            .find(|key| bucket_index(key, buckets_len) == index)
            .unwrap_or_default()
    }

    #[test]
    fn test_set_and_get() -> Result<(), TableError> {
        let mut table = HashTable::new();
        table.set("key1", 1)?;
        table.set("key2", 2)?;

        assert_eq!(table.get("key1")?.map(Entry::value), Some(&1));
        assert_eq!(table.get("key2")?, Some(&Entry::new("key2", 2)));
        assert_eq!(table.get("key3")?, None);
        Ok(())
    }

    #[test]
    fn test_update_keeps_length() -> Result<(), TableError> {
        let mut table = HashTable::new();
        table.set("key1", 1)?;
        table.set("key1", 10)?;

        assert_eq!(table.get("key1")?.map(Entry::value), Some(&10));
        assert_eq!(table.len(), 1);
        Ok(())
    }

    #[test]
    fn test_get_mut() -> Result<(), TableError> {
        let mut table = HashTable::new();
        table.set("key1", 1)?;

        if let Some(value) = table.get_mut("key1")? {
            *value += 10;
        }

        assert_eq!(table.get("key1")?.map(Entry::value), Some(&11));
        assert_eq!(table.get_mut("missing")?, None);
        Ok(())
    }

    #[test]
    fn test_bucket_zero_is_usable() -> Result<(), TableError> {
        let key = key_in_bucket(0, MIN_SIZE);
        let mut table = HashTable::new();
        table.set(&key, "zero")?;

        assert!(table.has(&key)?);
        assert_eq!(table.get(&key)?.map(Entry::value), Some(&"zero"));
        assert_eq!(table.chain_lengths().first(), Some(&1));
        assert!(table.remove(&key)?);
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn test_colliding_keys_share_a_bucket() -> Result<(), TableError> {
        let first = key_in_bucket(5, MIN_SIZE);
        let second = (0..)
            .map(|i| format!("other-{i}"))
            .find(|key| bucket_index(key, MIN_SIZE) == 5)
            .unwrap_or_default();

        let mut table = HashTable::new();
        table.set(&first, 1)?;
        table.set(&second, 2)?;

        assert_eq!(table.occupied_buckets(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.chain_lengths().get(5), Some(&2));
        assert_eq!(table.keys(), vec![first.clone(), second.clone()]);

        assert!(table.remove(&first)?);
        assert_eq!(table.occupied_buckets(), 1);
        assert!(table.remove(&second)?);
        assert_eq!(table.occupied_buckets(), 0);
        Ok(())
    }

    #[test]
    fn test_len_and_is_empty() -> Result<(), TableError> {
        let mut table = HashTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);

        table.set("key1", 1)?;
        assert!(!table.is_empty());
        assert_eq!(table.len(), 1);

        table.set("key2", 2)?;
        assert_eq!(table.len(), 2);

        table.remove("key1")?;
        assert_eq!(table.len(), 1);

        table.remove("key2")?;
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn test_clear_resets_buckets() -> Result<(), TableError> {
        let mut table = HashTable::new();
        for i in 0..100 {
            table.set(&format!("key-{i}"), i)?;
        }
        assert!(table.bucket_count() > MIN_SIZE);

        table.clear();

        assert_eq!(table.len(), 0);
        assert_eq!(table.bucket_count(), MIN_SIZE);
        assert_eq!(table.occupied_buckets(), 0);
        assert_eq!(table.get("key-1")?, None);
        Ok(())
    }

    #[test]
    fn test_values_keep_falsy_values() -> Result<(), TableError> {
        let mut table = HashTable::new();
        table.set("zero", 0)?;
        table.set("one", 1)?;

        let mut values = table.values();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1]);

        let mut flags = HashTable::new();
        flags.set("off", false)?;
        assert_eq!(flags.values(), vec![false]);

        let mut labels = HashTable::new();
        labels.set("blank", "")?;
        assert_eq!(labels.values(), vec![""]);
        Ok(())
    }

    #[test]
    fn test_keys_values_entries_line_up() -> Result<(), TableError> {
        let mut table = HashTable::new();
        for i in 0..20 {
            table.set(&format!("key-{i}"), i)?;
        }

        let keys = table.keys();
        let values = table.values();
        let entries = table.entries();

        assert_eq!(keys.len(), 20);
        for ((key, value), entry) in keys.iter().zip(&values).zip(&entries) {
            assert_eq!(entry.key(), key);
            assert_eq!(entry.value(), value);
            assert_eq!(*key, format!("key-{value}"));
        }
        Ok(())
    }

    #[test]
    fn test_clone_copies_every_chain() -> Result<(), TableError> {
        let mut table = HashTable::new();
        for i in 0..100 {
            table.set(&format!("key-{i}"), i)?;
        }

        let copy = table.clone();
        table.clear();

        assert_eq!(copy.len(), 100);
        assert_eq!(copy.chain_lengths().iter().sum::<usize>(), 100);
        assert_eq!(copy.get("key-42")?.map(Entry::value), Some(&42));
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn test_with_capacity_rounds_up() {
        let table: HashTable<u8> = HashTable::with_capacity(100);
        assert_eq!(table.bucket_count(), 128);

        let table: HashTable<u8> = HashTable::with_capacity(3);
        assert_eq!(table.bucket_count(), MIN_SIZE);
    }

    #[test]
    fn test_from_iter_and_extend() -> Result<(), TableError> {
        let mut table: HashTable<i32> = vec![("a", 1), (" b ", 2), ("", 3)].into_iter().collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b")?.map(Entry::value), Some(&2));

        table.extend(vec![(String::from("c"), 3), (String::from("a"), 10)]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("a")?.map(Entry::value), Some(&10));
        Ok(())
    }

    #[test]
    fn test_iter() -> Result<(), TableError> {
        let mut table = HashTable::new();
        table.set("key1", 1)?;
        table.set("key2", 2)?;
        table.set("key3", 3)?;

        let mut count = 0;
        let mut sum = 0;
        for entry in &table {
            count += 1;
            sum += entry.value();
        }

        assert_eq!(count, 3);
        assert_eq!(sum, 6);
        Ok(())
    }

    #[test]
    fn test_load_factor_reports_occupied_buckets() -> Result<(), TableError> {
        let mut table = HashTable::new();
        table.set(&key_in_bucket(1, MIN_SIZE), 1)?;
        table.set(&key_in_bucket(2, MIN_SIZE), 2)?;

        assert!((table.load_factor() - 2.0 / 16.0).abs() < f64::EPSILON);
        Ok(())
    }
}
