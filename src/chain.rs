use std::fmt;

/// A key-value pair stored in the table.
///
/// Keys are already normalized (trimmed, non-empty) by the time an entry is built by the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    /// The normalized key
    key: String,
    /// The value associated with the key
    value: V,
}

impl<V> Entry<V> {
    /// Creates an entry from a key and a value
    #[must_use]
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self { key: key.into(), value }
    }

    /// Returns the key of this entry
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the value of this entry
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns a mutable reference to the value of this entry
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Splits the entry into its key and value
    #[must_use]
    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}

/// Owning link to the next node of a chain
type Link<V> = Option<Box<Node<V>>>;

/// A single node of a chain; each node owns its successor
struct Node<V> {
    /// The entry held by this node
    entry: Entry<V>,
    /// The rest of the chain
    next: Link<V>,
}

/// A singly linked list of entries whose keys collide on the same bucket.
///
/// Traversal is forward-only. The chain keeps no length counter, so [`Chain::size`] walks every
/// node.
pub struct Chain<V> {
    /// First node of the chain, `None` when the chain is empty
    head: Link<V>,
}

impl<V> Default for Chain<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for Chain<V> {
    // Rebuilds through a tail cursor so long chains do not recurse on clone.
    fn clone(&self) -> Self {
        let mut chain = Self::new();
        let mut tail = &mut chain.head;
        for entry in self {
            let node = tail.insert(Box::new(Node { entry: entry.clone(), next: None }));
            tail = &mut node.next;
        }
        chain
    }
}

impl<V: fmt::Debug> fmt::Debug for Chain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<V> Drop for Chain<V> {
    // Unlink nodes one at a time so long chains do not recurse on drop.
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl<V> Chain<V> {
    /// Creates an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Adds an entry at the end of the chain. Walks the whole chain.
    pub fn append(&mut self, entry: Entry<V>) {
        let mut cursor = &mut self.head;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(Box::new(Node { entry, next: None }));
    }

    /// Adds an entry at the start of the chain
    pub fn prepend(&mut self, entry: Entry<V>) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { entry, next }));
    }

    /// Returns the first entry of the chain
    #[must_use]
    pub fn head(&self) -> Option<&Entry<V>> {
        self.head.as_deref().map(|node| &node.entry)
    }

    /// Returns the first entry whose key matches `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry<V>> {
        self.iter().find(|entry| entry.key == key)
    }

    /// Returns a mutable reference to the first entry whose key matches `key`
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry<V>> {
        let mut cursor = self.head.as_deref_mut();
        while let Some(node) = cursor {
            if node.entry.key == key {
                return Some(&mut node.entry);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    /// Returns true if an entry with `key` is in the chain
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes the entry with `key`, returning whether anything was removed
    pub fn find_and_remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Unlinks the entry with `key` and returns it.
    ///
    /// The cursor always points at the link owning the candidate node, so the head and inner
    /// nodes are spliced out the same way.
    pub fn take(&mut self, key: &str) -> Option<Entry<V>> {
        let mut cursor = &mut self.head;
        while cursor.as_ref().is_some_and(|node| node.entry.key != key) {
            cursor = &mut cursor.as_mut()?.next;
        }
        let node = cursor.take()?;
        let Node { entry, next } = *node;
        *cursor = next;
        Some(entry)
    }

    /// Detaches and returns the first entry
    pub fn pop_front(&mut self) -> Option<Entry<V>> {
        let node = self.head.take()?;
        let Node { entry, next } = *node;
        self.head = next;
        Some(entry)
    }

    /// Counts the entries by walking the chain
    #[must_use]
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if the chain holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns an iterator over the entries in chain order
    #[must_use]
    pub fn iter(&self) -> ChainIter<'_, V> {
        ChainIter { next: self.head.as_deref() }
    }

    /// Copies every entry into a vector, in chain order
    #[must_use]
    pub fn to_vec(&self) -> Vec<Entry<V>>
    where
        V: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<'a, V> IntoIterator for &'a Chain<V> {
    type Item = &'a Entry<V>;
    type IntoIter = ChainIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V> IntoIterator for Chain<V> {
    type Item = Entry<V>;
    type IntoIter = ChainIntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        ChainIntoIter { chain: self }
    }
}

/// Borrowing iterator over the entries of a [`Chain`]
pub struct ChainIter<'a, V> {
    /// Node that will be yielded next
    next: Option<&'a Node<V>>,
}

impl<V: fmt::Debug> fmt::Debug for ChainIter<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainIter").field("next", &self.next.map(|node| &node.entry)).finish()
    }
}

impl<'a, V> Iterator for ChainIter<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.entry
        })
    }
}

/// Owning iterator that drains a [`Chain`] from the head
#[derive(Debug)]
pub struct ChainIntoIter<V> {
    /// The remaining entries
    chain: Chain<V>,
}

impl<V> Iterator for ChainIntoIter<V> {
    type Item = Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chain.pop_front()
    }
}
