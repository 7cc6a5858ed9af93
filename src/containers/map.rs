use std::{collections::HashMap, hash::Hash};

/// Hash map that iterates in insertion order.
///
/// Entries live in a vector; the hash index maps each key to its slot.
/// Removing leaves a tombstone so the remaining slots keep their order,
/// and the vector is compacted once tombstones outnumber live entries.
#[derive(Debug, Clone)]
pub struct SchemaMap<K, V> {
    entries: Vec<Option<(K, V)>>,
    index: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone, V> SchemaMap<K, V> {
    pub fn new() -> Self {
        SchemaMap {
            entries: vec![],
            index: HashMap::new(),
        }
    }

    /// Inserts or replaces. A replaced key keeps its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&slot) = self.index.get(&key) {
            let entry = self.entries[slot].as_mut()?;
            return Some(std::mem::replace(&mut entry.1, value));
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Some((key, value)));
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.entries[slot].as_ref().map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = *self.index.get(key)?;
        self.entries[slot].as_mut().map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        let removed = self.entries[slot].take().map(|(_, value)| value);

        if self.entries.len() - self.index.len() > self.index.len() {
            self.compact();
        }

        removed
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.as_ref().map(|(key, value)| (key, value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    fn compact(&mut self) {
        self.entries.retain(|entry| entry.is_some());
        self.index.clear();
        for (slot, entry) in self.entries.iter().enumerate() {
            if let Some((key, _)) = entry {
                self.index.insert(key.clone(), slot);
            }
        }
    }
}

impl<K: Hash + Eq + Clone, V> Default for SchemaMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Insertion-ordered set keyed by a canonical key `K`.
///
/// The first item inserted under a key is the one kept and yielded.
#[derive(Debug, Clone)]
pub struct SchemaSet<K, T> {
    items: SchemaMap<K, T>,
}

impl<K: Hash + Eq + Clone, T> SchemaSet<K, T> {
    pub fn new() -> Self {
        SchemaSet {
            items: SchemaMap::new(),
        }
    }

    /// Returns false when the key was already present.
    pub fn insert(&mut self, key: K, item: T) -> bool {
        if self.items.contains_key(&key) {
            false
        } else {
            self.items.insert(key, item);
            true
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.items.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }
}

impl<K: Hash + Eq + Clone, T> Default for SchemaSet<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
