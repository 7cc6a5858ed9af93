use super::{heap::HeapKind, Comparator, ContainerError};

/// Priority queue of keys ordered by their associated values.
///
/// The comparator orders values; `pop` and `peek` hand back the key of the
/// winning entry. Uses the same sift algorithm as `Heap`.
pub struct HeapMap<K, V> {
    entries: Vec<(K, V)>,
    kind: HeapKind,
    comparator: Comparator<V>,
}

impl<K, V> HeapMap<K, V> {
    pub fn new(kind: HeapKind, comparator: Comparator<V>) -> Self {
        HeapMap {
            entries: vec![],
            kind,
            comparator,
        }
    }

    pub fn kind(&self) -> HeapKind {
        self.kind
    }

    pub fn push(&mut self, key: K, value: V) {
        self.entries.push((key, value));
        self.sift_up(self.entries.len() - 1);
    }

    pub fn pop(&mut self) -> Result<K, ContainerError> {
        self.pop_entry().map(|(key, _)| key)
    }

    pub fn pop_entry(&mut self) -> Result<(K, V), ContainerError> {
        if self.entries.is_empty() {
            return Err(self.empty("pop"));
        }

        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let top = self.entries.pop().ok_or_else(|| self.empty("pop"))?;
        self.sift_down(0);
        Ok(top)
    }

    pub fn peek(&self) -> Result<&K, ContainerError> {
        self.entries
            .first()
            .map(|(key, _)| key)
            .ok_or_else(|| self.empty("peek"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    fn empty(&self, operation: &'static str) -> ContainerError {
        ContainerError::Empty {
            container: "heap map",
            operation,
        }
    }

    fn precedes(&self, a: usize, b: usize) -> bool {
        self.kind
            .precedes(&self.comparator, &self.entries[a].1, &self.entries[b].1)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.precedes(index, parent) {
                break;
            }
            self.entries.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let length = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut best = index;

            if left < length && self.precedes(left, best) {
                best = left;
            }
            if right < length && self.precedes(right, best) {
                best = right;
            }
            if best == index {
                break;
            }

            self.entries.swap(index, best);
            index = best;
        }
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for HeapMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapMap")
            .field("kind", &self.kind)
            .field("entries", &self.entries)
            .finish()
    }
}
