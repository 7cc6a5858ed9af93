use std::cmp::Ordering;

use super::{Comparator, ContainerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapKind {
    Min,
    Max,
}

impl HeapKind {
    pub fn name(&self) -> &'static str {
        match self {
            HeapKind::Min => "MinHeap",
            HeapKind::Max => "MaxHeap",
        }
    }

    /// Whether `a` belongs above `b` in a heap of this kind.
    pub(super) fn precedes<T>(&self, comparator: &Comparator<T>, a: &T, b: &T) -> bool {
        match self {
            HeapKind::Min => comparator(a, b) == Ordering::Less,
            HeapKind::Max => comparator(b, a) == Ordering::Less,
        }
    }
}

/// Binary heap stored in a flat array.
///
/// `push` appends and sifts up, `pop` swaps the root with the last slot,
/// shrinks and sifts down. Both are O(log n).
pub struct Heap<T> {
    data: Vec<T>,
    kind: HeapKind,
    comparator: Comparator<T>,
}

impl<T> Heap<T> {
    pub fn new(kind: HeapKind, comparator: Comparator<T>) -> Self {
        Heap {
            data: vec![],
            kind,
            comparator,
        }
    }

    pub fn min(comparator: Comparator<T>) -> Self {
        Self::new(HeapKind::Min, comparator)
    }

    pub fn max(comparator: Comparator<T>) -> Self {
        Self::new(HeapKind::Max, comparator)
    }

    pub fn kind(&self) -> HeapKind {
        self.kind
    }

    pub fn push(&mut self, value: T) {
        self.data.push(value);
        self.sift_up(self.data.len() - 1);
    }

    pub fn pop(&mut self) -> Result<T, ContainerError> {
        if self.data.is_empty() {
            return Err(self.empty("pop"));
        }

        let last = self.data.len() - 1;
        self.data.swap(0, last);
        let top = self.data.pop().ok_or_else(|| self.empty("pop"))?;
        self.sift_down(0);
        Ok(top)
    }

    pub fn peek(&self) -> Result<&T, ContainerError> {
        self.data.first().ok_or_else(|| self.empty("peek"))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in storage order (root first).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    fn empty(&self, operation: &'static str) -> ContainerError {
        ContainerError::Empty {
            container: "heap",
            operation,
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self
                .kind
                .precedes(&self.comparator, &self.data[index], &self.data[parent])
            {
                self.data.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let length = self.data.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut best = index;

            if left < length
                && self
                    .kind
                    .precedes(&self.comparator, &self.data[left], &self.data[best])
            {
                best = left;
            }
            if right < length
                && self
                    .kind
                    .precedes(&self.comparator, &self.data[right], &self.data[best])
            {
                best = right;
            }

            if best == index {
                break;
            }
            self.data.swap(index, best);
            index = best;
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap")
            .field("kind", &self.kind)
            .field("data", &self.data)
            .finish()
    }
}
