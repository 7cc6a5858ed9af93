//! Runtime container library.
//!
//! The generic data structures user programs reach through method-call
//! syntax. Every container owns its storage and is only manipulated through
//! its own methods:
//!
//! - `SchemaArray`, `SchemaMap`, `SchemaSet` - sequence and insertion-ordered associative storage
//! - `Heap` / `HeapMap` - binary heaps, the latter exposing keys ordered by value
//! - `BinaryTree` / `AvlTree` - search trees with iterative traversals
//! - `Graph` - adjacency lists keyed by a canonicalization function
//! - `LazyRange` and the string range helpers
//!
//! The module has no knowledge of the interpreter; comparators and key
//! functions are supplied by the caller.

pub mod array;
pub mod graph;
pub mod heap;
pub mod heap_map;
pub mod map;
pub mod range;
pub mod tree;

#[cfg(test)]
mod tests;

use std::{cmp::Ordering, rc::Rc};

use thiserror::Error;

/// Total ordering supplied by the owner of a container.
pub type Comparator<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContainerError {
    #[error("cannot {operation} on an empty {container}")]
    Empty {
        container: &'static str,
        operation: &'static str,
    },
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("key not found")]
    KeyNotFound,
    #[error("range bounds {start:?} and {end:?} must have the same length")]
    MismatchedRangeBounds { start: String, end: String },
}
