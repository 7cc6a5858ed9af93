//! Unit tests for the container library.

use std::rc::Rc;

use crate::containers::{
    array::SchemaArray,
    graph::Graph,
    heap::{Heap, HeapKind},
    heap_map::HeapMap,
    map::{SchemaMap, SchemaSet},
    range::{char_range, odometer_range, string_range, LazyRange, STRING_RANGE_ITERATION_CAP},
    tree::{AvlTree, BinaryTree, TreeNode},
    Comparator, ContainerError,
};

fn ascending() -> Comparator<i64> {
    Rc::new(|a: &i64, b: &i64| a.cmp(b))
}

#[test]
fn test_array_push_pop() {
    let mut array = SchemaArray::new();
    array.push(1);
    array.push(2);

    assert_eq!(array.len(), 2);
    assert_eq!(array.pop(), Ok(2));
    assert_eq!(array.pop(), Ok(1));
    assert_eq!(
        array.pop(),
        Err(ContainerError::Empty {
            container: "array",
            operation: "pop"
        })
    );
}

#[test]
fn test_array_get_set_bounds() {
    let mut array = SchemaArray::from_vec(vec![10, 20, 30]);

    assert_eq!(array.get(1), Ok(&20));
    assert!(array.set(2, 99).is_ok());
    assert_eq!(array.to_vec(), vec![10, 20, 99]);
    assert_eq!(
        array.get(3),
        Err(ContainerError::IndexOutOfBounds { index: 3, length: 3 })
    );
    assert!(array.get(-1).is_err());
    assert!(array.set(5, 0).is_err());
}

#[test]
fn test_map_keeps_insertion_order() {
    let mut map = SchemaMap::new();
    map.insert("b", 1);
    map.insert("a", 2);
    map.insert("c", 3);
    map.insert("b", 4);

    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, vec!["b", "a", "c"]);
    assert_eq!(map.get(&"b"), Some(&4));
}

#[test]
fn test_map_remove_and_compact() {
    let mut map = SchemaMap::new();
    for i in 0..10 {
        map.insert(i, i * 10);
    }
    for i in 0..8 {
        assert_eq!(map.remove(&i), Some(i * 10));
    }

    assert_eq!(map.len(), 2);
    assert!(!map.contains_key(&3));
    assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![80, 90]);

    map.insert(0, 1);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![8, 9, 0]);
    assert_eq!(map.remove(&42), None);
}

#[test]
fn test_set_keeps_first_item() {
    let mut set = SchemaSet::new();

    assert!(set.insert(1, "first"));
    assert!(!set.insert(1, "second"));
    assert!(set.insert(2, "other"));

    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["first", "other"]);
    assert!(set.remove(&1));
    assert!(!set.contains(&1));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_min_heap_order() {
    let mut heap = Heap::min(ascending());
    for value in [3, 1, 2] {
        heap.push(value);
    }

    assert_eq!(heap.peek(), Ok(&1));
    assert_eq!(heap.pop(), Ok(1));
    assert_eq!(heap.pop(), Ok(2));
    assert_eq!(heap.pop(), Ok(3));
    assert!(heap.pop().is_err());
    assert!(heap.peek().is_err());
}

#[test]
fn test_max_heap_order() {
    let mut heap = Heap::max(ascending());
    for value in [5, 9, 1, 7] {
        heap.push(value);
    }

    assert_eq!(heap.kind(), HeapKind::Max);
    assert_eq!(heap.pop(), Ok(9));
    assert_eq!(heap.pop(), Ok(7));
    assert_eq!(heap.len(), 2);
}

#[test]
fn test_heap_map_returns_keys() {
    let mut queue = HeapMap::new(HeapKind::Min, ascending());
    queue.push("slow", 10);
    queue.push("fast", 1);
    queue.push("medium", 5);

    assert_eq!(queue.peek(), Ok(&"fast"));
    assert_eq!(queue.pop(), Ok("fast"));
    assert_eq!(queue.pop_entry(), Ok(("medium", 5)));
    assert_eq!(queue.len(), 1);

    let mut max_queue = HeapMap::new(HeapKind::Max, ascending());
    max_queue.push('a', 1);
    max_queue.push('b', 2);
    assert_eq!(max_queue.pop(), Ok('b'));
}

#[test]
fn test_empty_heap_map_errors() {
    let mut queue: HeapMap<&str, i64> = HeapMap::new(HeapKind::Max, ascending());

    assert_eq!(
        queue.pop(),
        Err(ContainerError::Empty {
            container: "heap map",
            operation: "pop"
        })
    );
    assert!(queue.peek().is_err());
}

#[test]
fn test_binary_tree_traversals() {
    let mut tree = BinaryTree::new(ascending());
    for value in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(value);
    }

    assert_eq!(tree.pre_order(), vec![&4, &2, &1, &3, &6, &5, &7]);
    assert_eq!(tree.in_order(), vec![&1, &2, &3, &4, &5, &6, &7]);
    assert_eq!(tree.post_order(), vec![&1, &3, &2, &5, &7, &6, &4]);
    assert_eq!(tree.height(), 3);
    assert!(tree.search(&5));
    assert!(!tree.search(&8));
}

#[test]
fn test_binary_tree_duplicates_go_right() {
    let mut tree = BinaryTree::new(ascending());
    tree.insert(2);
    tree.insert(2);

    assert_eq!(tree.len(), 2);
    assert_eq!(tree.height(), 2);
    let root = tree.root().map(|node| node.right.is_some());
    assert_eq!(root, Some(true));
}

#[test]
fn test_skewed_tree_traversal_does_not_overflow() {
    let mut tree = BinaryTree::new(ascending());
    for value in 0..2_000 {
        tree.insert(value);
    }

    assert_eq!(tree.in_order().len(), 2_000);
    assert_eq!(tree.pre_order().first(), Some(&&0));
    assert_eq!(tree.post_order().first(), Some(&&1_999));
}

#[test]
fn test_empty_tree_height() {
    let tree: BinaryTree<i64> = BinaryTree::new(ascending());
    assert_eq!(tree.height(), 0);
    assert!(tree.in_order().is_empty());
}

#[test]
fn test_avl_rotations() {
    // RR
    let mut tree = AvlTree::new(ascending());
    for value in [1, 2, 3] {
        tree.insert(value);
    }
    assert_eq!(tree.pre_order(), vec![&2, &1, &3]);

    // LL
    let mut tree = AvlTree::new(ascending());
    for value in [3, 2, 1] {
        tree.insert(value);
    }
    assert_eq!(tree.pre_order(), vec![&2, &1, &3]);

    // LR
    let mut tree = AvlTree::new(ascending());
    for value in [3, 1, 2] {
        tree.insert(value);
    }
    assert_eq!(tree.pre_order(), vec![&2, &1, &3]);

    // RL
    let mut tree = AvlTree::new(ascending());
    for value in [1, 3, 2] {
        tree.insert(value);
    }
    assert_eq!(tree.pre_order(), vec![&2, &1, &3]);
}

#[test]
fn test_avl_duplicate_insert_is_noop() {
    let mut tree = AvlTree::new(ascending());
    tree.insert(1);
    tree.insert(1);

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.in_order(), vec![&1]);
}

#[test]
fn test_avl_sequential_inserts_stay_shallow() {
    let mut tree = AvlTree::new(ascending());
    for value in 0..1_023 {
        tree.insert(value);
    }

    assert_eq!(tree.height(), 10);
    assert_eq!(tree.len(), 1_023);
}

fn graph(directed: bool) -> Graph<i64, i64> {
    Graph::new(directed, Rc::new(|value: &i64| *value))
}

#[test]
fn test_graph_add_vertex_idempotent() {
    let mut g = graph(false);

    assert!(g.add_vertex(5));
    assert!(!g.add_vertex(5));
    assert_eq!(g.vertices(), vec![5]);
    assert_eq!(g.vertex_count(), 1);
}

#[test]
fn test_graph_undirected_mirrors_edges() {
    let mut g = graph(false);
    g.add_edge(1, 2, 1);

    assert!(g.has_edge(&1, &2));
    assert!(g.has_edge(&2, &1));
    assert_eq!(g.neighbors(&2), vec![1]);
    assert_eq!(g.edges().len(), 2);
}

#[test]
fn test_graph_undirected_self_loop_is_mirrored() {
    let mut g = graph(false);
    g.add_edge(4, 4, 2);

    assert_eq!(g.neighbors(&4), vec![4, 4]);
    assert_eq!(g.edges().len(), 2);
    assert_eq!(g.vertex_count(), 1);

    let mut d = graph(true);
    d.add_edge(4, 4, 2);
    assert_eq!(d.neighbors(&4), vec![4]);
}

#[test]
fn test_graph_directed_edges() {
    let mut g = graph(true);
    g.add_edge(1, 2, 7);
    g.add_edge(1, 3, 1);

    assert!(g.is_directed());
    assert!(!g.has_edge(&2, &1));
    assert_eq!(g.neighbors(&1), vec![2, 3]);
    assert_eq!(g.edges()[0].weight, 7);
    assert_eq!(g.vertices(), vec![1, 2, 3]);
    assert!(g.neighbors(&9).is_empty());
}

#[test]
fn test_graph_key_fn_canonicalizes() {
    let mut g: Graph<(i64, &str), i64> = Graph::new(false, Rc::new(|value: &(i64, &str)| value.0));
    g.add_vertex((1, "first"));
    g.add_vertex((1, "second"));

    assert_eq!(g.vertices(), vec![(1, "first")]);
    assert!(g.has_vertex(&(1, "anything")));
}

#[test]
fn test_lazy_range_bounds() {
    assert_eq!(LazyRange::new(0, Some(3), false).materialize(), Some(vec![0, 1, 2]));
    assert_eq!(LazyRange::new(0, Some(3), true).materialize(), Some(vec![0, 1, 2, 3]));
    assert_eq!(LazyRange::new(5, Some(2), false).materialize(), Some(vec![]));
    assert_eq!(LazyRange::unbounded(0).materialize(), None);
}

#[test]
fn test_lazy_range_is_restartable() {
    let range = LazyRange::unbounded(10);

    let first: Vec<_> = range.iter().take(3).collect();
    let second: Vec<_> = range.iter().take(2).collect();

    assert_eq!(first, vec![10, 11, 12]);
    assert_eq!(second, vec![10, 11]);
    assert!(range.is_infinite());
}

#[test]
fn test_range_display() {
    assert_eq!(LazyRange::new(0, Some(5), false).to_string(), "0..5");
    assert_eq!(LazyRange::new(0, Some(5), true).to_string(), "0..=5");
    assert_eq!(LazyRange::unbounded(3).to_string(), "3..");
}

#[test]
fn test_char_range() {
    assert_eq!(char_range('a', 'd', false), vec!["a", "b", "c"]);
    assert_eq!(char_range('a', 'c', true), vec!["a", "b", "c"]);
    assert!(char_range('z', 'a', true).is_empty());
}

#[test]
fn test_odometer_range() {
    assert_eq!(
        odometer_range("az", "bb", true),
        Ok(vec!["az".to_string(), "ba".into(), "bb".into()])
    );
    assert_eq!(odometer_range("az", "ba", true), Ok(vec!["az".to_string(), "ba".into()]));
    assert_eq!(odometer_range("a9", "b1", false), Ok(vec!["a9".to_string(), "b0".into()]));

    let letters = odometer_range("aa", "bb", true).unwrap_or_default();
    assert_eq!(letters.len(), 28);
    assert_eq!(letters[25], "az");
    assert_eq!(letters[26], "ba");
    assert!(letters.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(odometer_range("bb", "aa", true), Ok(vec![]));
    assert_eq!(
        odometer_range("a1", "a3", false),
        Ok(vec!["a1".to_string(), "a2".into()])
    );
    assert!(matches!(
        odometer_range("a", "bb", false),
        Err(ContainerError::MismatchedRangeBounds { .. })
    ));
}

#[test]
fn test_odometer_range_cap() {
    let values = string_range("aaaa", "zzzz", true).unwrap_or_default();
    assert_eq!(values.len(), STRING_RANGE_ITERATION_CAP);
}

#[test]
fn test_string_range_dispatch() {
    assert_eq!(string_range("x", "z", true), Ok(vec!["x".to_string(), "y".into(), "z".into()]));
    assert_eq!(string_range("ab", "ac", true), Ok(vec!["ab".to_string(), "ac".into()]));
}

fn assert_balanced(node: Option<&TreeNode<i64>>) -> i64 {
    match node {
        None => 0,
        Some(node) => {
            let left = assert_balanced(node.left.as_deref());
            let right = assert_balanced(node.right.as_deref());
            assert!((left - right).abs() <= 1, "unbalanced at {}", node.value);
            1 + left.max(right)
        }
    }
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn min_heap_pops_in_order(values in proptest::collection::vec(-1000i64..1000, 0..200)) {
            let mut heap = Heap::min(ascending());
            for value in &values {
                heap.push(*value);
            }

            let mut sorted = values.clone();
            sorted.sort();
            let mut popped = vec![];
            while let Ok(value) = heap.pop() {
                popped.push(value);
            }
            prop_assert_eq!(popped, sorted);
        }

        #[test]
        fn heap_size_tracks_pushes_and_pops(pushes in 0usize..100, pops in 0usize..100) {
            let mut heap = Heap::max(ascending());
            for value in 0..pushes {
                heap.push(value as i64);
            }
            let pops = pops.min(pushes);
            for _ in 0..pops {
                prop_assert!(heap.pop().is_ok());
            }
            prop_assert_eq!(heap.len(), pushes - pops);
        }

        #[test]
        fn min_heap_root_is_minimum(values in proptest::collection::vec(any::<i64>(), 1..100), pops in 0usize..50) {
            let mut heap = Heap::min(ascending());
            for value in &values {
                heap.push(*value);
            }
            for _ in 0..pops.min(values.len() - 1) {
                let _ = heap.pop();
            }
            let root = *heap.peek().unwrap();
            prop_assert!(heap.iter().all(|value| root <= *value));
        }

        #[test]
        fn avl_stays_balanced_and_sorted(values in proptest::collection::vec(-500i64..500, 0..300)) {
            let mut tree = AvlTree::new(ascending());
            for value in &values {
                tree.insert(*value);
            }

            assert_balanced(tree.root());
            let in_order: Vec<i64> = tree.in_order().into_iter().copied().collect();
            prop_assert!(in_order.windows(2).all(|pair| pair[0] < pair[1]));

            let mut distinct = values.clone();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(in_order, distinct);
        }
    }
}
