use std::{hash::Hash, rc::Rc};

use super::map::SchemaMap;

/// Maps a vertex to the key it is stored under.
pub type KeyFn<V, K> = Rc<dyn Fn(&V) -> K>;

#[derive(Debug, Clone)]
pub struct Edge<V> {
    pub from: V,
    pub to: V,
    pub weight: i64,
}

struct Vertex<V> {
    value: V,
    edges: Vec<Edge<V>>,
}

/// Adjacency list graph.
///
/// Vertices are looked up through `key_fn`, so two distinct vertex values that
/// canonicalize to the same key are the same vertex. Undirected graphs store
/// every edge on both endpoints when it is added.
pub struct Graph<V, K> {
    adjacency: SchemaMap<K, Vertex<V>>,
    key_fn: KeyFn<V, K>,
    directed: bool,
}

impl<V: Clone, K: Hash + Eq + Clone> Graph<V, K> {
    pub fn new(directed: bool, key_fn: KeyFn<V, K>) -> Self {
        Graph {
            adjacency: SchemaMap::new(),
            key_fn,
            directed,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Returns false when a vertex with the same key already exists.
    pub fn add_vertex(&mut self, value: V) -> bool {
        let key = (self.key_fn)(&value);
        if self.adjacency.contains_key(&key) {
            return false;
        }
        self.adjacency.insert(key, Vertex { value, edges: vec![] });
        true
    }

    /// Adds both endpoints if needed. An undirected graph also stores the
    /// mirrored edge, including for a self-loop.
    pub fn add_edge(&mut self, from: V, to: V, weight: i64) {
        self.add_vertex(from.clone());
        self.add_vertex(to.clone());

        let from_key = (self.key_fn)(&from);
        let to_key = (self.key_fn)(&to);

        if !self.directed {
            if let Some(vertex) = self.adjacency.get_mut(&to_key) {
                vertex.edges.push(Edge {
                    from: to.clone(),
                    to: from.clone(),
                    weight,
                });
            }
        }
        if let Some(vertex) = self.adjacency.get_mut(&from_key) {
            vertex.edges.push(Edge { from, to, weight });
        }
    }

    /// Targets of the outgoing edges of `value`, empty for unknown vertices.
    pub fn neighbors(&self, value: &V) -> Vec<V> {
        self.adjacency
            .get(&(self.key_fn)(value))
            .map(|vertex| vertex.edges.iter().map(|edge| edge.to.clone()).collect())
            .unwrap_or_default()
    }

    /// Every stored edge. Undirected edges appear once per direction.
    pub fn edges(&self) -> Vec<Edge<V>> {
        self.adjacency
            .values()
            .flat_map(|vertex| vertex.edges.iter().cloned())
            .collect()
    }

    pub fn has_edge(&self, from: &V, to: &V) -> bool {
        let to_key = (self.key_fn)(to);
        self.adjacency
            .get(&(self.key_fn)(from))
            .is_some_and(|vertex| vertex.edges.iter().any(|edge| (self.key_fn)(&edge.to) == to_key))
    }

    pub fn has_vertex(&self, value: &V) -> bool {
        self.adjacency.contains_key(&(self.key_fn)(value))
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> Vec<V> {
        self.adjacency.values().map(|vertex| vertex.value.clone()).collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Each vertex with the targets of its edges, in insertion order.
    pub fn adjacency(&self) -> Vec<(V, Vec<V>)> {
        self.adjacency
            .values()
            .map(|vertex| {
                (
                    vertex.value.clone(),
                    vertex.edges.iter().map(|edge| edge.to.clone()).collect(),
                )
            })
            .collect()
    }
}
