use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use log::debug;

use crate::error::{CommEvalError, Result};
use crate::types::{EdgeKey, VertexId, Weight};

/// Weighted undirected simple graph.
///
/// Every mutation keeps four derived aggregates consistent: the adjacency
/// map, the canonical edge index, the per-vertex weighted degrees and the
/// total weight. The edge index is the single source of truth for edge
/// existence and weight; the other three are maintained alongside it so the
/// common queries stay O(1).
#[derive(Debug, Clone)]
pub struct WeightedGraph<V: VertexId> {
    vertices: BTreeSet<V>, // Exactly the key set of the adjacency map.
    adj_map: BTreeMap<V, Vec<(V, Weight)>>, // Each edge appears once per endpoint.
    edge_index: HashMap<EdgeKey<V>, Weight>, // Canonical pair -> weight, one entry per edge.
    weighted_degree: HashMap<V, Weight>, // Vertex -> sum of incident edge weights.
    total_weight: Weight, // Sum over the edge index, each edge counted once.
}

impl<V: VertexId> Default for WeightedGraph<V> {
    fn default() -> WeightedGraph<V> {
        WeightedGraph::new()
    }
}

impl<V: VertexId> WeightedGraph<V> {
    pub fn new() -> WeightedGraph<V> {
        WeightedGraph {
            vertices: BTreeSet::new(),
            adj_map: BTreeMap::new(),
            edge_index: HashMap::new(),
            weighted_degree: HashMap::new(),
            total_weight: 0.0,
        }
    }

    /// Build a graph from an iterator of `(u, v, weight)` triples.
    /// Lines the graph rejects (duplicates, self loops, negative weights)
    /// are skipped with a diagnostic.
    pub fn from_edges(edges_iter: impl Iterator<Item = (V, V, Weight)>) -> WeightedGraph<V> {
        let mut graph = WeightedGraph::new();
        for (u, v, weight) in edges_iter {
            if let Err(err) = graph.add_edge(u, v, weight) {
                debug!("skipping edge ({}, {}): {}", u, v, err);
            }
        }
        graph
    }

    pub fn has_vertex(&self, vertex: &V) -> bool {
        self.adj_map.contains_key(vertex)
    }

    /// Insert a fresh vertex with no incident edges.
    /// Unlike `remove_vertex`, inserting an existing vertex is an error.
    pub fn add_vertex(&mut self, vertex: V) -> Result<()> {
        if self.has_vertex(&vertex) {
            return Err(CommEvalError::DuplicateVertex {
                vertex: vertex.to_string(),
            });
        }
        self.vertices.insert(vertex);
        self.adj_map.insert(vertex, Vec::new());
        self.weighted_degree.insert(vertex, 0.0);
        Ok(())
    }

    /// Remove a vertex together with every incident edge.
    ///
    /// Removing an absent vertex is a silent no-op. This is the one tolerated
    /// asymmetry in the interface: `add_vertex` rejects duplicates while
    /// `remove_vertex` accepts repeats.
    pub fn remove_vertex(&mut self, vertex: &V) {
        if !self.has_vertex(vertex) {
            return;
        }
        // Step 1. The vertex's weighted degree leaves the total weight.
        let removed_degree = self.weighted_degree[vertex];
        self.total_weight -= removed_degree;

        // Step 2. Unhook the vertex from every former neighbor.
        let neighbors = self.adj_map.remove(vertex).unwrap();
        for (neighbor, weight) in &neighbors {
            *self.weighted_degree.get_mut(neighbor).unwrap() -= *weight;
            self.edge_index.remove(&EdgeKey::new(*vertex, *neighbor));
            self.adj_map
                .get_mut(neighbor)
                .unwrap()
                .retain(|(other, _)| other != vertex);
        }

        // Step 3. Drop the vertex itself.
        self.weighted_degree.remove(vertex);
        self.vertices.remove(vertex);
        debug!(
            "removed vertex {} and {} incident edges",
            vertex,
            neighbors.len()
        );
    }

    pub fn has_edge(&self, u: &V, v: &V) -> bool {
        self.edge_index.contains_key(&EdgeKey::new(*u, *v))
    }

    /// Insert an undirected edge. Missing endpoints are created on the fly,
    /// so bulk loading an edge list needs no separate vertex pass.
    ///
    /// All checks run before any state changes, so a rejected edge leaves
    /// the graph untouched.
    pub fn add_edge(&mut self, u: V, v: V, weight: Weight) -> Result<()> {
        if u == v {
            return Err(CommEvalError::SelfLoop {
                vertex: u.to_string(),
            });
        }
        if weight < 0.0 {
            return Err(CommEvalError::NegativeWeight { weight });
        }
        if self.has_edge(&u, &v) {
            return Err(CommEvalError::DuplicateEdge {
                from: u.to_string(),
                to: v.to_string(),
            });
        }

        if !self.has_vertex(&u) {
            self.add_vertex(u)?;
        }
        if !self.has_vertex(&v) {
            self.add_vertex(v)?;
        }

        // All checks passed, update the four aggregates together.
        self.total_weight += weight;
        self.adj_map.get_mut(&u).unwrap().push((v, weight));
        self.adj_map.get_mut(&v).unwrap().push((u, weight));
        *self.weighted_degree.get_mut(&u).unwrap() += weight;
        *self.weighted_degree.get_mut(&v).unwrap() += weight;
        self.edge_index.insert(EdgeKey::new(u, v), weight);
        Ok(())
    }

    /// Remove an existing edge and roll its weight out of every aggregate.
    pub fn remove_edge(&mut self, u: &V, v: &V) -> Result<()> {
        let key = EdgeKey::new(*u, *v);
        let weight = match self.edge_index.get(&key) {
            None => {
                return Err(CommEvalError::EdgeNotFound {
                    from: u.to_string(),
                    to: v.to_string(),
                })
            }
            Some(weight) => *weight,
        };

        self.total_weight -= weight;
        *self.weighted_degree.get_mut(u).unwrap() -= weight;
        *self.weighted_degree.get_mut(v).unwrap() -= weight;
        self.edge_index.remove(&key);
        self.adj_map.get_mut(u).unwrap().retain(|(other, _)| other != v);
        self.adj_map.get_mut(v).unwrap().retain(|(other, _)| other != u);
        Ok(())
    }

    pub fn get_edge_weight(&self, u: &V, v: &V) -> Result<Weight> {
        match self.edge_index.get(&EdgeKey::new(*u, *v)) {
            None => Err(CommEvalError::EdgeNotFound {
                from: u.to_string(),
                to: v.to_string(),
            }),
            Some(weight) => Ok(*weight),
        }
    }

    /// Neighbors of a vertex as `(neighbor, weight)` pairs, in insertion order.
    pub fn get_neighbors(&self, vertex: &V) -> Result<&[(V, Weight)]> {
        match self.adj_map.get(vertex) {
            None => Err(CommEvalError::VertexNotFound {
                vertex: vertex.to_string(),
            }),
            Some(neighbors) => Ok(neighbors),
        }
    }

    /// Number of incident edges.
    pub fn get_degree(&self, vertex: &V) -> Result<usize> {
        self.get_neighbors(vertex).map(|neighbors| neighbors.len())
    }

    /// Sum of incident edge weights.
    pub fn get_weighted_degree(&self, vertex: &V) -> Result<Weight> {
        match self.weighted_degree.get(vertex) {
            None => Err(CommEvalError::VertexNotFound {
                vertex: vertex.to_string(),
            }),
            Some(degree) => Ok(*degree),
        }
    }

    pub fn get_vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn get_edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// Sum of all distinct edge weights, each edge counted once.
    pub fn get_total_weight(&self) -> Weight {
        self.total_weight
    }

    /// Ordered read-only view of the vertex set.
    pub fn get_vertices(&self) -> &BTreeSet<V> {
        &self.vertices
    }

    /// Iterate every distinct edge once as `(u, v, weight)` with `u < v`.
    /// Iteration order is unspecified; use `edges_ordered` where a
    /// reproducible order matters.
    pub fn edges(&self) -> impl Iterator<Item = (V, V, Weight)> + '_ {
        self.edge_index.iter().map(|(key, weight)| {
            let (u, v) = key.endpoints();
            (u, v, *weight)
        })
    }

    /// Every distinct edge once, in ascending canonical-pair order.
    pub fn edges_ordered(&self) -> Vec<(V, V, Weight)> {
        self.edges().sorted_by_key(|&(u, v, _)| (u, v)).collect()
    }

    /// Snapshot the induced subgraph over `subset`.
    ///
    /// The result contains exactly the given vertices and every edge of this
    /// graph with both endpoints in the subset. All aggregates are re-derived
    /// from scratch, nothing is shared with the parent, so the snapshot's
    /// invariants hold regardless of what the subset looks like. Subset
    /// vertices absent from the parent become isolated vertices.
    pub fn create_subgraph(&self, subset: &BTreeSet<V>) -> WeightedGraph<V> {
        let mut subgraph = WeightedGraph::new();
        for vertex in subset {
            // Set iteration is duplicate-free, insertion cannot fail.
            subgraph.add_vertex(*vertex).unwrap();
        }
        for (u, v, weight) in self.edges() {
            if subset.contains(&u) && subset.contains(&v) {
                // The edge index yields each edge once, no duplicates here.
                subgraph.add_edge(u, v, weight).unwrap();
            }
        }
        subgraph
    }
}

#[cfg(test)]
mod test_graph {
    use std::collections::BTreeSet;

    use rand::prelude::SliceRandom;
    use rand::Rng;

    use crate::error::CommEvalError;
    use crate::graph::WeightedGraph;

    /// Two weight-5 triangles joined by a weight-1 bridge.
    fn two_triangles() -> WeightedGraph<u32> {
        let edges = vec![
            (1, 2, 5.0),
            (1, 3, 5.0),
            (2, 3, 5.0),
            (4, 5, 5.0),
            (4, 6, 5.0),
            (5, 6, 5.0),
            (3, 4, 1.0),
        ];
        WeightedGraph::from_edges(edges.into_iter())
    }

    /// Re-derive every aggregate and compare against the maintained ones.
    fn assert_invariants(graph: &WeightedGraph<u32>) {
        // Invariant 5: every vertex has an adjacency entry (the unwrap in the
        // degree loop below) and every edge endpoint is a known vertex.
        for (u, v, _) in graph.edges() {
            assert!(graph.get_vertices().contains(&u));
            assert!(graph.get_vertices().contains(&v));
        }

        // Invariant 1: weighted degree equals the adjacency weight sum.
        for vertex in graph.get_vertices() {
            let adjacency_sum: f64 = graph
                .get_neighbors(vertex)
                .unwrap()
                .iter()
                .map(|(_, weight)| weight)
                .sum();
            let degree = graph.get_weighted_degree(vertex).unwrap();
            assert!(
                (degree - adjacency_sum).abs() < 1e-9,
                "degree drift on vertex {}: {} vs {}",
                vertex,
                degree,
                adjacency_sum
            );
        }

        // Invariant 2: total weight equals the edge index sum.
        let index_sum: f64 = graph.edges().map(|(_, _, weight)| weight).sum();
        assert!((graph.get_total_weight() - index_sum).abs() < 1e-9);

        // Invariant 3: every indexed edge appears in both adjacency lists.
        for (u, v, weight) in graph.edges() {
            assert!(graph
                .get_neighbors(&u)
                .unwrap()
                .contains(&(v, weight)));
            assert!(graph
                .get_neighbors(&v)
                .unwrap()
                .contains(&(u, weight)));
        }
    }

    #[test]
    fn test_build_counts() {
        let graph = two_triangles();
        assert_eq!(graph.get_vertex_count(), 6);
        assert_eq!(graph.get_edge_count(), 7);
        assert!((graph.get_total_weight() - 31.0).abs() < 1e-9);
        assert_eq!(graph.get_degree(&3).unwrap(), 3);
        assert!((graph.get_weighted_degree(&3).unwrap() - 11.0).abs() < 1e-9);
        assert_invariants(&graph);
    }

    #[test]
    fn test_add_vertex_strict() {
        let mut graph = WeightedGraph::<u32>::new();
        graph.add_vertex(1).unwrap();
        assert!(matches!(
            graph.add_vertex(1),
            Err(CommEvalError::DuplicateVertex { .. })
        ));
        assert_eq!(graph.get_vertex_count(), 1);
    }

    #[test]
    fn test_add_edge_auto_creates_vertices() {
        let mut graph = WeightedGraph::<u32>::new();
        graph.add_edge(7, 9, 2.5).unwrap();
        assert!(graph.has_vertex(&7));
        assert!(graph.has_vertex(&9));
        assert_eq!(graph.get_vertex_count(), 2);
        assert_eq!(graph.get_edge_count(), 1);
    }

    #[test]
    fn test_add_edge_rejections_leave_state_untouched() {
        let mut graph = WeightedGraph::<u32>::new();
        graph.add_edge(1, 2, 1.0).unwrap();

        assert!(matches!(
            graph.add_edge(1, 2, 3.0),
            Err(CommEvalError::DuplicateEdge { .. })
        ));
        assert!(matches!(
            graph.add_edge(2, 1, 3.0),
            Err(CommEvalError::DuplicateEdge { .. })
        ));
        assert!(matches!(
            graph.add_edge(1, 3, -0.5),
            Err(CommEvalError::NegativeWeight { .. })
        ));
        assert!(matches!(
            graph.add_edge(4, 4, 1.0),
            Err(CommEvalError::SelfLoop { .. })
        ));

        // A rejected negative edge must not have created vertex 3, and a
        // rejected self loop must not have created vertex 4.
        assert!(!graph.has_vertex(&3));
        assert!(!graph.has_vertex(&4));
        assert_eq!(graph.get_edge_count(), 1);
        assert_invariants(&graph);
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = two_triangles();
        graph.remove_edge(&3, &4).unwrap();
        assert_eq!(graph.get_edge_count(), 6);
        assert!((graph.get_total_weight() - 30.0).abs() < 1e-9);
        assert!((graph.get_weighted_degree(&3).unwrap() - 10.0).abs() < 1e-9);
        assert!(!graph.has_edge(&4, &3));
        assert!(matches!(
            graph.remove_edge(&3, &4),
            Err(CommEvalError::EdgeNotFound { .. })
        ));
        assert_invariants(&graph);
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let mut graph = two_triangles();
        graph.remove_vertex(&3);
        assert_eq!(graph.get_vertex_count(), 5);
        assert_eq!(graph.get_edge_count(), 4);
        // Edges (1,3), (2,3) and (3,4) are gone.
        assert!((graph.get_total_weight() - 20.0).abs() < 1e-9);
        assert!((graph.get_weighted_degree(&1).unwrap() - 5.0).abs() < 1e-9);
        assert!((graph.get_weighted_degree(&4).unwrap() - 10.0).abs() < 1e-9);
        assert!(!graph.has_edge(&1, &3));
        assert_invariants(&graph);
    }

    #[test]
    fn test_remove_vertex_absent_is_noop() {
        let mut graph = two_triangles();
        graph.remove_vertex(&42);
        graph.remove_vertex(&42);
        assert_eq!(graph.get_vertex_count(), 6);
        assert_eq!(graph.get_edge_count(), 7);
        assert_invariants(&graph);
    }

    #[test]
    fn test_edge_symmetry() {
        let graph = two_triangles();
        for (u, v, _) in graph.edges() {
            assert_eq!(graph.has_edge(&u, &v), graph.has_edge(&v, &u));
            assert_eq!(
                graph.get_edge_weight(&u, &v).unwrap(),
                graph.get_edge_weight(&v, &u).unwrap()
            );
        }
        assert!(!graph.has_edge(&1, &6));
        assert!(!graph.has_edge(&6, &1));
    }

    #[test]
    fn test_query_missing_vertex() {
        let graph = two_triangles();
        assert!(matches!(
            graph.get_neighbors(&99),
            Err(CommEvalError::VertexNotFound { .. })
        ));
        assert!(matches!(
            graph.get_weighted_degree(&99),
            Err(CommEvalError::VertexNotFound { .. })
        ));
        assert!(matches!(
            graph.get_edge_weight(&1, &99),
            Err(CommEvalError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_subgraph_full_set_roundtrip() {
        let graph = two_triangles();
        let subgraph = graph.create_subgraph(&graph.get_vertices().clone());
        assert_eq!(subgraph.get_vertex_count(), graph.get_vertex_count());
        assert_eq!(subgraph.get_edge_count(), graph.get_edge_count());
        assert!((subgraph.get_total_weight() - graph.get_total_weight()).abs() < 1e-9);
        assert_invariants(&subgraph);
    }

    #[test]
    fn test_subgraph_partial() {
        let graph = two_triangles();
        let subset: BTreeSet<u32> = [1, 2, 3].into_iter().collect();
        let subgraph = graph.create_subgraph(&subset);
        assert_eq!(subgraph.get_vertex_count(), 3);
        assert_eq!(subgraph.get_edge_count(), 3);
        assert!((subgraph.get_total_weight() - 15.0).abs() < 1e-9);
        // The bridge (3,4) crosses the cut, it must not survive.
        assert!(!subgraph.has_vertex(&4));
        assert_invariants(&subgraph);
    }

    #[test]
    fn test_subgraph_foreign_vertex_is_isolated() {
        let graph = two_triangles();
        let subset: BTreeSet<u32> = [1, 2, 99].into_iter().collect();
        let subgraph = graph.create_subgraph(&subset);
        assert_eq!(subgraph.get_vertex_count(), 3);
        assert_eq!(subgraph.get_edge_count(), 1);
        assert_eq!(subgraph.get_degree(&99).unwrap(), 0);
        assert_invariants(&subgraph);
    }

    /// Random add/remove workload, invariants re-checked after every single
    /// mutation.
    #[test]
    fn test_random_mutations_keep_invariants() {
        let mut rng = rand::thread_rng();
        let mut graph = WeightedGraph::<u32>::new();

        for _ in 0..500 {
            let op = rng.gen_range(0..4);
            match op {
                0 => {
                    let u = rng.gen_range(0..30u32);
                    let v = rng.gen_range(0..30u32);
                    let weight = rng.gen_range(0.0..10.0);
                    // Rejections are fine, drift is not.
                    let _ = graph.add_edge(u, v, weight);
                }
                1 => {
                    let vertex = rng.gen_range(0..30u32);
                    if !graph.has_vertex(&vertex) {
                        graph.add_vertex(vertex).unwrap();
                    }
                }
                2 => {
                    let existing: Vec<_> = graph.edges().collect();
                    if let Some(&(u, v, _)) = existing.choose(&mut rng) {
                        graph.remove_edge(&u, &v).unwrap();
                    }
                }
                _ => {
                    let vertex = rng.gen_range(0..30u32);
                    graph.remove_vertex(&vertex);
                }
            }
            assert_invariants(&graph);
        }
    }
}
