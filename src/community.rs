use std::collections::BTreeSet;
use std::sync::Arc;

use crate::graph::WeightedGraph;
use crate::types::{VertexId, Weight};

/// A group of vertices scored against one shared graph snapshot.
///
/// The internal/external weight pair is valid only relative to the graph it
/// was last computed against, held here as a shared read-only handle. Editing
/// the member set marks the cached pair stale instead of refreshing it;
/// `merge` is the one mutation that recomputes eagerly, so that communities
/// scored earlier stay self-consistent across merges. Callers editing members
/// directly must call `calculate_weights` again before trusting the scores.
#[derive(Debug, Clone)]
pub struct Community<V: VertexId> {
    members: BTreeSet<V>, // Vertices in this community.
    internal_weight: Weight, // Half the weight sum of edges with both endpoints inside.
    external_weight: Weight, // Half the weight sum of edges with one endpoint inside.
    scored_graph: Option<Arc<WeightedGraph<V>>>, // Graph the weights were computed against.
    stale: bool, // Members changed since the last recompute.
}

impl<V: VertexId> Default for Community<V> {
    fn default() -> Community<V> {
        Community::new()
    }
}

impl<V: VertexId> PartialEq for Community<V> {
    /// Two communities are equal iff their member sets are equal. Cached
    /// weights and the scored graph are not part of identity.
    fn eq(&self, other: &Community<V>) -> bool {
        self.members == other.members
    }
}

impl<V: VertexId> Eq for Community<V> {}

impl<V: VertexId> FromIterator<V> for Community<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Community<V> {
        Community {
            members: iter.into_iter().collect(),
            ..Community::new()
        }
    }
}

impl<V: VertexId> Community<V> {
    pub fn new() -> Community<V> {
        Community {
            members: BTreeSet::new(),
            internal_weight: 0.0,
            external_weight: 0.0,
            scored_graph: None,
            stale: false,
        }
    }

    /// Insert a vertex. Cached weights are marked stale, not refreshed.
    pub fn add_node(&mut self, node: V) {
        if self.members.insert(node) {
            self.stale = true;
        }
    }

    /// Remove a vertex. Cached weights are marked stale, not refreshed.
    pub fn remove_node(&mut self, node: &V) {
        if self.members.remove(node) {
            self.stale = true;
        }
    }

    pub fn contains_node(&self, node: &V) -> bool {
        self.members.contains(node)
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Read-only view of the member set.
    pub fn get_members(&self) -> &BTreeSet<V> {
        &self.members
    }

    /// Members as a sorted sequence, for reproducible output order.
    pub fn get_members_ordered(&self) -> Vec<V> {
        self.members.iter().copied().collect()
    }

    /// Union `other`'s members into this community.
    ///
    /// If this community has been scored before, the weights are recomputed
    /// immediately against the cached graph. Otherwise the merge behaves like
    /// a plain member edit.
    pub fn merge(&mut self, other: &Community<V>) {
        self.members.extend(other.members.iter().copied());
        match self.scored_graph.clone() {
            Some(graph) => self.calculate_weights(&graph),
            None => self.stale = true,
        }
    }

    /// Pure set union. The result carries no cached graph; score it
    /// explicitly before reading its weights.
    pub fn create_union(&self, other: &Community<V>) -> Community<V> {
        self.members.union(&other.members).copied().collect()
    }

    /// Pure set intersection, same caveats as `create_union`.
    pub fn create_intersection(&self, other: &Community<V>) -> Community<V> {
        self.members.intersection(&other.members).copied().collect()
    }

    /// Score this community against a graph.
    ///
    /// Walks every distinct edge once and classifies it: both endpoints
    /// inside adds to the internal sum, exactly one inside adds to the
    /// external sum, neither is ignored. Both totals are then halved; the
    /// reported weights are the established per-endpoint-share contract
    /// (half the raw qualifying edge-weight sums), which downstream
    /// consumers and the scenario fixtures rely on.
    pub fn calculate_weights(&mut self, graph: &Arc<WeightedGraph<V>>) {
        self.scored_graph = Some(Arc::clone(graph));
        self.internal_weight = 0.0;
        self.external_weight = 0.0;

        for (u, v, weight) in graph.edges() {
            let u_inside = self.members.contains(&u);
            let v_inside = self.members.contains(&v);
            if u_inside && v_inside {
                self.internal_weight += weight;
            } else if u_inside || v_inside {
                self.external_weight += weight;
            }
        }

        self.internal_weight /= 2.0;
        self.external_weight /= 2.0;
        self.stale = false;
    }

    pub fn get_internal_weight(&self) -> Weight {
        self.internal_weight
    }

    pub fn get_external_weight(&self) -> Weight {
        self.external_weight
    }

    /// Whether the member set changed since the weights were last computed.
    pub fn weights_stale(&self) -> bool {
        self.stale
    }

    /// The graph the weights were last computed against, if any.
    pub fn scored_graph(&self) -> Option<&Arc<WeightedGraph<V>>> {
        self.scored_graph.as_ref()
    }
}
