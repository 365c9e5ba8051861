//! Partition comparison engine.
//!
//! Scores how well a predicted grouping of vertices matches a ground-truth
//! grouping, independent of any graph. Two partitions are aligned on their
//! common vertex set, converted to integer label vectors, and compared with
//! Normalized Mutual Information.
//!
//! A partition is a slice of [`Community`] values; a community's position in
//! the slice is its integer label.

use std::collections::{BTreeMap, BTreeSet};

use log::info;

use crate::community::Community;
use crate::types::VertexId;

/// Union of all members across a partition's communities.
pub fn node_set<V: VertexId>(partition: &[Community<V>]) -> BTreeSet<V> {
    partition
        .iter()
        .flat_map(|community| community.get_members().iter().copied())
        .collect()
}

/// Vertices present in both partitions.
pub fn common_nodes<V: VertexId>(
    partition_a: &[Community<V>],
    partition_b: &[Community<V>],
) -> BTreeSet<V> {
    node_set(partition_a)
        .intersection(&node_set(partition_b))
        .copied()
        .collect()
}

/// Label of the first community (in partition order) containing the vertex,
/// or `None` if no community does.
pub fn label_of<V: VertexId>(vertex: &V, partition: &[Community<V>]) -> Option<usize> {
    partition
        .iter()
        .position(|community| community.contains_node(vertex))
}

/// Vertex -> label map over a whole partition.
///
/// When a vertex appears in several communities of an overlapping input, the
/// last containing community wins. This differs from the first-match point
/// query `label_of` and is the documented policy for label-vector
/// construction, not an accident.
pub fn node_label_map<V: VertexId>(partition: &[Community<V>]) -> BTreeMap<V, usize> {
    let mut label_map = BTreeMap::new();
    for (label, community) in partition.iter().enumerate() {
        for node in community.get_members() {
            label_map.insert(*node, label);
        }
    }
    label_map
}

/// Align two vertex -> label maps on their common keys, in ascending vertex
/// order, and return the two label sequences. Vertices known to only one map
/// are excluded entirely.
pub fn label_vectors_from_maps<V: VertexId>(
    map_a: &BTreeMap<V, usize>,
    map_b: &BTreeMap<V, usize>,
) -> (Vec<usize>, Vec<usize>) {
    let mut labels_a = Vec::new();
    let mut labels_b = Vec::new();
    for (node, label_a) in map_a {
        if let Some(label_b) = map_b.get(node) {
            labels_a.push(*label_a);
            labels_b.push(*label_b);
        }
    }
    (labels_a, labels_b)
}

/// Restrict both partitions to their common vertex set and produce aligned
/// integer label vectors, ordered by ascending vertex.
pub fn to_label_vectors<V: VertexId>(
    truth: &[Community<V>],
    predicted: &[Community<V>],
) -> (Vec<usize>, Vec<usize>) {
    label_vectors_from_maps(&node_label_map(truth), &node_label_map(predicted))
}

/// Shannon entropy H = -sum(p * log2 p) over a discrete distribution.
/// Zero-probability terms contribute nothing (0 * log2 0 is taken as 0).
pub fn shannon_entropy(probabilities: &[f64]) -> f64 {
    probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// NMI between two aligned label sequences.
///
/// Builds empirical joint and marginal distributions by counting label
/// co-occurrences, then returns `2 * MI / (H(true) + H(pred))`. When both
/// sequences carry zero entropy (each side is a single group), the result is
/// 0 by definition rather than a division error. Empty sequences score 0.
pub fn normalized_mutual_information(true_labels: &[usize], pred_labels: &[usize]) -> f64 {
    debug_assert_eq!(true_labels.len(), pred_labels.len());
    let n = true_labels.len();
    if n == 0 || n != pred_labels.len() {
        return 0.0;
    }

    // Ordered maps keep the entropy summation order deterministic, which is
    // what makes identical partitions land exactly on 1.0.
    let mut true_counts = BTreeMap::<usize, usize>::new();
    let mut pred_counts = BTreeMap::<usize, usize>::new();
    let mut joint_counts = BTreeMap::<(usize, usize), usize>::new();
    for (&true_label, &pred_label) in true_labels.iter().zip(pred_labels) {
        *true_counts.entry(true_label).or_insert(0) += 1;
        *pred_counts.entry(pred_label).or_insert(0) += 1;
        *joint_counts.entry((true_label, pred_label)).or_insert(0) += 1;
    }

    let true_probs: Vec<f64> = true_counts.values().map(|&c| c as f64 / n as f64).collect();
    let pred_probs: Vec<f64> = pred_counts.values().map(|&c| c as f64 / n as f64).collect();
    let joint_probs: Vec<f64> = joint_counts
        .values()
        .map(|&c| c as f64 / n as f64)
        .collect();

    let h_true = shannon_entropy(&true_probs);
    let h_pred = shannon_entropy(&pred_probs);
    let h_joint = shannon_entropy(&joint_probs);

    let entropy_sum = h_true + h_pred;
    if entropy_sum == 0.0 {
        // Both sides are a single group; zero shared information by policy.
        return 0.0;
    }
    let mutual_information = h_true + h_pred - h_joint;
    2.0 * mutual_information / entropy_sum
}

/// Score a predicted partition against ground truth. Composes
/// `to_label_vectors` and `normalized_mutual_information`.
pub fn calculate_nmi<V: VertexId>(truth: &[Community<V>], predicted: &[Community<V>]) -> f64 {
    let (true_labels, pred_labels) = to_label_vectors(truth, predicted);
    normalized_mutual_information(&true_labels, &pred_labels)
}

/// Collect every truth vertex missing from the prediction into one appended
/// catch-all community, so later alignment covers the full truth node set.
pub fn handle_missing_nodes<V: VertexId>(
    predicted: &mut Vec<Community<V>>,
    truth_nodes: &BTreeSet<V>,
    pred_nodes: &BTreeSet<V>,
) {
    let missing: Community<V> = truth_nodes.difference(pred_nodes).copied().collect();
    if !missing.is_empty() {
        info!(
            "added {} missing vertices to a catch-all community",
            missing.size()
        );
        predicted.push(missing);
    }
}
