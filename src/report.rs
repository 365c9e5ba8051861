//! Console reporting for partitions and assignment comparisons.

use itertools::{Itertools, MinMaxResult};

use crate::community::Community;
use crate::compare;
use crate::types::VertexId;

/// Print size statistics for one partition.
pub fn print_community_statistics<V: VertexId>(communities: &[Community<V>]) {
    let total_nodes: usize = communities.iter().map(|community| community.size()).sum();
    println!("Communities: {}", communities.len());
    println!("Assigned vertices: {}", total_nodes);

    match communities.iter().map(|community| community.size()).minmax() {
        MinMaxResult::NoElements => {}
        MinMaxResult::OneElement(size) => {
            println!("Community sizes: {} (single community)", size);
        }
        MinMaxResult::MinMax(min, max) => {
            let mean = total_nodes as f64 / communities.len() as f64;
            println!("Community sizes: min {}, max {}, mean {:.2}", min, max, mean);
        }
    }

    for (label, community) in communities.iter().enumerate() {
        println!("Community {}: {} vertices", label, community.size());
    }
}

/// Print a side-by-side comparison of a predicted assignment against ground
/// truth: node coverage, per-truth-community best overlap, and NMI.
pub fn compare_community_assignments<V: VertexId>(
    truth: &[Community<V>],
    predicted: &[Community<V>],
) {
    let truth_nodes = compare::node_set(truth);
    let pred_nodes = compare::node_set(predicted);
    let common = compare::common_nodes(truth, predicted);

    println!("Ground truth: {} communities over {} vertices", truth.len(), truth_nodes.len());
    println!("Predicted: {} communities over {} vertices", predicted.len(), pred_nodes.len());
    println!("Common vertices: {}", common.len());

    for (label, truth_community) in truth.iter().enumerate() {
        // The predicted community sharing the most members with this one.
        let best = predicted
            .iter()
            .enumerate()
            .map(|(pred_label, pred_community)| {
                (
                    pred_label,
                    truth_community.create_intersection(pred_community).size(),
                )
            })
            .max_by_key(|&(_, overlap)| overlap);
        match best {
            None => println!("Truth community {}: no predicted counterpart", label),
            Some((pred_label, overlap)) => {
                println!(
                    "Truth community {} ({} vertices): best match predicted {} ({} shared)",
                    label,
                    truth_community.size(),
                    pred_label,
                    overlap
                );
            }
        }
    }

    let nmi = compare::calculate_nmi(truth, predicted);
    println!("NMI: {:.6}", nmi);
}
