//! Structural reduction.

use crate::model::NebulaGraph;
use nebula_graph::alg;
use rustc_hash::FxHashSet;

/// Keeps only the largest connected component (edge direction ignored; ties go to the component
/// discovered first in node order). Returns the number of removed nodes.
pub fn crop_to_largest_component(graph: &mut NebulaGraph) -> usize {
    let Some(largest) = alg::largest_component(graph) else {
        return 0;
    };
    if largest.len() == graph.node_count() {
        return 0;
    }
    let keep: FxHashSet<String> = largest.into_iter().collect();
    let removed = graph.retain_nodes(|id, _| keep.contains(id));
    tracing::debug!(removed, kept = graph.node_count(), "cropped to largest component");
    removed
}
