//! Drill-down into a single cluster.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::{Hierarchy, NebulaGraph};
use crate::pipeline::{Analysis, Pipeline};
use crate::schema::Schema;

#[derive(Debug, Clone)]
pub enum DrillDown {
    /// The cluster's induced sub-graph, re-analysed with the native pipeline.
    Extracted(Box<Analysis>),
    /// `depth` already reached the bound; nothing was extracted.
    DepthExceeded,
}

impl DrillDown {
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            DrillDown::Extracted(a) => Some(a),
            DrillDown::DepthExceeded => None,
        }
    }
}

/// Induced sub-graph of the nodes whose `hierarchy` attribute stringifies to `cluster`. An edge
/// is kept iff both of its endpoints are.
pub fn extract(graph: &NebulaGraph, hierarchy: Hierarchy, cluster: &str) -> NebulaGraph {
    graph.subgraph(|_, a| a.cluster(hierarchy).as_deref() == Some(cluster))
}

/// Extracts `cluster` from `parent` and runs it back through cropping, sizing, layout and
/// community detection. `depth` is the depth of `parent`; once it reaches `max_depth` the call
/// returns [`DrillDown::DepthExceeded`].
pub fn drill_down(
    parent: &Analysis,
    cluster: &str,
    depth: usize,
    max_depth: usize,
    config: &PipelineConfig,
) -> Result<DrillDown> {
    if depth >= max_depth {
        tracing::debug!(depth, max_depth, "drill-down depth bound reached");
        return Ok(DrillDown::DepthExceeded);
    }
    let sub = extract(&parent.graph, parent.hierarchy, cluster);
    tracing::debug!(
        cluster,
        hierarchy = %parent.hierarchy,
        nodes = sub.node_count(),
        edges = sub.edge_count(),
        "extracted sub-graph"
    );
    let analysis = Pipeline::for_schema(Schema::Native, config.clone()).run(sub)?;
    Ok(DrillDown::Extracted(Box::new(analysis)))
}
