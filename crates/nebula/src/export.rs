//! Graphology-style JSON serialization of an analysis.

use crate::community::{CommunityDetails, ModularityDetails};
use crate::model::{EdgeAttributes, GraphAttributes, Hierarchy, NebulaGraph, NodeAttributes};
use crate::pipeline::Analysis;
use crate::schema::Schema;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedGraph<'a> {
    pub attributes: &'a GraphAttributes,
    pub options: SerializedOptions,
    pub nodes: Vec<SerializedNode<'a>>,
    pub edges: Vec<SerializedEdge<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedOptions {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub multi: bool,
    pub allow_self_loops: bool,
}

#[derive(Debug, Serialize)]
pub struct SerializedNode<'a> {
    pub key: &'a str,
    pub attributes: &'a NodeAttributes,
}

#[derive(Debug, Serialize)]
pub struct SerializedEdge<'a> {
    pub key: &'a str,
    pub source: &'a str,
    pub target: &'a str,
    pub attributes: &'a EdgeAttributes,
}

pub fn serialize_graph(graph: &NebulaGraph) -> SerializedGraph<'_> {
    SerializedGraph {
        attributes: graph.attrs(),
        options: SerializedOptions {
            kind: if graph.is_directed() {
                "directed"
            } else {
                "undirected"
            },
            multi: graph.is_multigraph(),
            allow_self_loops: graph.allows_self_loops(),
        },
        nodes: graph
            .iter_nodes()
            .map(|(key, attributes)| SerializedNode { key, attributes })
            .collect(),
        edges: graph
            .edges()
            .map(|e| SerializedEdge {
                key: e.key,
                source: e.source,
                target: e.target,
                attributes: e.attrs,
            })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOut<'a> {
    pub schema: Schema,
    pub hierarchy: Hierarchy,
    pub cluster_count: usize,
    pub graph: SerializedGraph<'a>,
    pub community_details: &'a CommunityDetails,
    pub modularity_details: &'a ModularityDetails,
}

impl<'a> From<&'a Analysis> for AnalysisOut<'a> {
    fn from(a: &'a Analysis) -> Self {
        Self {
            schema: a.schema,
            hierarchy: a.hierarchy,
            cluster_count: a.cluster_count(),
            graph: serialize_graph(&a.graph),
            community_details: &a.community,
            modularity_details: &a.modularity,
        }
    }
}

pub fn to_value(analysis: &Analysis) -> serde_json::Result<Value> {
    serde_json::to_value(AnalysisOut::from(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::new_graph;
    use serde_json::json;

    #[test]
    fn graph_serializes_in_graphology_shape() {
        let mut g = new_graph();
        g.add_node(
            "a",
            NodeAttributes {
                label: "A".to_string(),
                size: 10.0,
                community: Some(0),
                ..NodeAttributes::default()
            },
        )
        .unwrap();
        g.add_edge(
            "loop",
            "a",
            "a",
            EdgeAttributes {
                size: Some(1.5),
                weight: None,
            },
        )
        .unwrap();

        let v = serde_json::to_value(serialize_graph(&g)).unwrap();
        assert_eq!(
            v,
            json!({
                "attributes": {},
                "options": { "type": "directed", "multi": true, "allowSelfLoops": true },
                "nodes": [{
                    "key": "a",
                    "attributes": { "x": 0.0, "y": 0.0, "size": 10.0, "label": "A", "community": 0 }
                }],
                "edges": [{
                    "key": "loop", "source": "a", "target": "a",
                    "attributes": { "size": 1.5 }
                }]
            })
        );
    }
}
