//! Canonical attribute records carried by the analysed graph.

use nebula_graph::{Graph, GraphOptions};
use serde::{Deserialize, Serialize};

/// The graph every pipeline stage mutates in place.
pub type NebulaGraph = Graph<NodeAttributes, EdgeAttributes, GraphAttributes>;

/// Options shared by both input flavors: directed multigraph with self-loops.
pub fn graph_options() -> GraphOptions {
    GraphOptions::directed_multi()
}

pub fn new_graph() -> NebulaGraph {
    Graph::new(graph_options())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttributes {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Louvain community id, contiguous from 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<usize>,
    /// Class assigned upstream (Gephi's modularity statistic). Ids may be sparse.
    #[serde(
        default,
        rename = "modularity_class",
        skip_serializing_if = "Option::is_none"
    )]
    pub modularity_class: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

impl NodeAttributes {
    /// The cluster id under `hierarchy`, stringified the way cluster selections name it.
    pub fn cluster(&self, hierarchy: Hierarchy) -> Option<String> {
        match hierarchy {
            Hierarchy::Community => self.community.map(|c| c.to_string()),
            Hierarchy::ModularityClass => self.modularity_class.map(|c| c.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl EdgeAttributes {
    /// Weight used by community detection and layout attraction: `weight`, then `size`, then 1.
    pub fn effective_weight(&self) -> f64 {
        self.weight
            .or(self.size)
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Number of distinct upstream modularity classes (Gephi input only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modularity_count: Option<usize>,
}

/// Node attribute that names a node's cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hierarchy {
    /// Computed Louvain community.
    Community,
    /// Pre-assigned class from the input document.
    ModularityClass,
}

impl Hierarchy {
    pub fn attribute(self) -> &'static str {
        match self {
            Hierarchy::Community => "community",
            Hierarchy::ModularityClass => "modularity_class",
        }
    }
}

impl std::fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.attribute())
    }
}
