//! Interaction state consumed by a renderer: hover, search, selection.
//!
//! The renderer owns drawing. It reads [`InteractionState`] and asks [`node_display`] and
//! [`edge_display`] for per-item overrides on every refresh.

use crate::error::{Error, Result};
use crate::model::{NebulaGraph, NodeAttributes};
use indexmap::IndexSet;
use serde::Serialize;

/// Color used for nodes pushed into the background.
pub const DIMMED_COLOR: &str = "#f6f6f6";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub hovered_node: Option<String>,
    pub hovered_neighbors: Option<IndexSet<String>>,
    pub search_query: String,
    /// Set only when the query matches exactly one label, exactly.
    pub selected_node: Option<String>,
    pub suggestions: Option<IndexSet<String>>,
}

/// Nodes and edges a hover change asks the renderer to refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimmed {
    pub nodes: IndexSet<String>,
    pub edges: IndexSet<String>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the query and derives the selection or the suggestion set.
    ///
    /// Matching is a case-insensitive substring test on labels. A single match whose label equals
    /// the query exactly becomes the selection; otherwise every match is a suggestion.
    pub fn set_search_query(&mut self, graph: &NebulaGraph, query: &str) {
        self.search_query = query.to_string();
        if query.is_empty() {
            self.selected_node = None;
            self.suggestions = None;
            return;
        }

        let needle = query.to_lowercase();
        let matches: Vec<(&str, &str)> = graph
            .iter_nodes()
            .filter(|(_, a)| a.label.to_lowercase().contains(&needle))
            .map(|(id, a)| (id, a.label.as_str()))
            .collect();

        match matches.as_slice() {
            [(id, label)] if *label == query => {
                self.selected_node = Some((*id).to_string());
                self.suggestions = None;
            }
            _ => {
                self.selected_node = None;
                self.suggestions = Some(matches.iter().map(|(id, _)| (*id).to_string()).collect());
            }
        }
    }

    /// Records (or, with `None`, clears) the hovered node.
    ///
    /// The returned sets are computed against the hover in effect when the call starts, after
    /// recording a new node: every node that is neither hovered nor a neighbor, and every edge
    /// touching one of those nodes.
    pub fn set_hovered_node(&mut self, graph: &NebulaGraph, node: Option<&str>) -> Dimmed {
        if let Some(node) = node {
            self.hovered_node = Some(node.to_string());
            self.hovered_neighbors = Some(
                graph
                    .neighbors(node)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            );
        }

        let nodes: IndexSet<String> = graph
            .nodes()
            .filter(|n| {
                self.hovered_node.as_deref() != Some(*n)
                    && !self
                        .hovered_neighbors
                        .as_ref()
                        .is_some_and(|set| set.contains(*n))
            })
            .map(str::to_string)
            .collect();
        let edges: IndexSet<String> = graph
            .edges()
            .filter(|e| nodes.contains(e.source) || nodes.contains(e.target))
            .map(|e| e.key.to_string())
            .collect();

        if node.is_none() {
            self.hovered_node = None;
            self.hovered_neighbors = None;
        }
        Dimmed { nodes, edges }
    }
}

/// Per-node overrides derived from the interaction state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDisplay {
    pub label: String,
    pub color: Option<String>,
    pub highlighted: bool,
    pub force_label: bool,
    pub hidden: bool,
}

pub fn node_display(state: &InteractionState, key: &str, attrs: &NodeAttributes) -> NodeDisplay {
    let mut out = NodeDisplay {
        label: attrs.label.clone(),
        color: attrs.color.clone(),
        highlighted: attrs.highlighted,
        force_label: false,
        hidden: attrs.hidden,
    };
    let dim = |out: &mut NodeDisplay| {
        out.label.clear();
        out.color = Some(DIMMED_COLOR.to_string());
    };

    let outside_hover = state
        .hovered_neighbors
        .as_ref()
        .is_some_and(|n| !n.contains(key) && state.hovered_node.as_deref() != Some(key));
    if outside_hover {
        dim(&mut out);
    }

    if state.selected_node.as_deref() == Some(key) {
        out.highlighted = true;
    } else if let Some(suggestions) = &state.suggestions {
        if suggestions.contains(key) {
            out.force_label = true;
        } else {
            dim(&mut out);
        }
    }
    out
}

/// Per-edge overrides derived from the interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeDisplay {
    pub hidden: bool,
}

/// `None` when `edge` is not in `graph`.
pub fn edge_display(state: &InteractionState, graph: &NebulaGraph, edge: &str) -> Option<EdgeDisplay> {
    let (source, target) = graph.edge_endpoints(edge)?;
    let off_hover = state
        .hovered_node
        .as_deref()
        .is_some_and(|h| source != h && target != h);
    let off_suggestions = state
        .suggestions
        .as_ref()
        .is_some_and(|s| !s.contains(source) || !s.contains(target));
    Some(EdgeDisplay {
        hidden: off_hover || off_suggestions,
    })
}

/// Moves a node, as a drag interaction would.
pub fn move_node(graph: &mut NebulaGraph, key: &str, x: f64, y: f64) -> Result<()> {
    let attrs = graph.node_mut(key).ok_or_else(|| Error::UnknownNode {
        key: key.to_string(),
    })?;
    attrs.x = x;
    attrs.y = y;
    Ok(())
}
