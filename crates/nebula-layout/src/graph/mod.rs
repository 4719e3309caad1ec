use crate::error::{Error, Result};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn validate(&self) -> Result<()> {
        let index = self.node_index();
        for e in &self.edges {
            if !index.contains_key(e.source.as_str()) || !index.contains_key(e.target.as_str()) {
                return Err(Error::MissingEndpoint {
                    edge_id: e.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn node_index(&self) -> FxHashMap<&str, usize> {
        let mut index = FxHashMap::default();
        for (i, n) in self.nodes.iter().enumerate() {
            index.insert(n.id.as_str(), i);
        }
        index
    }

    /// Edges as `(source index, target index, weight)`. Call [`Graph::validate`] first.
    pub(crate) fn edge_indices(&self) -> Vec<(usize, usize, f64)> {
        let index = self.node_index();
        self.edges
            .iter()
            .filter_map(|e| {
                let s = *index.get(e.source.as_str())?;
                let t = *index.get(e.target.as_str())?;
                Some((s, t, e.weight))
            })
            .collect()
    }

    /// Incident edge endpoints per node; a self-loop counts twice.
    pub fn degrees(&self) -> Vec<usize> {
        let mut out = vec![0usize; self.nodes.len()];
        for (s, t, _) in self.edge_indices() {
            out[s] += 1;
            out[t] += 1;
        }
        out
    }

    pub fn positions(&self) -> Vec<Point> {
        self.nodes
            .iter()
            .map(|n| Point { x: n.x, y: n.y })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Node radius, as sigma.js reads the `size` attribute.
    pub size: f64,
    /// Hierarchy path used by circle packing, outermost group first.
    pub groups: Vec<String>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            size: 1.0,
            groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
