//! Graph container.
//!
//! This module contains the core `Graph` container plus a small set of helper algorithms
//! re-exported as `nebula_graph::alg`.

mod adj_cache;
pub mod alg;
mod entries;
mod options;

pub use options::GraphOptions;

use crate::error::{Error, Result};
use adj_cache::AdjCache;
use entries::{EdgeEntry, NodeEntry};
use rustc_hash::FxBuildHasher;
use std::cell::{Ref, RefCell};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Borrowed view of one edge.
#[derive(Debug)]
pub struct EdgeRef<'a, E> {
    pub key: &'a str,
    pub source: &'a str,
    pub target: &'a str,
    pub attrs: &'a E,
}

impl<E> Clone for EdgeRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EdgeRef<'_, E> {}

impl<E> EdgeRef<'_, E> {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn has_extremity(&self, node: &str) -> bool {
        self.source == node || self.target == node
    }
}

/// Attributed graph with node attributes `N`, edge attributes `E` and graph attributes `G`.
#[derive(Debug, Clone)]
pub struct Graph<N, E, G = ()> {
    options: GraphOptions,

    attrs: G,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<String, usize>,

    // Endpoint pairs already linked; consulted only for simple (non-multi) graphs.
    pair_index: HashSet<(usize, usize)>,

    // Note: interior mutability keeps the query APIs on `&self`.
    adj_gen: u64,
    adj_cache: RefCell<Option<AdjCache>>,
}

impl<N, E, G: Default> Graph<N, E, G> {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            attrs: G::default(),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            pair_index: HashSet::default(),
            adj_gen: 0,
            adj_cache: RefCell::new(None),
        }
    }

    /// Returns the sub-graph induced by the nodes accepted by `keep`: every accepted node and
    /// exactly the edges whose two endpoints are accepted. Graph attributes start from default.
    pub fn subgraph<F>(&self, mut keep: F) -> Self
    where
        N: Clone,
        E: Clone,
        F: FnMut(&str, &N) -> bool,
    {
        let mut out = Self::new(self.options);
        let mut remap: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for (ix, n) in self.nodes.iter().enumerate() {
            if keep(&n.id, &n.attrs) {
                remap[ix] = Some(out.nodes.len());
                out.nodes.push(n.clone());
            }
        }
        for e in &self.edges {
            if let (Some(v_ix), Some(w_ix)) = (remap[e.v_ix], remap[e.w_ix]) {
                out.edges.push(EdgeEntry {
                    key: e.key.clone(),
                    v_ix,
                    w_ix,
                    attrs: e.attrs.clone(),
                });
            }
        }
        out.reindex();
        out
    }
}

impl<N, E, G> Graph<N, E, G> {
    fn invalidate_adj(&mut self) {
        self.adj_gen = self.adj_gen.wrapping_add(1);
        *self.adj_cache.get_mut() = None;
    }

    fn ensure_adj(&self) -> Ref<'_, AdjCache> {
        {
            let generation = self.adj_gen;
            let mut cache = self.adj_cache.borrow_mut();
            let stale = cache
                .as_ref()
                .map(|c| c.generation != generation)
                .unwrap_or(true);
            if stale {
                *cache = Some(AdjCache::build(
                    generation,
                    self.nodes.len(),
                    self.edges.iter().map(|e| (e.v_ix, e.w_ix)),
                ));
            }
        }
        Ref::map(self.adj_cache.borrow(), |c| {
            c.as_ref()
                .expect("adjacency cache should be present after ensure")
        })
    }

    fn pair_key(&self, v_ix: usize, w_ix: usize) -> (usize, usize) {
        if self.options.directed || v_ix <= w_ix {
            (v_ix, w_ix)
        } else {
            (w_ix, v_ix)
        }
    }

    fn reindex(&mut self) {
        self.node_index.clear();
        for (i, n) in self.nodes.iter().enumerate() {
            self.node_index.insert(n.id.clone(), i);
        }
        self.edge_index.clear();
        self.pair_index.clear();
        for i in 0..self.edges.len() {
            let key = self.pair_key(self.edges[i].v_ix, self.edges[i].w_ix);
            self.pair_index.insert(key);
            self.edge_index.insert(self.edges[i].key.clone(), i);
        }
        self.invalidate_adj();
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn is_multigraph(&self) -> bool {
        self.options.multigraph
    }

    pub fn allows_self_loops(&self) -> bool {
        self.options.allow_self_loops
    }

    pub fn attrs(&self) -> &G {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut G {
        &mut self.attrs
    }

    pub fn set_attrs(&mut self, attrs: G) -> &mut Self {
        self.attrs = attrs;
        self
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn add_node(&mut self, id: impl Into<String>, attrs: N) -> Result<()> {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return Err(Error::DuplicateNode { key: id });
        }
        self.invalidate_adj();
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            attrs,
        });
        self.node_index.insert(id, idx);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].attrs)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].attrs)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (&str, &N)> {
        self.nodes.iter().map(|n| (n.id.as_str(), &n.attrs))
    }

    pub fn iter_nodes_mut(&mut self) -> impl Iterator<Item = (&str, &mut N)> {
        self.nodes.iter_mut().map(|n| (n.id.as_str(), &mut n.attrs))
    }

    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(&str, &N),
    {
        for n in &self.nodes {
            f(&n.id, &n.attrs);
        }
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.attrs);
        }
    }

    pub fn add_edge(
        &mut self,
        key: impl Into<String>,
        source: &str,
        target: &str,
        attrs: E,
    ) -> Result<()> {
        let key = key.into();
        if self.edge_index.contains_key(&key) {
            return Err(Error::DuplicateEdge { key });
        }
        let Some(&v_ix) = self.node_index.get(source) else {
            return Err(Error::MissingNode {
                edge: key,
                node: source.to_string(),
            });
        };
        let Some(&w_ix) = self.node_index.get(target) else {
            return Err(Error::MissingNode {
                edge: key,
                node: target.to_string(),
            });
        };
        if v_ix == w_ix && !self.options.allow_self_loops {
            return Err(Error::SelfLoop {
                edge: key,
                node: source.to_string(),
            });
        }
        let pair = self.pair_key(v_ix, w_ix);
        if !self.options.multigraph && self.pair_index.contains(&pair) {
            return Err(Error::ParallelEdge {
                edge: key,
                from: source.to_string(),
                to: target.to_string(),
            });
        }

        self.invalidate_adj();
        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            key: key.clone(),
            v_ix,
            w_ix,
            attrs,
        });
        self.edge_index.insert(key, idx);
        self.pair_index.insert(pair);
        Ok(())
    }

    pub fn has_edge(&self, key: &str) -> bool {
        self.edge_index.contains_key(key)
    }

    /// Whether at least one edge links `source` to `target` (either way on undirected graphs).
    pub fn has_edge_between(&self, source: &str, target: &str) -> bool {
        let (Some(&v_ix), Some(&w_ix)) = (self.node_index.get(source), self.node_index.get(target))
        else {
            return false;
        };
        self.pair_index.contains(&self.pair_key(v_ix, w_ix))
    }

    pub fn edge(&self, key: &str) -> Option<&E> {
        self.edge_index.get(key).map(|&idx| &self.edges[idx].attrs)
    }

    pub fn edge_mut(&mut self, key: &str) -> Option<&mut E> {
        self.edge_index
            .get(key)
            .copied()
            .map(move |idx| &mut self.edges[idx].attrs)
    }

    pub fn edge_endpoints(&self, key: &str) -> Option<(&str, &str)> {
        let idx = *self.edge_index.get(key)?;
        Some(self.endpoints_at(idx))
    }

    fn endpoints_at(&self, idx: usize) -> (&str, &str) {
        let e = &self.edges[idx];
        (
            self.nodes[e.v_ix].id.as_str(),
            self.nodes[e.w_ix].id.as_str(),
        )
    }

    fn edge_ref_at(&self, idx: usize) -> EdgeRef<'_, E> {
        let (source, target) = self.endpoints_at(idx);
        EdgeRef {
            key: self.edges[idx].key.as_str(),
            source,
            target,
            attrs: &self.edges[idx].attrs,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_, E>> {
        (0..self.edges.len()).map(move |idx| self.edge_ref_at(idx))
    }

    pub fn edge_keys(&self) -> Vec<String> {
        self.edges.iter().map(|e| e.key.clone()).collect()
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut E),
    {
        for e in &mut self.edges {
            f(&e.key, &mut e.attrs);
        }
    }

    pub fn has_extremity(&self, edge: &str, node: &str) -> bool {
        self.edge_endpoints(edge)
            .is_some_and(|(source, target)| source == node || target == node)
    }

    pub fn remove_edge(&mut self, key: &str) -> bool {
        let Some(idx) = self.edge_index.get(key).copied() else {
            return false;
        };
        self.edges.remove(idx);
        self.reindex();
        true
    }

    /// Keeps the nodes accepted by `keep` and drops every other node together with all of its
    /// incident edges. Returns the number of removed nodes.
    pub fn retain_nodes<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &N) -> bool,
    {
        let mut remap: Vec<Option<usize>> = Vec::with_capacity(self.nodes.len());
        let mut next = 0usize;
        for n in &self.nodes {
            if keep(&n.id, &n.attrs) {
                remap.push(Some(next));
                next += 1;
            } else {
                remap.push(None);
            }
        }
        let removed = self.nodes.len() - next;
        if removed == 0 {
            return 0;
        }

        let mut ix = 0usize;
        self.nodes.retain(|_| {
            let kept = remap[ix].is_some();
            ix += 1;
            kept
        });
        self.edges
            .retain(|e| remap[e.v_ix].is_some() && remap[e.w_ix].is_some());
        for e in &mut self.edges {
            e.v_ix = remap[e.v_ix].unwrap_or(e.v_ix);
            e.w_ix = remap[e.w_ix].unwrap_or(e.w_ix);
        }
        self.reindex();
        removed
    }

    /// Removes `id` and every edge incident to it.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if !self.has_node(id) {
            return false;
        }
        self.retain_nodes(|n, _| n != id);
        true
    }

    pub fn out_degree(&self, v: &str) -> usize {
        let Some(&v_ix) = self.node_index.get(v) else {
            return 0;
        };
        self.ensure_adj().out_edges(v_ix).len()
    }

    pub fn in_degree(&self, v: &str) -> usize {
        let Some(&v_ix) = self.node_index.get(v) else {
            return 0;
        };
        self.ensure_adj().in_edges(v_ix).len()
    }

    /// Number of incident edge endpoints; a self-loop contributes two.
    pub fn degree(&self, v: &str) -> usize {
        let Some(&v_ix) = self.node_index.get(v) else {
            return 0;
        };
        let cache = self.ensure_adj();
        cache.out_edges(v_ix).len() + cache.in_edges(v_ix).len()
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.neighbors(v);
        }
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        let mut out: Vec<&str> = Vec::with_capacity(cache.out_edges(v_ix).len());
        for &edge_ix in cache.out_edges(v_ix) {
            let w = self.nodes[self.edges[edge_ix].w_ix].id.as_str();
            if !out.contains(&w) {
                out.push(w);
            }
        }
        out
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.neighbors(v);
        }
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        let mut out: Vec<&str> = Vec::with_capacity(cache.in_edges(v_ix).len());
        for &edge_ix in cache.in_edges(v_ix) {
            let u = self.nodes[self.edges[edge_ix].v_ix].id.as_str();
            if !out.contains(&u) {
                out.push(u);
            }
        }
        out
    }

    /// Distinct nodes adjacent to `v` regardless of direction, in first-seen order.
    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        let mut seen: HashSet<usize> = HashSet::default();
        let mut out: Vec<&str> = Vec::new();
        for &edge_ix in cache.out_edges(v_ix) {
            let w_ix = self.edges[edge_ix].w_ix;
            if seen.insert(w_ix) {
                out.push(self.nodes[w_ix].id.as_str());
            }
        }
        for &edge_ix in cache.in_edges(v_ix) {
            let u_ix = self.edges[edge_ix].v_ix;
            if seen.insert(u_ix) {
                out.push(self.nodes[u_ix].id.as_str());
            }
        }
        out
    }

    /// Keys of the edges incident to `v`, each listed once.
    pub fn node_edges(&self, v: &str) -> Vec<&str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        let cache = self.ensure_adj();
        let mut out: Vec<&str> = Vec::new();
        for &edge_ix in cache.out_edges(v_ix) {
            out.push(self.edges[edge_ix].key.as_str());
        }
        for &edge_ix in cache.in_edges(v_ix) {
            // Self-loops already appeared among the out-edges.
            if self.edges[edge_ix].v_ix != v_ix {
                out.push(self.edges[edge_ix].key.as_str());
            }
        }
        out
    }
}
