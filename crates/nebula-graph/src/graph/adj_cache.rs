//! Adjacency cache used by [`Graph`](super::Graph).
//!
//! Degree, neighbor and incident-edge queries run once per node in most pipeline stages, so
//! they read from a CSR index that is rebuilt lazily after any structural mutation.

#[derive(Debug, Clone)]
pub(in crate::graph) struct AdjCache {
    pub(in crate::graph) generation: u64,
    out_offsets: Vec<usize>,
    out_edges: Vec<usize>,
    in_offsets: Vec<usize>,
    in_edges: Vec<usize>,
}

impl AdjCache {
    pub(in crate::graph) fn build(
        generation: u64,
        node_count: usize,
        endpoints: impl Iterator<Item = (usize, usize)> + Clone,
    ) -> Self {
        let mut out_offsets = vec![0usize; node_count + 1];
        let mut in_offsets = vec![0usize; node_count + 1];
        for (v, w) in endpoints.clone() {
            out_offsets[v + 1] += 1;
            in_offsets[w + 1] += 1;
        }
        for i in 0..node_count {
            out_offsets[i + 1] += out_offsets[i];
            in_offsets[i + 1] += in_offsets[i];
        }

        let mut out_edges = vec![0usize; out_offsets[node_count]];
        let mut in_edges = vec![0usize; in_offsets[node_count]];
        let mut out_fill = out_offsets.clone();
        let mut in_fill = in_offsets.clone();
        for (edge_ix, (v, w)) in endpoints.enumerate() {
            out_edges[out_fill[v]] = edge_ix;
            out_fill[v] += 1;
            in_edges[in_fill[w]] = edge_ix;
            in_fill[w] += 1;
        }

        Self {
            generation,
            out_offsets,
            out_edges,
            in_offsets,
            in_edges,
        }
    }

    pub(in crate::graph) fn out_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.out_offsets[v_ix];
        let end = self.out_offsets[v_ix + 1];
        &self.out_edges[start..end]
    }

    pub(in crate::graph) fn in_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.in_offsets[v_ix];
        let end = self.in_offsets[v_ix + 1];
        &self.in_edges[start..end]
    }
}
