//! Community detection and cluster coloring.
//!
//! Communities are computed with the Louvain method (Blondel et al., 2008) on the undirected
//! view of the graph: repeated local moving of nodes between neighboring communities, followed
//! by aggregation of each community into a single node, until no move improves modularity.
//! Node visiting order is the graph's node order, so results are reproducible.

use crate::model::{Hierarchy, NebulaGraph};
use indexmap::IndexMap;
use nebula_layout::rng::XorShift64Star;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Louvain output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDetails {
    pub count: usize,
    /// Node key to community id; ids are contiguous in `0..count`.
    pub communities: IndexMap<String, usize>,
    pub modularity: f64,
    pub resolution: f64,
    /// Number of aggregation levels that improved the partition.
    pub levels: usize,
}

/// Pre-assigned classes read from the input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModularityDetails {
    /// Number of distinct class values. Ids may be sparse.
    pub count: usize,
    pub classes: IndexMap<String, i64>,
}

impl ModularityDetails {
    /// Collects the classes of the nodes present in `graph`.
    pub fn from_graph(graph: &NebulaGraph) -> Self {
        let classes: IndexMap<String, i64> = graph
            .iter_nodes()
            .filter_map(|(id, a)| a.modularity_class.map(|c| (id.to_string(), c)))
            .collect();
        let mut distinct: Vec<i64> = classes.values().copied().collect();
        distinct.sort_unstable();
        distinct.dedup();
        Self {
            count: distinct.len(),
            classes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Louvain {
    resolution: f64,
    max_passes: usize,
    max_levels: usize,
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Louvain {
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution,
            max_passes: 100,
            max_levels: 32,
        }
    }

    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    pub fn detect(&self, graph: &NebulaGraph) -> CommunityDetails {
        let base = Network::from_graph(graph);
        let n = base.len();
        let mut membership: Vec<usize> = (0..n).collect();
        let mut levels = 0usize;

        if base.two_m > 0.0 {
            let mut net = base.clone();
            while levels < self.max_levels {
                let (comm, moved) = self.local_moving(&net);
                if !moved {
                    break;
                }
                let (comm, count) = renumber(&comm);
                for m in &mut membership {
                    *m = comm[*m];
                }
                levels += 1;
                if count == net.len() {
                    break;
                }
                net = net.aggregate(&comm, count);
            }
        }

        let (membership, count) = renumber(&membership);
        let modularity = base.modularity(&membership, self.resolution);
        let communities = graph
            .nodes()
            .zip(&membership)
            .map(|(id, &c)| (id.to_string(), c))
            .collect();
        CommunityDetails {
            count,
            communities,
            modularity,
            resolution: self.resolution,
            levels,
        }
    }

    /// One Louvain phase: moves nodes greedily until a full pass makes no move.
    fn local_moving(&self, net: &Network) -> (Vec<usize>, bool) {
        let n = net.len();
        let mut comm: Vec<usize> = (0..n).collect();
        let mut tot: Vec<f64> = net.degree.clone();
        let mut link: Vec<f64> = vec![0.0; n];
        let mut touched: Vec<usize> = Vec::new();
        let mut any_moved = false;

        for _ in 0..self.max_passes {
            let mut moves = 0usize;
            for i in 0..n {
                let ci = comm[i];
                let ki = net.degree[i];

                for &(j, w) in &net.adj[i] {
                    let c = comm[j];
                    if link[c] == 0.0 {
                        touched.push(c);
                    }
                    link[c] += w;
                }

                tot[ci] -= ki;
                let gain = |c: usize, link: &[f64], tot: &[f64]| {
                    link[c] - self.resolution * tot[c] * ki / net.two_m
                };
                let mut best = ci;
                let mut best_gain = gain(ci, &link, &tot);
                for &c in &touched {
                    let g = gain(c, &link, &tot);
                    if g > best_gain + 1e-12 {
                        best = c;
                        best_gain = g;
                    }
                }
                tot[best] += ki;
                comm[i] = best;
                if best != ci {
                    moves += 1;
                }

                for c in touched.drain(..) {
                    link[c] = 0.0;
                }
            }
            if moves == 0 {
                break;
            }
            any_moved = true;
        }
        (comm, any_moved)
    }
}

/// Weighted undirected view used by Louvain. `loops[i]` holds `A_ii`, which counts a self-loop
/// of weight `w` as `2w`.
#[derive(Debug, Clone)]
struct Network {
    adj: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
    degree: Vec<f64>,
    two_m: f64,
}

impl Network {
    fn from_graph(graph: &NebulaGraph) -> Self {
        let index: FxHashMap<&str, usize> = graph.nodes().enumerate().map(|(i, n)| (n, i)).collect();
        let n = index.len();
        let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut loops = vec![0.0; n];
        for e in graph.edges() {
            let (Some(&s), Some(&t)) = (index.get(e.source), index.get(e.target)) else {
                continue;
            };
            let w = e.attrs.effective_weight();
            if s == t {
                loops[s] += 2.0 * w;
            } else {
                adj[s].push((t, w));
                adj[t].push((s, w));
            }
        }
        Self::with_degrees(adj, loops)
    }

    fn with_degrees(adj: Vec<Vec<(usize, f64)>>, loops: Vec<f64>) -> Self {
        let degree: Vec<f64> = adj
            .iter()
            .zip(&loops)
            .map(|(row, l)| row.iter().map(|(_, w)| w).sum::<f64>() + l)
            .collect();
        let two_m = degree.iter().sum();
        Self {
            adj,
            loops,
            degree,
            two_m,
        }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn aggregate(&self, comm: &[usize], count: usize) -> Self {
        let mut links: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); count];
        let mut loops = vec![0.0; count];
        for i in 0..self.len() {
            let ci = comm[i];
            loops[ci] += self.loops[i];
            for &(j, w) in &self.adj[i] {
                let cj = comm[j];
                if ci == cj {
                    loops[ci] += w;
                } else {
                    *links[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }
        let adj = links
            .into_iter()
            .map(|m| {
                let mut row: Vec<(usize, f64)> = m.into_iter().collect();
                row.sort_unstable_by_key(|&(c, _)| c);
                row
            })
            .collect();
        Self::with_degrees(adj, loops)
    }

    fn modularity(&self, comm: &[usize], resolution: f64) -> f64 {
        if self.two_m <= 0.0 {
            return 0.0;
        }
        let k = comm.iter().copied().max().map_or(0, |m| m + 1);
        let mut inner = vec![0.0; k];
        let mut tot = vec![0.0; k];
        for i in 0..self.len() {
            let c = comm[i];
            tot[c] += self.degree[i];
            inner[c] += self.loops[i];
            for &(j, w) in &self.adj[i] {
                if comm[j] == c {
                    inner[c] += w;
                }
            }
        }
        inner
            .iter()
            .zip(&tot)
            .map(|(&inn, &t)| inn / self.two_m - resolution * (t / self.two_m).powi(2))
            .sum()
    }
}

/// Relabels community ids contiguously in order of first appearance.
fn renumber(comm: &[usize]) -> (Vec<usize>, usize) {
    let mut map: FxHashMap<usize, usize> = FxHashMap::default();
    let out = comm
        .iter()
        .map(|c| {
            let next = map.len();
            *map.entry(*c).or_insert(next)
        })
        .collect();
    (out, map.len())
}

/// Modularity of `partition` over the undirected, weighted view of `graph`. Nodes absent from
/// the partition each form their own community.
pub fn modularity(graph: &NebulaGraph, partition: &IndexMap<String, usize>, resolution: f64) -> f64 {
    let net = Network::from_graph(graph);
    let mut next = partition.values().copied().max().map_or(0, |m| m + 1);
    let raw: Vec<usize> = graph
        .nodes()
        .map(|id| {
            partition.get(id).copied().unwrap_or_else(|| {
                next += 1;
                next - 1
            })
        })
        .collect();
    let (comm, _) = renumber(&raw);
    net.modularity(&comm, resolution)
}

/// Copies Louvain ids onto the nodes' `community` attribute.
pub fn apply_communities(graph: &mut NebulaGraph, details: &CommunityDetails) {
    graph.for_each_node_mut(|id, attrs| {
        attrs.community = details.communities.get(id).copied();
    });
}

const COLOR_SPACE: u64 = 0x100_0000;

/// Gives every cluster one seeded random base color and paints its nodes with it.
///
/// With `jitter`, a node's color is `(base + floor(size)) mod 0x1000000`, so nodes of one
/// cluster differ slightly by size. Nodes without a cluster keep their color. Returns the base
/// color of each cluster id.
pub fn assign_colors(
    graph: &mut NebulaGraph,
    hierarchy: Hierarchy,
    seed: u64,
    jitter: bool,
) -> BTreeMap<i64, u32> {
    let cluster_of = |a: &crate::model::NodeAttributes| match hierarchy {
        Hierarchy::Community => a.community.map(|c| c as i64),
        Hierarchy::ModularityClass => a.modularity_class,
    };

    let mut palette: BTreeMap<i64, u32> = graph
        .iter_nodes()
        .filter_map(|(_, a)| cluster_of(a))
        .map(|c| (c, 0))
        .collect();
    let mut rng = XorShift64Star::new(seed);
    for base in palette.values_mut() {
        *base = rng.next_u32_inclusive(0xFF_FFFF);
    }

    graph.for_each_node_mut(|_, attrs| {
        let Some(base) = cluster_of(attrs).and_then(|c| palette.get(&c)) else {
            return;
        };
        let offset = if jitter && attrs.size.is_finite() {
            attrs.size.max(0.0).floor() as u64
        } else {
            0
        };
        attrs.color = Some(hex_color((u64::from(*base) + offset) % COLOR_SPACE));
    });
    palette
}

pub fn hex_color(rgb: u64) -> String {
    format!("#{:06x}", rgb % COLOR_SPACE)
}
