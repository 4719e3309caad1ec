//! Degree-based node sizing.

use crate::model::NebulaGraph;

/// Maps each node's degree (in + out, self-loops counted twice) linearly onto
/// `[min_size, max_size]`. When every node has the same degree they all get the midpoint.
pub fn assign_sizes(graph: &mut NebulaGraph, min_size: f64, max_size: f64) {
    let degrees: Vec<usize> = graph.nodes().map(|n| graph.degree(n)).collect();
    let (Some(&dmin), Some(&dmax)) = (degrees.iter().min(), degrees.iter().max()) else {
        return;
    };
    let range = (dmax - dmin) as f64;
    for ((_, attrs), d) in graph.iter_nodes_mut().zip(degrees) {
        attrs.size = if range > 0.0 {
            min_size + (d - dmin) as f64 / range * (max_size - min_size)
        } else {
            (min_size + max_size) / 2.0
        };
    }
}

/// Derives `label_size` from `size`, mapping `[min_size, max_size]` onto
/// `[min_label, max_label]`.
pub fn assign_label_sizes(
    graph: &mut NebulaGraph,
    (min_size, max_size): (f64, f64),
    (min_label, max_label): (f64, f64),
) {
    let range = max_size - min_size;
    graph.for_each_node_mut(|_, attrs| {
        let t = if range > 0.0 {
            ((attrs.size - min_size) / range).clamp(0.0, 1.0)
        } else {
            0.5
        };
        attrs.label_size = Some(min_label + t * (max_label - min_label));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeAttributes, NodeAttributes, new_graph};

    fn star(leaves: usize) -> NebulaGraph {
        let mut g = new_graph();
        g.add_node("hub", NodeAttributes::default()).unwrap();
        for i in 0..leaves {
            let leaf = format!("l{i}");
            g.add_node(leaf.clone(), NodeAttributes::default()).unwrap();
            g.add_edge(format!("e{i}"), "hub", &leaf, EdgeAttributes::default())
                .unwrap();
        }
        g
    }

    #[test]
    fn sizes_span_the_range() {
        let mut g = star(4);
        assign_sizes(&mut g, 10.0, 100.0);
        assert_eq!(g.node("hub").unwrap().size, 100.0);
        assert_eq!(g.node("l0").unwrap().size, 10.0);
    }

    #[test]
    fn regular_graph_gets_the_midpoint() {
        let mut g = new_graph();
        for id in ["a", "b", "c"] {
            g.add_node(id, NodeAttributes::default()).unwrap();
        }
        for (k, s, t) in [("ab", "a", "b"), ("bc", "b", "c"), ("ca", "c", "a")] {
            g.add_edge(k, s, t, EdgeAttributes::default()).unwrap();
        }
        assign_sizes(&mut g, 10.0, 100.0);
        assert!(g.iter_nodes().all(|(_, a)| a.size == 55.0));
    }

    #[test]
    fn self_loop_counts_twice() {
        let mut g = star(1);
        g.add_edge("loop", "l0", "l0", EdgeAttributes::default()).unwrap();
        assign_sizes(&mut g, 0.0, 2.0);
        // hub: 1, l0: 3
        assert_eq!(g.node("hub").unwrap().size, 0.0);
        assert_eq!(g.node("l0").unwrap().size, 2.0);
    }

    #[test]
    fn label_sizes_follow_sizes() {
        let mut g = star(2);
        assign_sizes(&mut g, 10.0, 100.0);
        assign_label_sizes(&mut g, (10.0, 100.0), (14.0, 24.0));
        assert_eq!(g.node("hub").unwrap().label_size, Some(24.0));
        assert_eq!(g.node("l1").unwrap().label_size, Some(14.0));
    }

    #[test]
    fn empty_graph_is_a_no_op() {
        let mut g = new_graph();
        assign_sizes(&mut g, 10.0, 100.0);
        assign_label_sizes(&mut g, (10.0, 100.0), (14.0, 24.0));
        assert!(g.is_empty());
    }
}
