//! Bridges the analysed graph to the headless layout engine.

use crate::config::ForceAtlas2Config;
use crate::error::Result;
use crate::model::{Hierarchy, NebulaGraph};
use nebula_layout::{
    Algorithm, CirclePackOptions, CircularOptions, Edge, Graph, Node, NoverlapOptions,
};

/// Snapshot of positions, sizes and (optionally) cluster groups.
pub fn to_layout_graph(graph: &NebulaGraph, hierarchy: Option<Hierarchy>) -> Graph {
    let nodes = graph
        .iter_nodes()
        .map(|(id, a)| Node {
            id: id.to_string(),
            x: a.x,
            y: a.y,
            size: a.size,
            groups: hierarchy
                .and_then(|h| a.cluster(h))
                .into_iter()
                .collect(),
        })
        .collect();
    let edges = graph
        .edges()
        .map(|e| Edge {
            weight: e.attrs.effective_weight(),
            ..Edge::new(e.key, e.source, e.target)
        })
        .collect();
    Graph { nodes, edges }
}

pub fn write_positions(graph: &mut NebulaGraph, laid_out: &Graph) {
    for node in &laid_out.nodes {
        if let Some(a) = graph.node_mut(&node.id) {
            a.x = node.x;
            a.y = node.y;
        }
    }
}

/// Runs one layout algorithm and writes the positions back.
pub fn apply(
    graph: &mut NebulaGraph,
    algorithm: &Algorithm,
    hierarchy: Option<Hierarchy>,
) -> Result<()> {
    if graph.is_empty() {
        return Ok(());
    }
    let mut lg = to_layout_graph(graph, hierarchy);
    nebula_layout::layout(&mut lg, algorithm)?;
    write_positions(graph, &lg);
    Ok(())
}

pub fn circular(graph: &mut NebulaGraph, opts: CircularOptions) -> Result<()> {
    apply(graph, &Algorithm::Circular(opts), None)
}

pub fn force_atlas2(graph: &mut NebulaGraph, config: &ForceAtlas2Config) -> Result<()> {
    if graph.is_empty() {
        return Ok(());
    }
    let mut lg = to_layout_graph(graph, None);
    let opts = config.options_for(&lg);
    nebula_layout::layout(&mut lg, &Algorithm::ForceAtlas2(opts))?;
    write_positions(graph, &lg);
    Ok(())
}

pub fn circle_pack(
    graph: &mut NebulaGraph,
    hierarchy: Hierarchy,
    opts: CirclePackOptions,
) -> Result<()> {
    apply(graph, &Algorithm::CirclePack(opts), Some(hierarchy))
}

pub fn noverlap(graph: &mut NebulaGraph, opts: NoverlapOptions) -> Result<()> {
    apply(graph, &Algorithm::Noverlap(opts), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeAttributes, NodeAttributes, new_graph};

    #[test]
    fn groups_follow_the_hierarchy() {
        let mut g = new_graph();
        g.add_node(
            "a",
            NodeAttributes {
                community: Some(2),
                modularity_class: Some(9),
                ..NodeAttributes::default()
            },
        )
        .unwrap();
        g.add_node("b", NodeAttributes::default()).unwrap();
        g.add_edge(
            "ab",
            "a",
            "b",
            EdgeAttributes {
                weight: Some(3.0),
                ..EdgeAttributes::default()
            },
        )
        .unwrap();

        let lg = to_layout_graph(&g, Some(Hierarchy::ModularityClass));
        assert_eq!(lg.nodes[0].groups, vec!["9".to_string()]);
        assert!(lg.nodes[1].groups.is_empty());
        assert_eq!(lg.edges[0].weight, 3.0);
        assert!(to_layout_graph(&g, None).nodes[0].groups.is_empty());
    }

    #[test]
    fn circular_writes_positions_back() {
        let mut g = new_graph();
        for id in ["a", "b"] {
            g.add_node(id, NodeAttributes::default()).unwrap();
        }
        circular(&mut g, CircularOptions::default()).unwrap();
        assert_eq!(g.node("a").unwrap().x, 1.5);
        assert!((g.node("b").unwrap().x + 0.5).abs() < 1e-12);
    }
}
