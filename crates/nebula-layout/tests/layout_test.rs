use nebula_layout::{
    Algorithm, CirclePackOptions, CircularOptions, Edge, ForceAtlas2Options, Graph, Node,
    NoverlapOptions, layout,
};

fn ring(n: usize) -> Graph {
    Graph {
        nodes: (0..n)
            .map(|i| Node {
                size: 10.0 + i as f64,
                groups: vec![(i % 3).to_string()],
                ..Node::new(format!("n{i}"))
            })
            .collect(),
        edges: (0..n)
            .map(|i| Edge::new(format!("e{i}"), format!("n{i}"), format!("n{}", (i + 1) % n)))
            .collect(),
    }
}

#[test]
fn native_pipeline_sequence_produces_finite_positions() {
    let mut g = ring(24);
    for algorithm in [
        Algorithm::Circular(CircularOptions::default()),
        Algorithm::ForceAtlas2(ForceAtlas2Options::default()),
        Algorithm::CirclePack(CirclePackOptions::default()),
        Algorithm::Noverlap(NoverlapOptions::default()),
    ] {
        layout(&mut g, &algorithm).unwrap();
    }
    for n in &g.nodes {
        assert!(n.x.is_finite() && n.y.is_finite(), "{} at {},{}", n.id, n.x, n.y);
    }
}

#[test]
fn layouts_are_deterministic() {
    let run = || {
        let mut g = ring(12);
        layout(&mut g, &Algorithm::Circular(CircularOptions::default())).unwrap();
        layout(&mut g, &Algorithm::ForceAtlas2(ForceAtlas2Options::default())).unwrap();
        layout(&mut g, &Algorithm::Noverlap(NoverlapOptions::default())).unwrap();
        g.positions()
    };
    assert_eq!(run(), run());
}

#[test]
fn empty_graph_is_a_no_op() {
    let mut g = Graph::default();
    layout(&mut g, &Algorithm::ForceAtlas2(ForceAtlas2Options::default())).unwrap();
    layout(&mut g, &Algorithm::CirclePack(CirclePackOptions::default())).unwrap();
    assert!(g.nodes.is_empty());
}
