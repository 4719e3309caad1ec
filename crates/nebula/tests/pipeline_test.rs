use nebula::interaction::DIMMED_COLOR;
use nebula::layout;
use nebula::subgraph::extract;
use nebula::{
    DrillDown, Hierarchy, InteractionState, PipelineConfig, Schema, analyze, detect_schema,
    drill_down, node_display, set_clusters,
};
use nebula_graph::alg;
use serde_json::{Value, json};
use std::collections::BTreeSet;

fn native_doc() -> Value {
    let people = [
        "Valjean",
        "Javert",
        "Fantine",
        "Cosette",
        "Marius",
        "Myriel",
        "Napoleon",
        "Baptistine",
        "Magloire",
        "Geborand",
        "Loner",
        "Hermit",
    ];
    let nodes: Vec<Value> = people
        .iter()
        .map(|p| json!({ "key": p.to_lowercase(), "attributes": { "label": p } }))
        .collect();

    let mut pairs: Vec<(&str, &str)> = Vec::new();
    let left = ["valjean", "javert", "fantine", "cosette", "marius"];
    let right = ["myriel", "napoleon", "baptistine", "magloire", "geborand"];
    for group in [left, right] {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                pairs.push((group[i], group[j]));
            }
        }
    }
    pairs.push(("valjean", "myriel"));
    pairs.push(("loner", "hermit"));

    let edges: Vec<Value> = pairs
        .iter()
        .enumerate()
        .map(|(i, (s, t))| {
            json!({ "key": format!("e{i}"), "source": s, "target": t, "attributes": { "size": 1 } })
        })
        .collect();
    json!({ "nodes": nodes, "edges": edges })
}

fn gephi_doc() -> Value {
    json!({
        "attributes": { "creator": "Gephi 0.10" },
        "options": { "multi": false, "allowSelfLoops": true, "type": "directed" },
        "nodes": [
            { "key": "11", "attributes": { "label": "Valjean", "x": 1.0, "y": 2.0, "modularity_class": 1 } },
            { "key": "12", "attributes": { "label": "Cosette", "modularity_class": 1 } },
            { "key": "13", "attributes": { "label": "Marius", "modularity_class": 1 } },
            { "key": "20", "attributes": { "label": "Gavroche", "modularity_class": 5 } },
            { "key": "21", "attributes": { "label": "Enjolras", "modularity_class": 5 } },
            { "key": "30", "attributes": { "label": "Loner", "modularity_class": 0 } }
        ],
        "edges": [
            { "key": "0", "source": "11", "target": "12", "attributes": { "weight": 2.0 } },
            { "key": "1", "source": "12", "target": "13", "attributes": { "weight": 1.0 } },
            { "key": "2", "source": "13", "target": "11", "attributes": { "weight": 1.0 } },
            { "key": "3", "source": "20", "target": "21", "attributes": { "weight": 1.0 } },
            { "key": "4", "source": "21", "target": "13", "attributes": { "weight": 1.0 } }
        ]
    })
}

fn quick_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.force_atlas2.iterations = 50;
    config
}

#[test]
fn native_pipeline_crops_sizes_and_partitions() {
    let doc = native_doc();
    assert_eq!(detect_schema(&doc), Schema::Native);
    let a = analyze(doc, &quick_config()).unwrap();

    assert_eq!(a.schema, Schema::Native);
    assert_eq!(a.hierarchy, Hierarchy::Community);
    assert!(alg::is_connected(&a.graph));
    assert_eq!(a.graph.node_count(), 10);
    assert!(!a.graph.has_node("loner"));

    for (_, n) in a.graph.iter_nodes() {
        assert!((10.0..=100.0).contains(&n.size));
        assert!(n.x.is_finite() && n.y.is_finite());
        let color = n.color.as_deref().unwrap();
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(u32::from_str_radix(&color[1..], 16).is_ok());
        assert_eq!(n.border_color.as_deref(), Some("white"));
        assert!(n.community.is_some());
        let ls = n.label_size.unwrap();
        assert!((14.0..=24.0).contains(&ls));
    }

    // Bridge endpoints have the highest degree.
    let valjean = a.graph.node("valjean").unwrap().size;
    let javert = a.graph.node("javert").unwrap().size;
    assert_eq!(valjean, 100.0);
    assert_eq!(javert, 10.0);

    assert_eq!(a.community.count, 2);
    let ids: BTreeSet<usize> = a.community.communities.values().copied().collect();
    assert_eq!(ids, (0..a.community.count).collect());
    assert!(a.community.modularity > 0.3);
    assert_eq!(a.modularity.count, 0);
}

#[test]
fn regular_graph_gets_constant_size() {
    let doc = json!({
        "nodes": [{ "key": "a" }, { "key": "b" }, { "key": "c" }, { "key": "d" }],
        "edges": [
            { "key": "ab", "source": "a", "target": "b" },
            { "key": "bc", "source": "b", "target": "c" },
            { "key": "cd", "source": "c", "target": "d" },
            { "key": "da", "source": "d", "target": "a" }
        ]
    });
    let a = analyze(doc, &quick_config()).unwrap();
    assert!(a.graph.iter_nodes().all(|(_, n)| n.size == 55.0));
}

#[test]
fn gephi_pipeline_uses_preassigned_classes() {
    let doc = gephi_doc();
    assert_eq!(detect_schema(&doc), Schema::Gephi);
    let a = analyze(doc, &quick_config()).unwrap();

    assert_eq!(a.hierarchy, Hierarchy::ModularityClass);
    // No crop: the isolated node survives.
    assert!(a.graph.has_node("30"));
    assert_eq!(a.modularity.count, 3);
    assert_eq!(a.cluster_count(), 3);
    assert_eq!(a.graph.attrs().modularity_count, Some(3));
    assert_eq!(a.modularity.classes["30"], 0);
    assert!(a.graph.edges().all(|e| e.attrs.size == Some(1.5)));
    assert!(a.community.count >= 1);

    // Same class, different sizes: colors differ only by the size offset.
    let color = |k: &str| {
        let c = a.graph.node(k).unwrap().color.clone().unwrap();
        u32::from_str_radix(&c[1..], 16).unwrap()
    };
    let size = |k: &str| a.graph.node(k).unwrap().size.floor() as u32;
    assert_eq!(
        (color("13") + 0x100_0000 - size("13")) % 0x100_0000,
        (color("11") + 0x100_0000 - size("11")) % 0x100_0000
    );
}

#[test]
fn runs_are_reproducible() {
    let a = analyze(native_doc(), &quick_config()).unwrap();
    let b = analyze(native_doc(), &quick_config()).unwrap();
    let dump = |g: &nebula::NebulaGraph| {
        g.iter_nodes()
            .map(|(k, n)| (k.to_string(), n.x, n.y, n.color.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(dump(&a.graph), dump(&b.graph));
}

#[test]
fn search_selects_exact_match_and_suggests_partial_ones() {
    let a = analyze(native_doc(), &quick_config()).unwrap();
    let mut state = InteractionState::new();

    state.set_search_query(&a.graph, "Valjean");
    assert_eq!(state.selected_node.as_deref(), Some("valjean"));
    assert_eq!(state.suggestions, None);

    state.set_search_query(&a.graph, "Val");
    assert_eq!(state.selected_node, None);
    let suggestions = state.suggestions.clone().unwrap();
    assert!(suggestions.contains("valjean"));
    let javert = node_display(&state, "javert", a.graph.node("javert").unwrap());
    assert_eq!(javert.color.as_deref(), Some(DIMMED_COLOR));

    state.set_search_query(&a.graph, "");
    assert_eq!(state.selected_node, None);
    assert_eq!(state.suggestions, None);
}

#[test]
fn hover_round_trip_restores_state() {
    let a = analyze(native_doc(), &quick_config()).unwrap();
    let mut state = InteractionState::new();
    let before = state.clone();

    let dimmed = state.set_hovered_node(&a.graph, Some("marius"));
    assert!(state.hovered_neighbors.as_ref().unwrap().contains("valjean"));
    assert!(dimmed.nodes.contains("myriel"));
    assert!(!dimmed.nodes.contains("cosette"));

    state.set_hovered_node(&a.graph, None);
    assert_eq!(state, before);
}

#[test]
fn cluster_filter_controls_visibility() {
    let mut a = analyze(native_doc(), &quick_config()).unwrap();
    let target = a.graph.node("valjean").unwrap().community.unwrap().to_string();

    set_clusters(&mut a.graph, &[target.clone()], Hierarchy::Community);
    for (_, n) in a.graph.iter_nodes() {
        let expected_hidden = n.community.map(|c| c.to_string()) != Some(target.clone());
        assert_eq!(n.hidden, expected_hidden);
    }

    set_clusters::<String>(&mut a.graph, &[], Hierarchy::Community);
    assert!(a.graph.iter_nodes().all(|(_, n)| !n.hidden));
}

#[test]
fn extraction_is_exactly_the_induced_subgraph() {
    let a = analyze(native_doc(), &quick_config()).unwrap();
    let cluster = a.graph.node("valjean").unwrap().community.unwrap().to_string();
    let sub = extract(&a.graph, Hierarchy::Community, &cluster);

    let expected_nodes: BTreeSet<String> = a
        .graph
        .iter_nodes()
        .filter(|(_, n)| n.community.map(|c| c.to_string()) == Some(cluster.clone()))
        .map(|(k, _)| k.to_string())
        .collect();
    let expected_edges: BTreeSet<String> = a
        .graph
        .edges()
        .filter(|e| expected_nodes.contains(e.source) && expected_nodes.contains(e.target))
        .map(|e| e.key.to_string())
        .collect();

    assert_eq!(sub.node_ids().into_iter().collect::<BTreeSet<_>>(), expected_nodes);
    assert_eq!(sub.edge_keys().into_iter().collect::<BTreeSet<_>>(), expected_edges);
    assert!(!sub.has_edge("e20"));
}

#[test]
fn drill_down_reanalyses_and_respects_depth() {
    let config = quick_config();
    let a = analyze(native_doc(), &config).unwrap();
    let cluster = a.graph.node("myriel").unwrap().community.unwrap().to_string();

    let DrillDown::Extracted(sub) = drill_down(&a, &cluster, 0, 3, &config).unwrap() else {
        panic!("expected an extracted sub-graph");
    };
    assert_eq!(sub.graph.node_count(), 5);
    assert!(sub.community.count >= 1);
    assert!(sub.graph.iter_nodes().all(|(_, n)| n.community.is_some()));

    let empty = drill_down(&a, "999", 1, 3, &config).unwrap();
    let empty = empty.analysis().unwrap();
    assert!(empty.graph.is_empty());
    assert_eq!(empty.community.count, 0);

    assert!(matches!(
        drill_down(&a, &cluster, 3, 3, &config).unwrap(),
        DrillDown::DepthExceeded
    ));
}

#[test]
fn export_round_trips_through_import() {
    let a = analyze(native_doc(), &quick_config()).unwrap();
    let out = nebula::export::to_value(&a).unwrap();
    assert_eq!(out["schema"], "native");
    assert_eq!(out["clusterCount"], 2);
    assert_eq!(out["communityDetails"]["count"], 2);

    let reimported = nebula::Document::from_value(out["graph"].clone())
        .unwrap()
        .into_graph()
        .unwrap();
    assert_eq!(reimported.node_ids(), a.graph.node_ids());
    assert_eq!(reimported.edge_keys(), a.graph.edge_keys());
}

#[test]
fn packing_stages_rerun_on_a_laid_out_graph() {
    let config = quick_config();
    for doc in [native_doc(), gephi_doc()] {
        let mut a = analyze(doc, &config).unwrap();
        let positions = |g: &nebula::NebulaGraph| {
            g.iter_nodes()
                .map(|(k, n)| (k.to_string(), n.x, n.y))
                .collect::<Vec<_>>()
        };
        let before = positions(&a.graph);

        layout::circle_pack(&mut a.graph, a.hierarchy, config.circle_pack.into()).unwrap();
        layout::noverlap(&mut a.graph, config.noverlap.options(config.color_seed)).unwrap();

        let after = positions(&a.graph);
        assert_eq!(before.len(), after.len());
        for ((k0, x0, y0), (k1, x1, y1)) in before.iter().zip(&after) {
            assert_eq!(k0, k1);
            assert!(x1.is_finite() && y1.is_finite());
            assert!((x0 - x1).abs() < 1e-9 && (y0 - y1).abs() < 1e-9, "{k0} moved");
        }
    }
}
