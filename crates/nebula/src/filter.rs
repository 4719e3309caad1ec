//! Cluster visibility filter.

use crate::model::{Hierarchy, NebulaGraph};

/// Shows only the nodes whose cluster id (stringified) is in `selected`. An empty selection
/// shows every node. Returns the number of visible nodes.
pub fn set_clusters<S: AsRef<str>>(
    graph: &mut NebulaGraph,
    selected: &[S],
    hierarchy: Hierarchy,
) -> usize {
    let mut visible = 0usize;
    graph.for_each_node_mut(|_, attrs| {
        attrs.hidden = !selected.is_empty()
            && !attrs
                .cluster(hierarchy)
                .is_some_and(|c| selected.iter().any(|s| s.as_ref() == c));
        if !attrs.hidden {
            visible += 1;
        }
    });
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeAttributes, new_graph};

    fn clustered() -> NebulaGraph {
        let mut g = new_graph();
        for (id, c) in [("a", Some(0)), ("b", Some(1)), ("c", Some(2)), ("d", None)] {
            g.add_node(
                id,
                NodeAttributes {
                    community: c,
                    ..NodeAttributes::default()
                },
            )
            .unwrap();
        }
        g
    }

    #[test]
    fn selection_hides_other_clusters() {
        let mut g = clustered();
        assert_eq!(set_clusters(&mut g, &["0", "2"], Hierarchy::Community), 2);
        let hidden: Vec<bool> = g.iter_nodes().map(|(_, a)| a.hidden).collect();
        assert_eq!(hidden, vec![false, true, false, true]);
    }

    #[test]
    fn empty_selection_shows_everything() {
        let mut g = clustered();
        set_clusters(&mut g, &["1"], Hierarchy::Community);
        let none: [&str; 0] = [];
        assert_eq!(set_clusters(&mut g, &none, Hierarchy::Community), 4);
        assert!(g.iter_nodes().all(|(_, a)| !a.hidden));
    }

    #[test]
    fn class_hierarchy_reads_modularity_class() {
        let mut g = clustered();
        g.node_mut("d").unwrap().modularity_class = Some(-3);
        assert_eq!(set_clusters(&mut g, &["-3"], Hierarchy::ModularityClass), 1);
        assert!(!g.node("d").unwrap().hidden);
    }
}
