//! Helper algorithms over [`Graph`](super::Graph).

use super::Graph;
use std::collections::{BTreeSet, VecDeque};

/// Connected components, ignoring edge direction.
///
/// Components are discovered by breadth-first search from each unvisited node in node
/// iteration order, so both the component order and the order within a component are stable.
pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut out: Vec<Vec<String>> = Vec::new();

    for start in g.nodes() {
        if !seen.insert(start) {
            continue;
        }
        let mut comp: Vec<String> = Vec::new();
        let mut q: VecDeque<&str> = VecDeque::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(v.to_string());
            for n in g.neighbors(v) {
                if seen.insert(n) {
                    q.push_back(n);
                }
            }
        }
        out.push(comp);
    }

    out
}

/// The largest connected component; ties go to the first discovered one.
pub fn largest_component<N, E, G>(g: &Graph<N, E, G>) -> Option<Vec<String>> {
    let mut best: Option<Vec<String>> = None;
    for comp in components(g) {
        if best.as_ref().is_none_or(|b| comp.len() > b.len()) {
            best = Some(comp);
        }
    }
    best
}

pub fn is_connected<N, E, G>(g: &Graph<N, E, G>) -> bool {
    components(g).len() <= 1
}
