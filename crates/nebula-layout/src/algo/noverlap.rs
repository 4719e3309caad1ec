//! Overlap removal.
//!
//! Each pass buckets nodes into a `grid_size x grid_size` grid over the (expanded) bounding box
//! and pushes the second node of every colliding pair away from the first. Passes repeat until
//! no pair collides or `max_iterations` is reached.

use crate::algo::NoverlapOptions;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::rng::XorShift64Star;
use nalgebra::Vector2;
use rustc_hash::FxHashSet;

type Vec2 = Vector2<f64>;

pub fn layout(graph: &mut Graph, opts: &NoverlapOptions) -> Result<()> {
    check_options(opts)?;
    if graph.nodes.is_empty() {
        return Ok(());
    }

    let mut pos: Vec<Vec2> = graph.nodes.iter().map(|n| Vec2::new(n.x, n.y)).collect();
    let sizes: Vec<f64> = graph
        .nodes
        .iter()
        .map(|n| if n.size > 0.0 { n.size } else { 1.0 })
        .collect();
    let mut rng = XorShift64Star::new(opts.random_seed);

    for _ in 0..opts.max_iterations {
        if iterate(&mut pos, &sizes, opts, &mut rng) {
            break;
        }
    }

    for (node, p) in graph.nodes.iter_mut().zip(&pos) {
        node.x = p.x;
        node.y = p.y;
    }
    Ok(())
}

fn check_options(opts: &NoverlapOptions) -> Result<()> {
    if opts.grid_size == 0 {
        return Err(Error::InvalidOption {
            option: "noverlap.gridSize",
            message: "expected at least one grid cell".to_string(),
        });
    }
    for (option, v) in [
        ("noverlap.margin", opts.margin),
        ("noverlap.ratio", opts.ratio),
        ("noverlap.expansion", opts.expansion),
        ("noverlap.speed", opts.speed),
    ] {
        if !v.is_finite() {
            return Err(Error::InvalidOption {
                option,
                message: format!("expected a finite number, got {v}"),
            });
        }
    }
    Ok(())
}

/// One collision pass. Returns `true` once no pair of nodes overlaps.
fn iterate(
    pos: &mut [Vec2],
    sizes: &[f64],
    opts: &NoverlapOptions,
    rng: &mut XorShift64Star,
) -> bool {
    let n = pos.len();
    let reach = |i: usize| sizes[i] * opts.ratio + opts.margin;

    let mut min = Vec2::repeat(f64::INFINITY);
    let mut max = Vec2::repeat(f64::NEG_INFINITY);
    for (i, p) in pos.iter().enumerate() {
        let s = Vec2::repeat(reach(i));
        min = min.inf(&(p - s));
        max = max.sup(&(p + s));
    }
    let extent = max - min;
    let center = (min + max) / 2.0;
    let min = center - extent * (opts.expansion / 2.0);
    let span = (extent * opts.expansion).map(|v| if v > 0.0 { v } else { 1.0 });

    let g = opts.grid_size;
    let cell_of = |v: f64, lo: f64, span: f64| -> usize {
        let c = (g as f64 * (v - lo) / span).floor();
        if c.is_finite() {
            c.clamp(0.0, (g - 1) as f64) as usize
        } else {
            0
        }
    };

    let mut grid: Vec<Vec<usize>> = vec![Vec::new(); g * g];
    for (i, p) in pos.iter().enumerate() {
        let s = reach(i);
        let (c0, c1) = (cell_of(p.x - s, min.x, span.x), cell_of(p.x + s, min.x, span.x));
        let (r0, r1) = (cell_of(p.y - s, min.y, span.y), cell_of(p.y + s, min.y, span.y));
        for col in c0..=c1 {
            for row in r0..=r1 {
                grid[col * g + row].push(i);
            }
        }
    }

    let mut converged = true;
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut delta = vec![Vec2::zeros(); n];
    for cell in &grid {
        for (a, &n1) in cell.iter().enumerate() {
            for &n2 in &cell[a + 1..] {
                if grid.len() > 1 && !seen.insert((n1, n2)) {
                    continue;
                }
                let d = pos[n2] - pos[n1];
                let dist = d.norm();
                if dist >= reach(n1) + reach(n2) {
                    continue;
                }
                converged = false;
                if dist > 0.0 {
                    delta[n2] += d / dist * (1.0 + sizes[n1]);
                } else {
                    delta[n2] += Vec2::new(
                        extent.x * 0.01 * (0.5 - rng.next_f64_unit()),
                        extent.y * 0.01 * (0.5 - rng.next_f64_unit()),
                    );
                }
            }
        }
    }

    for (p, d) in pos.iter_mut().zip(&delta) {
        *p += d * (0.1 * opts.speed);
    }
    converged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn node(id: &str, x: f64, y: f64, size: f64) -> Node {
        Node {
            x,
            y,
            size,
            ..Node::new(id)
        }
    }

    fn min_gap(g: &Graph, margin: f64) -> f64 {
        let mut gap = f64::INFINITY;
        for i in 0..g.nodes.len() {
            for j in (i + 1)..g.nodes.len() {
                let (a, b) = (&g.nodes[i], &g.nodes[j]);
                let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                gap = gap.min(d - (a.size + margin) - (b.size + margin));
            }
        }
        gap
    }

    #[test]
    fn overlapping_nodes_are_separated() {
        let mut g = Graph {
            nodes: vec![
                node("a", 0.0, 0.0, 2.0),
                node("b", 1.0, 0.0, 2.0),
                node("c", 0.5, 1.0, 2.0),
            ],
            edges: Vec::new(),
        };
        layout(&mut g, &NoverlapOptions::default()).unwrap();
        assert!(min_gap(&g, 1.0) >= -1e-9);
    }

    #[test]
    fn coincident_nodes_are_jittered_apart() {
        let mut g = Graph {
            nodes: vec![node("a", 3.0, 3.0, 1.0), node("b", 3.0, 3.0, 1.0)],
            edges: Vec::new(),
        };
        layout(&mut g, &NoverlapOptions::default()).unwrap();
        assert!((g.nodes[0].x, g.nodes[0].y) != (g.nodes[1].x, g.nodes[1].y));
    }

    #[test]
    fn separated_nodes_do_not_move() {
        let mut g = Graph {
            nodes: vec![node("a", 0.0, 0.0, 1.0), node("b", 100.0, 0.0, 1.0)],
            edges: Vec::new(),
        };
        layout(&mut g, &NoverlapOptions::default()).unwrap();
        assert_eq!(g.nodes[0].x, 0.0);
        assert_eq!(g.nodes[1].x, 100.0);
    }

    #[test]
    fn zero_grid_is_rejected() {
        let mut g = Graph::default();
        let opts = NoverlapOptions {
            grid_size: 0,
            ..NoverlapOptions::default()
        };
        assert!(matches!(
            layout(&mut g, &opts),
            Err(Error::InvalidOption { .. })
        ));
    }
}
