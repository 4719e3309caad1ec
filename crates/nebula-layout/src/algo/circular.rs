use crate::algo::CircularOptions;
use crate::error::{Error, Result};
use crate::graph::Graph;
use std::f64::consts::PI;

/// Places the nodes evenly on a circle, in node order, starting at angle 0.
pub fn layout(graph: &mut Graph, opts: &CircularOptions) -> Result<()> {
    if !(opts.scale.is_finite() && opts.center.is_finite()) {
        return Err(Error::InvalidOption {
            option: "circular.scale",
            message: format!("expected finite center/scale, got {opts:?}"),
        });
    }

    let n = graph.nodes.len();
    if n == 0 {
        return Ok(());
    }
    let step = 2.0 * PI / n as f64;
    for (i, node) in graph.nodes.iter_mut().enumerate() {
        let angle = i as f64 * step;
        node.x = opts.center + opts.scale * angle.cos();
        node.y = opts.center + opts.scale * angle.sin();
    }
    Ok(())
}
