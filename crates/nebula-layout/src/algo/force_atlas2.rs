//! ForceAtlas2 (Jacomy et al., 2014).
//!
//! Nodes repel each other proportionally to their masses (`1 + degree`), edges pull their
//! endpoints together, and a gravity force keeps disconnected parts from drifting away. Each
//! node moves with its own adaptive speed derived from its swinging/traction history.

use crate::algo::{ForceAtlas2Options, ForceAtlas2Settings};
use crate::error::{Error, Result};
use crate::graph::Graph;
use nalgebra::Vector2;

type Vec2 = Vector2<f64>;

/// Graph-dependent defaults, equivalent to graphology's `forceAtlas2.inferSettings`.
pub fn infer_settings(graph: &Graph) -> ForceAtlas2Settings {
    let order = graph.nodes.len();
    ForceAtlas2Settings {
        barnes_hut_optimize: order > 2000,
        strong_gravity_mode: true,
        gravity: 0.05,
        scaling_ratio: 10.0,
        slow_down: 1.0 + (order.max(1) as f64).ln(),
        ..ForceAtlas2Settings::default()
    }
}

pub fn layout(graph: &mut Graph, opts: &ForceAtlas2Options) -> Result<()> {
    graph.validate()?;
    if graph.nodes.is_empty() {
        return Ok(());
    }

    let settings = opts.settings.unwrap_or_else(|| infer_settings(graph));
    check_settings(&settings)?;

    let mut sim = Simulation::from_graph(graph);
    for _ in 0..opts.iterations {
        sim.step(&settings);
    }
    for (node, p) in graph.nodes.iter_mut().zip(&sim.pos) {
        node.x = p.x;
        node.y = p.y;
    }
    Ok(())
}

fn check_settings(s: &ForceAtlas2Settings) -> Result<()> {
    if !(s.scaling_ratio.is_finite() && s.scaling_ratio > 0.0) {
        return Err(Error::InvalidOption {
            option: "forceAtlas2.scalingRatio",
            message: format!("expected a positive number, got {}", s.scaling_ratio),
        });
    }
    if !(s.slow_down.is_finite() && s.slow_down > 0.0) {
        return Err(Error::InvalidOption {
            option: "forceAtlas2.slowDown",
            message: format!("expected a positive number, got {}", s.slow_down),
        });
    }
    Ok(())
}

struct Simulation {
    pos: Vec<Vec2>,
    force: Vec<Vec2>,
    old_force: Vec<Vec2>,
    mass: Vec<f64>,
    size: Vec<f64>,
    convergence: Vec<f64>,
    edges: Vec<(usize, usize, f64)>,
}

impl Simulation {
    fn from_graph(graph: &Graph) -> Self {
        let n = graph.nodes.len();
        Self {
            pos: graph.nodes.iter().map(|n| Vec2::new(n.x, n.y)).collect(),
            force: vec![Vec2::zeros(); n],
            old_force: vec![Vec2::zeros(); n],
            mass: graph.degrees().into_iter().map(|d| 1.0 + d as f64).collect(),
            size: graph.nodes.iter().map(|n| n.size).collect(),
            convergence: vec![1.0; n],
            edges: graph.edge_indices(),
        }
    }

    fn step(&mut self, s: &ForceAtlas2Settings) {
        for i in 0..self.pos.len() {
            self.old_force[i] = self.force[i];
            self.force[i] = Vec2::zeros();
        }

        let outbound_compensation = if s.outbound_attraction_distribution {
            self.mass.iter().sum::<f64>() / self.mass.len() as f64
        } else {
            1.0
        };

        if s.barnes_hut_optimize {
            self.apply_repulsion_barnes_hut(s);
        } else {
            self.apply_repulsion(s);
        }
        self.apply_gravity(s);
        self.apply_attraction(s, outbound_compensation);
        self.apply_forces(s);
    }

    fn apply_repulsion(&mut self, s: &ForceAtlas2Settings) {
        let n = self.pos.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.pos[i] - self.pos[j];
                let factor = repulsion_factor(
                    s,
                    delta,
                    (self.mass[i], self.mass[j]),
                    (self.size[i], self.size[j]),
                );
                self.force[i] += delta * factor;
                self.force[j] -= delta * factor;
            }
        }
    }

    fn apply_repulsion_barnes_hut(&mut self, s: &ForceAtlas2Settings) {
        let Some(root) = Quad::build(&self.pos, &self.mass) else {
            return;
        };
        for i in 0..self.pos.len() {
            let f = root.repulsion(i, &self.pos, &self.mass, &self.size, s);
            self.force[i] += f;
        }
    }

    fn apply_gravity(&mut self, s: &ForceAtlas2Settings) {
        let coefficient = s.scaling_ratio;
        let g = s.gravity / s.scaling_ratio;
        for i in 0..self.pos.len() {
            let p = self.pos[i];
            let distance = p.norm();
            if distance <= 0.0 {
                continue;
            }
            let factor = if s.strong_gravity_mode {
                coefficient * self.mass[i] * g
            } else {
                coefficient * self.mass[i] * g / distance
            };
            self.force[i] -= p * factor;
        }
    }

    fn apply_attraction(&mut self, s: &ForceAtlas2Settings, outbound_compensation: f64) {
        let coefficient = if s.outbound_attraction_distribution {
            outbound_compensation
        } else {
            1.0
        };
        for &(a, b, w) in &self.edges {
            if a == b {
                continue;
            }
            let ewc = if s.edge_weight_influence == 0.0 {
                1.0
            } else if s.edge_weight_influence == 1.0 {
                w
            } else {
                w.powf(s.edge_weight_influence)
            };

            let delta = self.pos[a] - self.pos[b];
            let raw = delta.norm();
            let distance = if s.adjust_sizes {
                raw - self.size[a] - self.size[b]
            } else {
                raw
            };

            let mut factor = if s.adjust_sizes && distance <= 0.0 {
                0.0
            } else if s.lin_log_mode {
                if distance > 0.0 {
                    -coefficient * ewc * (1.0 + distance).ln() / distance
                } else {
                    0.0
                }
            } else {
                -coefficient * ewc
            };
            if s.outbound_attraction_distribution {
                factor /= self.mass[a];
            }

            self.force[a] += delta * factor;
            self.force[b] -= delta * factor;
        }
    }

    fn apply_forces(&mut self, s: &ForceAtlas2Settings) {
        for i in 0..self.pos.len() {
            let force = self.force[i];
            let swinging = self.mass[i] * (self.old_force[i] - force).norm();
            let traction = (self.old_force[i] + force).norm() / 2.0;

            if s.adjust_sizes {
                let node_speed = 0.1 * (1.0 + traction).ln() / (1.0 + swinging.sqrt());
                let df = force.norm();
                if df > 0.0 {
                    let factor = (node_speed * df).min(10.0) / df;
                    self.pos[i] += force * (factor / s.slow_down);
                }
            } else {
                let node_speed =
                    self.convergence[i] * (1.0 + traction).ln() / (1.0 + swinging.sqrt());
                self.convergence[i] = (node_speed * force.norm_squared()
                    / (1.0 + swinging.sqrt()))
                .sqrt()
                .min(1.0);
                self.pos[i] += force * (node_speed / s.slow_down);
            }
        }
    }
}

fn repulsion_factor(
    s: &ForceAtlas2Settings,
    delta: Vec2,
    (m1, m2): (f64, f64),
    (s1, s2): (f64, f64),
) -> f64 {
    let coefficient = s.scaling_ratio;
    if s.adjust_sizes {
        let distance = delta.norm() - s1 - s2;
        if distance < 0.0 {
            100.0 * coefficient * m1 * m2
        } else if distance > 0.0 {
            coefficient * m1 * m2 / (distance * distance)
        } else {
            0.0
        }
    } else {
        let d2 = delta.norm_squared();
        if d2 > 0.0 {
            coefficient * m1 * m2 / d2
        } else {
            0.0
        }
    }
}

// Coincident nodes would otherwise subdivide forever; past this depth they share a leaf.
const MAX_QUAD_DEPTH: u32 = 24;

struct Quad {
    origin: Vec2,
    width: f64,
    depth: u32,
    mass: f64,
    weighted_pos: Vec2,
    bodies: Vec<usize>,
    children: Option<Box<[Quad; 4]>>,
}

impl Quad {
    fn new(origin: Vec2, width: f64, depth: u32) -> Self {
        Self {
            origin,
            width,
            depth,
            mass: 0.0,
            weighted_pos: Vec2::zeros(),
            bodies: Vec::new(),
            children: None,
        }
    }

    fn build(pos: &[Vec2], mass: &[f64]) -> Option<Self> {
        let first = pos.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in pos {
            min = min.inf(p);
            max = max.sup(p);
        }
        let extent = max - min;
        let width = extent.x.max(extent.y).max(f64::EPSILON) * 1.0001;
        let mut root = Quad::new(min, width, 0);
        for i in 0..pos.len() {
            root.insert(i, pos, mass);
        }
        Some(root)
    }

    fn insert(&mut self, i: usize, pos: &[Vec2], mass: &[f64]) {
        self.mass += mass[i];
        self.weighted_pos += pos[i] * mass[i];

        if self.children.is_none() {
            if self.bodies.is_empty() || self.depth >= MAX_QUAD_DEPTH {
                self.bodies.push(i);
                return;
            }
            self.subdivide();
            for b in std::mem::take(&mut self.bodies) {
                let q = self.quadrant(pos[b]);
                if let Some(children) = self.children.as_mut() {
                    children[q].insert(b, pos, mass);
                }
            }
        }

        let q = self.quadrant(pos[i]);
        if let Some(children) = self.children.as_mut() {
            children[q].insert(i, pos, mass);
        }
    }

    fn subdivide(&mut self) {
        let half = self.width / 2.0;
        let d = self.depth + 1;
        let o = self.origin;
        self.children = Some(Box::new([
            Quad::new(o, half, d),
            Quad::new(o + Vec2::new(half, 0.0), half, d),
            Quad::new(o + Vec2::new(0.0, half), half, d),
            Quad::new(o + Vec2::new(half, half), half, d),
        ]));
    }

    fn quadrant(&self, p: Vec2) -> usize {
        let half = self.width / 2.0;
        let right = p.x >= self.origin.x + half;
        let bottom = p.y >= self.origin.y + half;
        usize::from(right) + 2 * usize::from(bottom)
    }

    fn repulsion(
        &self,
        i: usize,
        pos: &[Vec2],
        mass: &[f64],
        size: &[f64],
        s: &ForceAtlas2Settings,
    ) -> Vec2 {
        if self.mass <= 0.0 {
            return Vec2::zeros();
        }
        match &self.children {
            None => self
                .bodies
                .iter()
                .filter(|&&b| b != i)
                .fold(Vec2::zeros(), |acc, &b| {
                    let delta = pos[i] - pos[b];
                    acc + delta * repulsion_factor(s, delta, (mass[i], mass[b]), (size[i], size[b]))
                }),
            Some(children) => {
                let center = self.weighted_pos / self.mass;
                let delta = pos[i] - center;
                let d = delta.norm();
                if d > 0.0 && self.width / d < s.barnes_hut_theta {
                    delta * (s.scaling_ratio * mass[i] * self.mass / (d * d))
                } else {
                    children.iter().fold(Vec2::zeros(), |acc, c| {
                        acc + c.repulsion(i, pos, mass, size, s)
                    })
                }
            }
        }
    }
}
