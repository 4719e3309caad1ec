//! Hierarchical circle packing.
//!
//! Nodes are grouped by their [`Node::groups`](crate::graph::Node::groups) path. Each node is a
//! circle of radius `size`; siblings are packed with the front-chain algorithm of Wang et al.
//! ("Visualization of large hierarchical data by circle packing", 2006), and every group becomes
//! a circle enclosing its packed children. Enclosing circles use Welzl's move-to-front algorithm.

use crate::algo::CirclePackOptions;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::rng::XorShift64Star;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }
}

pub fn layout(graph: &mut Graph, opts: &CirclePackOptions) -> Result<()> {
    if !(opts.scale.is_finite() && opts.center.is_finite()) {
        return Err(Error::InvalidOption {
            option: "circlePack.scale",
            message: format!("expected finite center/scale, got {opts:?}"),
        });
    }
    if graph.nodes.is_empty() {
        return Ok(());
    }

    let mut tree = PackTree::default();
    tree.slots.push(Slot::default());
    for (i, node) in graph.nodes.iter().enumerate() {
        let mut parent = 0;
        for group in &node.groups {
            parent = tree.group(parent, group);
        }
        let r = if node.size > 0.0 { node.size } else { 1.0 };
        let leaf = tree.slots.len();
        tree.slots.push(Slot {
            circle: Circle::new(0.0, 0.0, r),
            leaf: Some(i),
            ..Slot::default()
        });
        tree.slots[parent].children.push(leaf);
    }

    tree.pack(0);
    tree.place(0, 0.0, 0.0, &mut |i, x, y| {
        let node = &mut graph.nodes[i];
        node.x = opts.center + opts.scale * x;
        node.y = opts.center + opts.scale * y;
    });
    Ok(())
}

#[derive(Debug, Default)]
struct Slot {
    circle: Circle,
    leaf: Option<usize>,
    groups: IndexMap<String, usize>,
    children: Vec<usize>,
}

impl Default for Circle {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[derive(Debug, Default)]
struct PackTree {
    slots: Vec<Slot>,
}

impl PackTree {
    fn group(&mut self, parent: usize, name: &str) -> usize {
        if let Some(&ix) = self.slots[parent].groups.get(name) {
            return ix;
        }
        let ix = self.slots.len();
        self.slots.push(Slot::default());
        self.slots[parent].groups.insert(name.to_string(), ix);
        self.slots[parent].children.push(ix);
        ix
    }

    /// Packs the subtree bottom-up and returns the radius of its enclosing circle.
    fn pack(&mut self, ix: usize) -> f64 {
        let children = self.slots[ix].children.clone();
        for &c in &children {
            if !self.slots[c].children.is_empty() {
                let r = self.pack(c);
                self.slots[c].circle.r = r;
            }
        }
        let mut circles: Vec<Circle> = children.iter().map(|&c| self.slots[c].circle).collect();
        let r = pack_siblings(&mut circles);
        for (&c, circle) in children.iter().zip(circles) {
            self.slots[c].circle = circle;
        }
        r
    }

    fn place(&self, ix: usize, x: f64, y: f64, emit: &mut impl FnMut(usize, f64, f64)) {
        for &c in &self.slots[ix].children {
            let slot = &self.slots[c];
            let (cx, cy) = (x + slot.circle.x, y + slot.circle.y);
            match slot.leaf {
                Some(node) => emit(node, cx, cy),
                None => self.place(c, cx, cy, emit),
            }
        }
    }
}

/// Packs `circles` tangentially around the origin, in order, and centers the result on the
/// smallest enclosing circle. Returns that circle's radius.
pub fn pack_siblings(circles: &mut [Circle]) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return circles[0].r + circles[1].r;
    }

    place(circles, 1, 0, 2);

    // Front chain as a circular doubly linked list over circle indices.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    let (mut a, mut b) = (0usize, 1usize);
    next[0] = 1;
    prev[2] = 1;
    next[1] = 2;
    prev[0] = 2;
    next[2] = 0;
    prev[1] = 0;

    let mut i = 3;
    'pack: while i < n {
        place(circles, a, b, i);
        let c = i;

        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(&circles[j], &circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(&circles[k], &circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        let mut best = score(circles, a, next[a]);
        let mut cur = next[c];
        while cur != b {
            let s = score(circles, cur, next[cur]);
            if s < best {
                a = cur;
                best = s;
            }
            cur = next[cur];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut cur = next[b];
    while cur != b {
        chain.push(circles[cur]);
        cur = next[cur];
    }
    let e = enclose(&chain).unwrap_or_else(|| bounding_circle(&chain));
    for c in circles.iter_mut() {
        c.x -= e.x;
        c.y -= e.y;
    }
    e.r
}

/// Places circle `c` tangent to both `a` and `b`.
fn place(circles: &mut [Circle], b: usize, a: usize, c: usize) {
    let (ca, cb) = (circles[a], circles[b]);
    let r = circles[c].r;
    let dx = cb.x - ca.x;
    let dy = cb.y - ca.y;
    let d2 = dx * dx + dy * dy;
    let out = &mut circles[c];
    if d2 > 0.0 {
        let a2 = (ca.r + r).powi(2);
        let b2 = (cb.r + r).powi(2);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            out.x = cb.x - x * dx - y * dy;
            out.y = cb.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            out.x = ca.x + x * dx - y * dy;
            out.y = ca.y + x * dy + y * dx;
        }
    } else {
        out.x = ca.x + r;
        out.y = ca.y;
    }
}

fn intersects(a: &Circle, b: &Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted tangent point of `a` and `b`.
fn score(circles: &[Circle], a: usize, b: usize) -> f64 {
    let (a, b) = (&circles[a], &circles[b]);
    let ab = a.r + b.r;
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}

const ENCLOSE_SEED: u64 = 0x5EED_C1C1;

/// Smallest circle enclosing every circle in `circles`, or `None` if floating-point error keeps
/// the support set from converging.
pub fn enclose(circles: &[Circle]) -> Option<Circle> {
    let mut order: Vec<Circle> = circles.to_vec();
    let mut rng = XorShift64Star::new(ENCLOSE_SEED);
    for i in (1..order.len()).rev() {
        let j = rng.next_u32_inclusive(i as u32) as usize;
        order.swap(i, j);
    }

    let max_restarts = 8 * order.len() * order.len() + 64;
    let mut restarts = 0usize;
    let mut basis: Vec<Circle> = Vec::new();
    let mut e: Option<Circle> = None;
    let mut i = 0;
    while i < order.len() {
        let p = order[i];
        if e.is_some_and(|e| encloses_weak(&e, &p)) {
            i += 1;
            continue;
        }
        restarts += 1;
        if restarts > max_restarts {
            return None;
        }
        basis = extend_basis(&basis, p)?;
        e = Some(enclose_basis(&basis));
        i = 0;
    }
    e
}

fn bounding_circle(circles: &[Circle]) -> Circle {
    let n = circles.len().max(1) as f64;
    let cx = circles.iter().map(|c| c.x).sum::<f64>() / n;
    let cy = circles.iter().map(|c| c.y).sum::<f64>() / n;
    let r = circles
        .iter()
        .map(|c| ((c.x - cx).powi(2) + (c.y - cy).powi(2)).sqrt() + c.r)
        .fold(0.0, f64::max);
    Circle::new(cx, cy, r)
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(&p, basis) {
        return Some(vec![p]);
    }

    for &b in basis {
        if encloses_not(&p, &b) && encloses_weak_all(&enclose_basis2(&b, &p), basis) {
            return Some(vec![b, p]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (basis[i], basis[j]);
            if encloses_not(&enclose_basis2(&bi, &bj), &p)
                && encloses_not(&enclose_basis2(&bi, &p), &bj)
                && encloses_not(&enclose_basis2(&bj, &p), &bi)
                && encloses_weak_all(&enclose_basis3(&bi, &bj, &p), basis)
            {
                return Some(vec![bi, bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: &Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_basis2(a, b),
        [a, b, c] => enclose_basis3(a, b, c),
        _ => bounding_circle(basis),
    }
}

fn enclose_basis2(a: &Circle, b: &Circle) -> Circle {
    let x21 = b.x - a.x;
    let y21 = b.y - a.y;
    let r21 = b.r - a.r;
    let l = (x21 * x21 + y21 * y21).sqrt();
    if l == 0.0 {
        return if a.r >= b.r { *a } else { *b };
    }
    Circle::new(
        (a.x + b.x + x21 / l * r21) / 2.0,
        (a.y + b.y + y21 / l * r21) / 2.0,
        (l + a.r + b.r) / 2.0,
    )
}

fn enclose_basis3(a: &Circle, b: &Circle, c: &Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let a2 = x1 - b.x;
    let a3 = x1 - c.x;
    let b2 = y1 - b.y;
    let b3 = y1 - c.y;
    let c2 = b.r - r1;
    let c3 = c.r - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - b.x * b.x - b.y * b.y + b.r * b.r;
    let d3 = d1 - c.x * c.x - c.y * c.y + c.r * c.r;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle::new(x1 + xa + xb * r, y1 + ya + yb * r, r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn dist(a: &Circle, b: &Circle) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn packed_siblings_do_not_overlap() {
        let mut circles: Vec<Circle> = (1..=12)
            .map(|i| Circle::new(0.0, 0.0, 1.0 + (i % 4) as f64))
            .collect();
        let r = pack_siblings(&mut circles);
        for i in 0..circles.len() {
            for j in (i + 1)..circles.len() {
                let gap = dist(&circles[i], &circles[j]) - circles[i].r - circles[j].r;
                assert!(gap > -1e-6, "circles {i} and {j} overlap by {gap}");
            }
            let reach = dist(&circles[i], &Circle::default()) + circles[i].r;
            assert!(reach <= r + 1e-6);
        }
    }

    #[test]
    fn two_siblings_touch() {
        let mut circles = vec![Circle::new(0.0, 0.0, 1.0), Circle::new(0.0, 0.0, 2.0)];
        assert_eq!(pack_siblings(&mut circles), 3.0);
        assert!((dist(&circles[0], &circles[1]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn enclose_covers_every_circle() {
        let circles = vec![
            Circle::new(0.0, 0.0, 1.0),
            Circle::new(5.0, 0.0, 2.0),
            Circle::new(2.0, 4.0, 1.5),
            Circle::new(1.0, 1.0, 0.5),
        ];
        let e = enclose(&circles).unwrap();
        for c in &circles {
            assert!(dist(&e, c) + c.r <= e.r + 1e-6);
        }
    }

    #[test]
    fn groups_are_packed_apart() {
        let mut g = Graph {
            nodes: (0..6)
                .map(|i| Node {
                    groups: vec![if i < 3 { "a" } else { "b" }.to_string()],
                    ..Node::new(format!("n{i}"))
                })
                .collect(),
            edges: Vec::new(),
        };
        layout(&mut g, &CirclePackOptions::default()).unwrap();

        let centroid = |range: std::ops::Range<usize>| {
            let n = range.len() as f64;
            let (sx, sy) = g.nodes[range]
                .iter()
                .fold((0.0, 0.0), |(sx, sy), n| (sx + n.x, sy + n.y));
            (sx / n, sy / n)
        };
        let (ax, ay) = centroid(0..3);
        let (bx, by) = centroid(3..6);
        assert!(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt() > 1.0);
        for n in &g.nodes {
            assert!(n.x.is_finite() && n.y.is_finite());
        }
    }

    #[test]
    fn single_node_sits_at_center() {
        let mut g = Graph {
            nodes: vec![Node::new("only")],
            edges: Vec::new(),
        };
        layout(&mut g, &CirclePackOptions::default()).unwrap();
        assert_eq!((g.nodes[0].x, g.nodes[0].y), (2.0, 2.0));
    }
}
