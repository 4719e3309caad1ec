#![forbid(unsafe_code)]

//! Headless graph layout algorithms.
//!
//! `nebula-layout` positions the nodes of a [`Graph`] in place. The algorithms are the ones the
//! graphology standard library offers to sigma.js front ends: a circular seed placement,
//! ForceAtlas2, hierarchical circle packing and overlap removal ("noverlap"). Each one can be
//! re-run on an already positioned graph.

pub mod algo;
pub mod error;
pub mod graph;
pub mod rng;

pub use algo::{
    Algorithm, CirclePackOptions, CircularOptions, ForceAtlas2Options, ForceAtlas2Settings,
    NoverlapOptions,
};
pub use error::{Error, Result};
pub use graph::{Edge, Graph, Node, Point};

/// Headless layout entry point. Positions are written back into `graph.nodes`.
pub fn layout(graph: &mut Graph, algorithm: &Algorithm) -> Result<()> {
    match algorithm {
        Algorithm::Circular(opts) => algo::circular::layout(graph, opts),
        Algorithm::ForceAtlas2(opts) => algo::force_atlas2::layout(graph, opts),
        Algorithm::CirclePack(opts) => algo::circle_pack::layout(graph, opts),
        Algorithm::Noverlap(opts) => algo::noverlap::layout(graph, opts),
    }
}
