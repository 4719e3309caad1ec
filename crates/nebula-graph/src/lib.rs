#![forbid(unsafe_code)]

//! Graph container APIs used by `nebula`.
//!
//! The data model follows graphology: nodes and edges are addressed by string keys and carry
//! caller-defined attribute records. A graph may be directed or undirected, may allow parallel
//! edges (multigraph) and may allow self-loops.

pub mod error;
mod graph;

pub use error::{Error, Result};
pub use graph::{EdgeRef, Graph, GraphOptions, alg};
