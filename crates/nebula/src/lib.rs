#![forbid(unsafe_code)]

//! `nebula` turns a node/edge document into a graph ready for interactive exploration.
//!
//! A document is classified ([`schema::detect_schema`]), imported into a [`NebulaGraph`] and run
//! through the analysis [`Pipeline`]: component cropping, degree sizing, layout, Louvain
//! communities and per-cluster colors. The result can then be filtered by cluster, searched,
//! hovered and drilled into one cluster at a time.
//!
//! ```no_run
//! let text = std::fs::read_to_string("graph.json")?;
//! let analysis = nebula::analyze_str(&text, &nebula::PipelineConfig::default())?;
//! println!("{} clusters", analysis.cluster_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod community;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod interaction;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod reduce;
pub mod schema;
pub mod subgraph;

pub use community::{CommunityDetails, Louvain, ModularityDetails, modularity};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use filter::set_clusters;
pub use interaction::{InteractionState, edge_display, move_node, node_display};
pub use model::{EdgeAttributes, GraphAttributes, Hierarchy, NebulaGraph, NodeAttributes};
pub use pipeline::{Analysis, Pipeline, analyze, analyze_str};
pub use schema::{Document, Schema, detect_schema};
pub use subgraph::{DrillDown, drill_down};
