//! The analysis pipeline.
//!
//! Native documents go through: crop to the largest component, degree sizing, circular seed
//! placement, ForceAtlas2, Louvain, per-community colors, circle packing by community and
//! overlap removal. Gephi exports keep their upstream layout inputs: no crop and no force
//! layout; colors and circle packing follow the pre-assigned `modularity_class`.

use crate::community::{self, CommunityDetails, Louvain, ModularityDetails};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::layout;
use crate::metrics;
use crate::model::{Hierarchy, NebulaGraph};
use crate::reduce;
use crate::schema::{Document, Schema};
use serde_json::Value;
use std::time::Instant;

/// A fully analysed graph plus the details computed along the way.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub schema: Schema,
    pub hierarchy: Hierarchy,
    pub graph: NebulaGraph,
    pub community: CommunityDetails,
    /// Empty (count 0) for native input.
    pub modularity: ModularityDetails,
}

impl Analysis {
    /// Number of clusters under the active hierarchy.
    pub fn cluster_count(&self) -> usize {
        match self.hierarchy {
            Hierarchy::Community => self.community.count,
            Hierarchy::ModularityClass => self.modularity.count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    schema: Schema,
    config: PipelineConfig,
}

impl Pipeline {
    /// Selects the pipeline flavor for a classified document.
    pub fn for_schema(schema: Schema, config: PipelineConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> Hierarchy {
        match self.schema {
            Schema::Gephi => Hierarchy::ModularityClass,
            Schema::Native => Hierarchy::Community,
        }
    }

    pub fn run(&self, mut graph: NebulaGraph) -> Result<Analysis> {
        self.config.validate()?;
        let (community, modularity) = match self.schema {
            Schema::Native => (self.run_native(&mut graph)?, ModularityDetails::default()),
            Schema::Gephi => self.run_gephi(&mut graph)?,
        };
        let analysis = Analysis {
            schema: self.schema,
            hierarchy: self.hierarchy(),
            graph,
            community,
            modularity,
        };
        tracing::info!(
            schema = %analysis.schema,
            hierarchy = %analysis.hierarchy,
            clusters = analysis.cluster_count(),
            nodes = analysis.graph.node_count(),
            edges = analysis.graph.edge_count(),
            "graph analysed"
        );
        Ok(analysis)
    }

    fn run_native(&self, graph: &mut NebulaGraph) -> Result<CommunityDetails> {
        let cfg = &self.config;
        if cfg.crop_to_largest_component {
            timed("crop", || Ok(reduce::crop_to_largest_component(graph)))?;
        }
        timed("sizes", || {
            self.annotate_sizes(graph);
            Ok(())
        })?;
        timed("circular", || layout::circular(graph, cfg.circular.into()))?;
        timed("forceAtlas2", || layout::force_atlas2(graph, &cfg.force_atlas2))?;

        let details = timed("louvain", || Ok(Louvain::new(cfg.resolution).detect(graph)))?;
        community::apply_communities(graph, &details);
        self.paint(graph, Hierarchy::Community);

        self.pack(graph, Hierarchy::Community)?;
        Ok(details)
    }

    fn run_gephi(&self, graph: &mut NebulaGraph) -> Result<(CommunityDetails, ModularityDetails)> {
        let cfg = &self.config;
        timed("sizes", || {
            self.annotate_sizes(graph);
            Ok(())
        })?;
        let edge_size = cfg.gephi_edge_size;
        graph.for_each_edge_mut(|_, e| e.size = Some(edge_size));

        let details = timed("louvain", || Ok(Louvain::new(cfg.resolution).detect(graph)))?;
        community::apply_communities(graph, &details);

        let modularity = ModularityDetails::from_graph(graph);
        graph.attrs_mut().modularity_count = Some(modularity.count);
        self.paint(graph, Hierarchy::ModularityClass);

        self.pack(graph, Hierarchy::ModularityClass)?;
        Ok((details, modularity))
    }

    fn annotate_sizes(&self, graph: &mut NebulaGraph) {
        let cfg = &self.config;
        metrics::assign_sizes(graph, cfg.min_size, cfg.max_size);
        if cfg.label_sizes {
            metrics::assign_label_sizes(
                graph,
                (cfg.min_size, cfg.max_size),
                (cfg.min_label_size, cfg.max_label_size),
            );
        }
    }

    fn paint(&self, graph: &mut NebulaGraph, hierarchy: Hierarchy) {
        let cfg = &self.config;
        community::assign_colors(graph, hierarchy, cfg.color_seed, cfg.color_jitter);
        let border = cfg.border_color.clone();
        graph.for_each_node_mut(|_, a| a.border_color = Some(border.clone()));
    }

    fn pack(&self, graph: &mut NebulaGraph, hierarchy: Hierarchy) -> Result<()> {
        let cfg = &self.config;
        timed("circlePack", || {
            layout::circle_pack(graph, hierarchy, cfg.circle_pack.into())
        })?;
        timed("noverlap", || {
            layout::noverlap(graph, cfg.noverlap.options(cfg.color_seed))
        })
    }
}

fn timed<T>(stage: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let out = f()?;
    tracing::debug!(
        stage,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "pipeline stage finished"
    );
    Ok(out)
}

/// Classifies, imports and analyses a raw document.
pub fn analyze(value: Value, config: &PipelineConfig) -> Result<Analysis> {
    let doc = Document::from_value(value)?;
    let pipeline = Pipeline::for_schema(doc.schema(), config.clone());
    pipeline.run(doc.into_graph()?)
}

pub fn analyze_str(text: &str, config: &PipelineConfig) -> Result<Analysis> {
    let doc = Document::from_json_str(text)?;
    let pipeline = Pipeline::for_schema(doc.schema(), config.clone());
    pipeline.run(doc.into_graph()?)
}
