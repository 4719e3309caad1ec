//! Pipeline configuration.
//!
//! Every field has a default, so a config file only needs the keys it overrides:
//!
//! ```json
//! { "colorSeed": 7, "forceAtlas2": { "iterations": 200 } }
//! ```

use crate::error::{Error, Result};
use nebula_layout::{
    CirclePackOptions, CircularOptions, ForceAtlas2Options, ForceAtlas2Settings, Graph,
    NoverlapOptions, algo::force_atlas2,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Crop native input to its largest connected component.
    pub crop_to_largest_component: bool,
    pub min_size: f64,
    pub max_size: f64,
    pub label_sizes: bool,
    pub min_label_size: f64,
    pub max_label_size: f64,
    /// Louvain resolution; larger values yield more, smaller communities.
    pub resolution: f64,
    pub color_seed: u64,
    /// Offset each node's community color by its size.
    pub color_jitter: bool,
    pub border_color: String,
    /// Edge size assigned to every edge of a Gephi document.
    pub gephi_edge_size: f64,
    pub circular: CircularConfig,
    pub force_atlas2: ForceAtlas2Config,
    pub circle_pack: CirclePackConfig,
    pub noverlap: NoverlapConfig,
    /// Drill-down depth bound for sub-graph extraction.
    pub max_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            crop_to_largest_component: true,
            min_size: 10.0,
            max_size: 100.0,
            label_sizes: true,
            min_label_size: 14.0,
            max_label_size: 24.0,
            resolution: 1.0,
            color_seed: 0x6E65_6275_6C61,
            color_jitter: true,
            border_color: "white".to_string(),
            gephi_edge_size: 1.5,
            circular: CircularConfig::default(),
            force_atlas2: ForceAtlas2Config::default(),
            circle_pack: CirclePackConfig::default(),
            noverlap: NoverlapConfig::default(),
            max_depth: 3,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("minSize", self.min_size),
            ("maxSize", self.max_size),
            ("minLabelSize", self.min_label_size),
            ("maxLabelSize", self.max_label_size),
            ("resolution", self.resolution),
            ("gephiEdgeSize", self.gephi_edge_size),
        ];
        if let Some((name, v)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::config(format!("`{name}` must be finite, got {v}")));
        }
        if self.min_size > self.max_size {
            return Err(Error::config(format!(
                "`minSize` ({}) exceeds `maxSize` ({})",
                self.min_size, self.max_size
            )));
        }
        if self.min_label_size > self.max_label_size {
            return Err(Error::config(format!(
                "`minLabelSize` ({}) exceeds `maxLabelSize` ({})",
                self.min_label_size, self.max_label_size
            )));
        }
        if self.resolution <= 0.0 {
            return Err(Error::config(format!(
                "`resolution` must be positive, got {}",
                self.resolution
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircularConfig {
    pub center: f64,
    pub scale: f64,
}

impl Default for CircularConfig {
    fn default() -> Self {
        let d = CircularOptions::default();
        Self {
            center: d.center,
            scale: d.scale,
        }
    }
}

impl From<CircularConfig> for CircularOptions {
    fn from(c: CircularConfig) -> Self {
        Self {
            center: c.center,
            scale: c.scale,
        }
    }
}

/// ForceAtlas2 run length plus optional overrides applied on top of the inferred settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceAtlas2Config {
    pub iterations: usize,
    pub gravity: Option<f64>,
    pub scaling_ratio: Option<f64>,
    pub slow_down: Option<f64>,
    pub barnes_hut_optimize: Option<bool>,
    pub lin_log_mode: bool,
    pub adjust_sizes: bool,
    pub outbound_attraction_distribution: bool,
}

impl Default for ForceAtlas2Config {
    fn default() -> Self {
        Self {
            iterations: ForceAtlas2Options::default().iterations,
            gravity: None,
            scaling_ratio: None,
            slow_down: None,
            barnes_hut_optimize: None,
            lin_log_mode: false,
            adjust_sizes: false,
            outbound_attraction_distribution: false,
        }
    }
}

impl ForceAtlas2Config {
    pub fn options_for(&self, graph: &Graph) -> ForceAtlas2Options {
        let inferred = force_atlas2::infer_settings(graph);
        let settings = ForceAtlas2Settings {
            gravity: self.gravity.unwrap_or(inferred.gravity),
            scaling_ratio: self.scaling_ratio.unwrap_or(inferred.scaling_ratio),
            slow_down: self.slow_down.unwrap_or(inferred.slow_down),
            barnes_hut_optimize: self
                .barnes_hut_optimize
                .unwrap_or(inferred.barnes_hut_optimize),
            lin_log_mode: self.lin_log_mode,
            adjust_sizes: self.adjust_sizes,
            outbound_attraction_distribution: self.outbound_attraction_distribution,
            ..inferred
        };
        ForceAtlas2Options {
            settings: Some(settings),
            iterations: self.iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CirclePackConfig {
    pub center: f64,
    pub scale: f64,
}

impl Default for CirclePackConfig {
    fn default() -> Self {
        let d = CirclePackOptions::default();
        Self {
            center: d.center,
            scale: d.scale,
        }
    }
}

impl From<CirclePackConfig> for CirclePackOptions {
    fn from(c: CirclePackConfig) -> Self {
        Self {
            center: c.center,
            scale: c.scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoverlapConfig {
    pub max_iterations: usize,
    pub margin: f64,
    pub ratio: f64,
    pub expansion: f64,
    pub grid_size: usize,
    pub speed: f64,
}

impl Default for NoverlapConfig {
    fn default() -> Self {
        let d = NoverlapOptions::default();
        Self {
            max_iterations: d.max_iterations,
            margin: d.margin,
            ratio: d.ratio,
            expansion: d.expansion,
            grid_size: d.grid_size,
            speed: d.speed,
        }
    }
}

impl NoverlapConfig {
    pub fn options(&self, random_seed: u64) -> NoverlapOptions {
        NoverlapOptions {
            max_iterations: self.max_iterations,
            margin: self.margin,
            ratio: self.ratio,
            expansion: self.expansion,
            grid_size: self.grid_size,
            speed: self.speed,
            random_seed,
        }
    }
}
