pub mod circle_pack;
pub mod circular;
pub mod force_atlas2;
pub mod noverlap;

#[derive(Debug, Clone)]
pub enum Algorithm {
    /// Even placement on a circle (graphology `circular`).
    Circular(CircularOptions),
    /// Continuous force-directed relaxation (graphology `forceAtlas2`).
    ForceAtlas2(ForceAtlas2Options),
    /// Hierarchical circle packing by group (graphology `circlepack`).
    CirclePack(CirclePackOptions),
    /// Iterative overlap removal (graphology `noverlap`).
    Noverlap(NoverlapOptions),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularOptions {
    pub center: f64,
    pub scale: f64,
}

impl Default for CircularOptions {
    fn default() -> Self {
        Self {
            center: 0.5,
            scale: 1.0,
        }
    }
}

/// ForceAtlas2 physics settings. Defaults match the published algorithm; see
/// [`force_atlas2::infer_settings`] for the graph-dependent variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceAtlas2Settings {
    pub lin_log_mode: bool,
    pub outbound_attraction_distribution: bool,
    pub adjust_sizes: bool,
    pub edge_weight_influence: f64,
    pub scaling_ratio: f64,
    pub strong_gravity_mode: bool,
    pub gravity: f64,
    pub slow_down: f64,
    pub barnes_hut_optimize: bool,
    pub barnes_hut_theta: f64,
}

impl Default for ForceAtlas2Settings {
    fn default() -> Self {
        Self {
            lin_log_mode: false,
            outbound_attraction_distribution: false,
            adjust_sizes: false,
            edge_weight_influence: 1.0,
            scaling_ratio: 1.0,
            strong_gravity_mode: false,
            gravity: 1.0,
            slow_down: 1.0,
            barnes_hut_optimize: false,
            barnes_hut_theta: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceAtlas2Options {
    /// `None` infers settings from the graph before running.
    pub settings: Option<ForceAtlas2Settings>,
    pub iterations: usize,
}

impl Default for ForceAtlas2Options {
    fn default() -> Self {
        Self {
            settings: None,
            iterations: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePackOptions {
    pub center: f64,
    pub scale: f64,
}

impl Default for CirclePackOptions {
    fn default() -> Self {
        Self {
            center: 2.0,
            scale: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoverlapOptions {
    pub max_iterations: usize,
    pub margin: f64,
    pub ratio: f64,
    pub expansion: f64,
    pub grid_size: usize,
    pub speed: f64,
    /// Seed for the jitter applied to nodes sharing the exact same position.
    pub random_seed: u64,
}

impl Default for NoverlapOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            margin: 1.0,
            ratio: 1.0,
            expansion: 1.1,
            grid_size: 20,
            speed: 3.0,
            random_seed: 0,
        }
    }
}
