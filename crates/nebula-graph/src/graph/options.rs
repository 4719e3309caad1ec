//! Graph configuration options.

/// Construction flags, mirroring graphology's `{ type, multi, allowSelfLoops }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    pub directed: bool,
    pub multigraph: bool,
    pub allow_self_loops: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            directed: true,
            multigraph: false,
            allow_self_loops: true,
        }
    }
}

impl GraphOptions {
    /// Directed multigraph with self-loops, the shape every loaded document is imported into.
    pub fn directed_multi() -> Self {
        Self {
            directed: true,
            multigraph: true,
            allow_self_loops: true,
        }
    }
}
