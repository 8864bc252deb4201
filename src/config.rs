//! Replay and rendering options.

/// What to do with statements that leave the graph unchanged
/// (unrecognized or malformed lines).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoopPolicy {
    /// Emit a snapshot anyway, so every statement has one.
    #[default]
    Emit,
    /// Emit nothing for the statement. Other snapshots keep their index.
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Blank margin around the diagram.
    pub padding: f64,
    /// Horizontal gap between nodes on the same level.
    pub node_gap_x: f64,
    /// Vertical gap between levels.
    pub node_gap_y: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            padding: 40.0,
            node_gap_x: 80.0,
            node_gap_y: 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayConfig {
    pub noop_policy: NoopPolicy,
    /// Abort on the first malformed statement instead of skipping it.
    pub strict: bool,
    pub render: RenderOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.noop_policy, NoopPolicy::Emit);
        assert!(!config.strict);
        assert_eq!(config.render.padding, 40.0);
    }
}
