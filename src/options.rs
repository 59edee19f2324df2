use std::time::Duration;

/// Configuration options for a dump run.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct DumpOptions {
    /// Timeout applied to every external tool invocation.
    pub invoke_timeout: Duration,

    /// Maximum stdout bytes captured from one invocation.
    pub max_output_bytes: usize,

    /// Maximum stderr bytes captured from one invocation.
    pub max_stderr_bytes: usize,

    /// Maximum nodes visited by the recursive introspection walk, per service.
    ///
    /// A guard against a misbehaving oracle declaring unbounded children, not a
    /// tree-depth limit.
    pub max_walk_nodes: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            invoke_timeout: Duration::from_secs(10),
            max_output_bytes: 8 * 1024 * 1024,
            max_stderr_bytes: 8 * 1024,
            max_walk_nodes: 4096,
        }
    }
}
