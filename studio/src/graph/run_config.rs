//! Per-run options: run id, step budget override, cancellation.

use tokio_util::sync::CancellationToken;

/// Options for one `invoke` / `stream` call. The compiled graph itself stays immutable.
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    /// Correlation id for logs; a random one is generated when absent.
    pub run_id: Option<String>,
    /// Overrides the graph's step budget for this run.
    pub step_limit: Option<usize>,
    /// Checked before every node and raced against the running node.
    pub cancel: Option<CancellationToken>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}
