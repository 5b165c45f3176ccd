use std::time::Duration;

/// Snapshot emitted while a round is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub round: u32,
    /// Requests classified as success or failure so far.
    pub completed: u64,
    /// Requests planned for the round.
    pub total: u64,
    pub elapsed: Duration,
}

pub type ProgressFn = std::sync::Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;
