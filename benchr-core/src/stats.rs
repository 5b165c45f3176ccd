use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Status recorded for requests that failed before a response status arrived.
pub const TRANSPORT_ERROR_STATUS: u16 = 0;

#[derive(Debug, Default, Clone, Copy)]
struct Extrema {
    max_ms: u64,
    /// 0 = unset.
    min_ms: u64,
}

/// Counters shared by every worker during a benchmark round.
///
/// Scalar counters are plain atomics with no cross-counter consistency; read them through
/// [`Stats::snapshot`] once the round has quiesced.
#[derive(Debug, Default)]
pub struct Stats {
    success: AtomicU64,
    failure: AtomicU64,
    total_time_ms: AtomicU64,
    total_reqs: AtomicU64,
    total_recv_bytes: AtomicU64,
    extrema: Mutex<Extrema>,
    status_counts: Mutex<HashMap<u16, u64>>,
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub success: u64,
    pub failure: u64,
    pub total_time_ms: u64,
    pub total_reqs: u64,
    pub total_recv_bytes: u64,
    pub max_req_elapsed_ms: u64,
    /// 0 when no request completed successfully.
    pub min_req_elapsed_ms: u64,
    pub status_counts: BTreeMap<u16, u64>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_failure(&self) {
        self.failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_total_reqs(&self) {
        self.total_reqs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_total_time(&self, ms: u64) {
        self.total_time_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn add_total_recv_bytes(&self, n: u64) {
        self.total_recv_bytes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_status_count(&self, code: u16) {
        *self.status_counts.lock().entry(code).or_insert(0) += 1;
    }

    /// Folds one elapsed value into the max/min pair. Callers pass `ms > 0`.
    pub fn update_req_elapsed(&self, ms: u64) {
        let mut ext = self.extrema.lock();
        ext.max_ms = ext.max_ms.max(ms);
        if ext.min_ms == 0 || ms < ext.min_ms {
            ext.min_ms = ms;
        }
    }

    pub fn success(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failure(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }

    pub fn total_reqs(&self) -> u64 {
        self.total_reqs.load(Ordering::Relaxed)
    }

    /// Requests that have been fully classified as success or failure.
    pub fn completed(&self) -> u64 {
        self.success().saturating_add(self.failure())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let ext = *self.extrema.lock();
        let status_counts = self
            .status_counts
            .lock()
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect();

        StatsSnapshot {
            success: self.success(),
            failure: self.failure(),
            total_time_ms: self.total_time_ms.load(Ordering::Relaxed),
            total_reqs: self.total_reqs(),
            total_recv_bytes: self.total_recv_bytes.load(Ordering::Relaxed),
            max_req_elapsed_ms: ext.max_ms,
            min_req_elapsed_ms: ext.min_ms,
            status_counts,
        }
    }
}

impl StatsSnapshot {
    /// Sum of the status histogram.
    pub fn status_total(&self) -> u64 {
        self.status_counts.values().sum()
    }
}
